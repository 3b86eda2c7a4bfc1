//! Session configuration and builder.

use crate::base::neterror::NetError;
use crate::cookies::persistence::{JsonFilePropertyStore, MemoryPropertyStore, PropertyStore};
use crate::http::RequestBody;
use crate::session::navigator::Session;
use crate::transport::{HyperTransport, Transport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Chromium's redirect limit.
pub const DEFAULT_REDIRECT_LIMIT: usize = 20;

/// Everything a [`Session`] needs to know about its target site.
///
/// Deserializable so it can live in a JSON file:
///
/// ```json
/// {
///   "base_url": "https://intranet.example.com/app",
///   "login_path": "/login.do",
///   "login_form": [["user", "alice"], ["password", "secret"]],
///   "logout_indicator": "Please log in",
///   "persist_cookies": true,
///   "account": "alice",
///   "cookie_file": "cookies.json",
///   "refetch_on_login": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// `scheme://host[/default/path]`; relative request paths are appended to it.
    pub base_url: String,
    /// Absolute URL or path relative to `base_url`.
    pub login_path: String,
    /// Form fields posted on login. Ignored when `login_body` is set.
    pub login_form: Vec<(String, String)>,
    /// Raw login payload, sent unescaped.
    pub login_body: Option<String>,
    /// Body fragment that marks an expired session.
    pub logout_indicator: String,
    /// Headers added to every request.
    pub headers: Vec<(String, String)>,
    pub persist_cookies: bool,
    /// Selects the persistence namespace (`<host>_cookie_<account>`).
    pub account: Option<String>,
    /// JSON file used as property store when persistence is on.
    pub cookie_file: Option<PathBuf>,
    pub refetch_on_login: bool,
    /// Report every hop through `tracing::debug!`.
    pub debug: bool,
    pub redirect_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            login_path: String::new(),
            login_form: Vec::new(),
            login_body: None,
            logout_indicator: String::new(),
            headers: Vec::new(),
            persist_cookies: false,
            account: None,
            cookie_file: None,
            refetch_on_login: false,
            debug: false,
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
        }
    }
}

impl SessionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, NetError> {
        serde_json::from_str(json).map_err(|e| NetError::InvalidConfig {
            message: e.to_string(),
        })
    }

    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, NetError> {
        use crate::base::context::IoResultExt;

        let path = path.as_ref();
        let json = std::fs::read_to_string(path).store_context(path)?;
        Self::from_json_str(&json)
    }

    /// Payload posted to the login URL.
    pub fn login_payload(&self) -> RequestBody {
        match &self.login_body {
            Some(body) => RequestBody::from(body.as_str()),
            None if self.login_form.is_empty() => RequestBody::Empty,
            None => RequestBody::Form(self.login_form.clone()),
        }
    }
}

/// Builder for a [`Session`].
///
/// # Example
///
/// ```rust,ignore
/// use sessionnet::session::Session;
///
/// let mut session = Session::builder("https://intranet.example.com/app")
///     .login_path("/login.do")
///     .login_form(&[("user", "alice"), ("password", "secret")])
///     .logout_indicator("Please log in")
///     .refetch_on_login(true)
///     .build()?;
///
/// let home = session.get("/home").await?;
/// ```
#[derive(Default)]
pub struct SessionBuilder {
    config: SessionConfig,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn PropertyStore>>,
}

impl SessionBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::from_config(SessionConfig::new(base_url))
    }

    pub fn from_config(config: SessionConfig) -> Self {
        Self {
            config,
            transport: None,
            store: None,
        }
    }

    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.config.login_path = path.into();
        self
    }

    /// Post these fields url-encoded on login.
    pub fn login_form<K, V>(mut self, pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.config.login_form = pairs
            .iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        self.config.login_body = None;
        self
    }

    /// Post this text as-is on login.
    pub fn login_body(mut self, body: impl Into<String>) -> Self {
        self.config.login_body = Some(body.into());
        self
    }

    pub fn logout_indicator(mut self, indicator: impl Into<String>) -> Self {
        self.config.logout_indicator = indicator.into();
        self
    }

    /// Add a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.push((name.into(), value.into()));
        self
    }

    /// Enable cookie persistence through `store`.
    pub fn persist_cookies(mut self, store: Arc<dyn PropertyStore>) -> Self {
        self.config.persist_cookies = true;
        self.store = Some(store);
        self
    }

    /// Enable cookie persistence in a JSON file.
    pub fn cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.persist_cookies = true;
        self.config.cookie_file = Some(path.into());
        self
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.config.account = Some(account.into());
        self
    }

    pub fn refetch_on_login(mut self, refetch: bool) -> Self {
        self.config.refetch_on_login = refetch;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn redirect_limit(mut self, limit: usize) -> Self {
        self.config.redirect_limit = limit;
        self
    }

    /// Use a custom transport instead of [`HyperTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the session.
    ///
    /// Persistence without an explicit store uses `cookie_file` when set,
    /// otherwise an in-memory store.
    pub fn build(self) -> Result<Session, NetError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(HyperTransport::new()?),
        };

        let store: Option<Arc<dyn PropertyStore>> = if self.config.persist_cookies {
            Some(match (self.store, &self.config.cookie_file) {
                (Some(store), _) => store,
                (None, Some(path)) => Arc::new(JsonFilePropertyStore::new(path.clone())),
                (None, None) => Arc::new(MemoryPropertyStore::new()),
            })
        } else {
            None
        };

        Session::new(self.config, transport, store)
    }
}
