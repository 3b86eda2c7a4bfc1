use crate::base::neterror::NetError;
use crate::cookies::jar::CookieJar;
use crate::cookies::persistence::{self, PropertyStore, StorageKeys};
use crate::http::{HopResponse, OrderedHeaderMap, RequestBody};
use crate::session::config::{SessionBuilder, SessionConfig};
use crate::session::options::RequestOptions;
use crate::session::state::NavState;
use crate::transport::{Transport, TransportRequest};
use http::Method;
use std::sync::Arc;
use url::Url;

/// Cookie-authenticated session against one site and account.
///
/// Every call runs the full sequence before returning: the redirect chain,
/// an automatic login when the final body contains the logout indicator,
/// and the optional replay of the original request.
///
/// A session is strictly sequential (`&mut self`). Use one instance per
/// host/account; never share cookie state between login contexts.
pub struct Session {
    config: SessionConfig,
    base_url: String,
    host: String,
    login_url: String,
    login_payload: RequestBody,
    default_headers: OrderedHeaderMap,
    transport: Arc<dyn Transport>,
    store: Option<Arc<dyn PropertyStore>>,
    keys: StorageKeys,
    jar: CookieJar,
    hydrated: bool,
    referer: Option<String>,
    last_headers: Vec<(String, String)>,
    state: NavState,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("host", &self.host)
            .field("login_url", &self.login_url)
            .field("cookie", &self.jar.header())
            .field("referer", &self.referer)
            .field("state", &self.state)
            .finish()
    }
}

impl Session {
    /// Start configuring a session for `base_url`.
    pub fn builder(base_url: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(base_url)
    }

    /// Create a session. Fails when `config.base_url` has no `//`.
    ///
    /// `store` is only consulted when `config.persist_cookies` is set.
    pub fn new(
        config: SessionConfig,
        transport: Arc<dyn Transport>,
        store: Option<Arc<dyn PropertyStore>>,
    ) -> Result<Self, NetError> {
        let (base_url, host) = split_base_url(&config.base_url)?;
        let login_url = resolve(&base_url, &config.login_path);
        let default_headers = OrderedHeaderMap::from_pairs(&config.headers)?;
        let keys = StorageKeys::new(&host, config.account.as_deref());
        let store = store.filter(|_| config.persist_cookies);

        Ok(Self {
            login_payload: config.login_payload(),
            config,
            base_url,
            host,
            login_url,
            default_headers,
            transport,
            store,
            keys,
            jar: CookieJar::new(),
            hydrated: false,
            referer: None,
            last_headers: Vec::new(),
            state: NavState::Idle,
        })
    }

    /// GET `path` (absolute, or relative to the base URL).
    pub async fn get(&mut self, path: &str) -> Result<String, NetError> {
        self.request(path, RequestOptions::get()).await
    }

    /// POST `payload` to `path` with extra headers.
    pub async fn post<K, V>(
        &mut self,
        path: &str,
        payload: impl Into<RequestBody>,
        headers: &[(K, V)],
    ) -> Result<String, NetError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let options = RequestOptions::post(payload).headers(headers)?;
        self.request(path, options).await
    }

    /// Run a request and return the final body.
    ///
    /// When the body reveals an expired session the login form is posted.
    /// Without `refetch_on_login` the pre-login body is still returned.
    pub async fn request(
        &mut self,
        path: &str,
        options: RequestOptions,
    ) -> Result<String, NetError> {
        let page_url = resolve(&self.base_url, path);
        self.state = NavState::Idle;
        self.hydrate_cookies()?;

        let body = self.navigate(&page_url, &options).await?;
        self.state = NavState::Done;
        Ok(body)
    }

    /// Post the login form now, updating (and persisting) the cookie jar.
    ///
    /// The response is not checked: a rejected login only shows up as the
    /// logout indicator on a later request.
    pub async fn login(&mut self) -> Result<(), NetError> {
        self.hydrate_cookies()?;
        self.state = NavState::LoggingIn;

        let mut request = TransportRequest::new(self.login_url.clone(), Method::POST);
        request.headers = self.outgoing_headers(&OrderedHeaderMap::new())?;
        request.body = self.login_payload.clone();

        if self.config.debug {
            tracing::debug!(url = %self.login_url, request = %request, "posting login form");
        }
        let response = self.transport.fetch(request).await?;

        self.referer = Some(self.login_url.clone());
        self.jar.update(response.set_cookies());
        if self.config.debug {
            tracing::debug!(status = %response.status(), cookie = %self.jar.header(), "login response");
        }

        if let Some(store) = &self.store {
            persistence::save_jar(store.as_ref(), &self.keys, &self.jar)?;
            tracing::debug!(key = %self.keys.cookie(), "cookies persisted");
        }
        Ok(())
    }

    async fn navigate(
        &mut self,
        page_url: &str,
        options: &RequestOptions,
    ) -> Result<String, NetError> {
        let body = self.follow_redirects(page_url, options).await?;
        self.state = NavState::BodyReady;

        if !indicates_logout(&body, &self.config.logout_indicator) {
            return Ok(body);
        }

        tracing::info!(url = %page_url, login_url = %self.login_url, "session expired, logging in");
        self.login().await?;

        if !self.config.refetch_on_login {
            return Ok(body);
        }

        self.state = NavState::Refetching;
        let request = self.build_request(
            page_url,
            options.method.clone(),
            &options.headers,
            options.payload.clone(),
        )?;
        let response = self.send_hop(request).await?;
        Ok(response.into_body())
    }

    /// Send hops until a response carries no `Location`.
    ///
    /// Every hop after the first is a GET without payload.
    async fn follow_redirects(
        &mut self,
        page_url: &str,
        options: &RequestOptions,
    ) -> Result<String, NetError> {
        let mut url = page_url.to_string();
        let mut method = options.method.clone();
        let mut payload = options.payload.clone();
        let mut redirects = 0;

        loop {
            self.state = NavState::Sending;
            let request = self.build_request(&url, method, &options.headers, payload)?;
            let response = self.send_hop(request).await?;

            method = Method::GET;
            payload = RequestBody::Empty;

            match response.location() {
                Some(location) => {
                    if redirects >= self.config.redirect_limit {
                        return Err(NetError::TooManyRedirects);
                    }
                    redirects += 1;
                    url = resolve_location(&url, location);
                }
                None => return Ok(response.into_body()),
            }
        }
    }

    fn build_request(
        &self,
        url: &str,
        method: Method,
        extra: &OrderedHeaderMap,
        payload: RequestBody,
    ) -> Result<TransportRequest, NetError> {
        let mut request = TransportRequest::new(url, method);
        request.headers = self.outgoing_headers(extra)?;
        request.body = payload;
        Ok(request)
    }

    /// Default headers, then `extra`, then the jar's cookie and the referer.
    fn outgoing_headers(&self, extra: &OrderedHeaderMap) -> Result<OrderedHeaderMap, NetError> {
        let mut headers = self.default_headers.clone();
        headers.extend_from(extra);
        if !self.jar.is_empty() {
            headers.insert("cookie", self.jar.header())?;
        }
        let referer = self.referer.as_deref().unwrap_or(&self.login_url);
        headers.insert("referer", referer)?;
        Ok(headers)
    }

    /// Fetch one hop and fold its cookies and headers into the session.
    async fn send_hop(&mut self, request: TransportRequest) -> Result<HopResponse, NetError> {
        let url = request.url.clone();
        if self.config.debug {
            tracing::debug!(url = %url, request = %request, "sending request");
        }

        let response = self.transport.fetch(request).await?;

        if self.config.debug {
            tracing::debug!(
                url = %url,
                status = %response.status(),
                headers = ?response.headers(),
                "received response"
            );
        }
        self.jar.update(response.set_cookies());
        if self.config.debug {
            tracing::debug!(cookie = %self.jar.header(), "cookie jar updated");
        }

        self.last_headers = response.headers().to_vec();
        self.referer = Some(url);
        Ok(response)
    }

    /// Load persisted cookies once, before the first request.
    fn hydrate_cookies(&mut self) -> Result<(), NetError> {
        if self.hydrated {
            return Ok(());
        }
        if let Some(store) = &self.store {
            if self.jar.is_empty() {
                self.jar = persistence::load_jar(store.as_ref(), &self.keys)?;
                tracing::debug!(
                    key = %self.keys.cookie(),
                    found = !self.jar.is_empty(),
                    "loaded persisted cookies"
                );
            }
        }
        self.hydrated = true;
        Ok(())
    }

    /// Current `Cookie` header.
    pub fn cookies(&self) -> &str {
        self.jar.header()
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    /// Headers of the last navigated hop (login responses excluded).
    pub fn last_headers(&self) -> &[(String, String)] {
        &self.last_headers
    }

    /// URL sent as `Referer` on the next request, once one was fetched.
    pub fn referer(&self) -> Option<&str> {
        self.referer.as_deref()
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn storage_keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn set_logout_indicator(&mut self, indicator: impl Into<String>) {
        self.config.logout_indicator = indicator.into();
    }

    pub fn set_refetch_on_login(&mut self, refetch: bool) {
        self.config.refetch_on_login = refetch;
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }
}

/// Split `scheme://host/path` into the base URL (with a `/` added when
/// there is no path) and the host.
fn split_base_url(url: &str) -> Result<(String, String), NetError> {
    let invalid = || NetError::InvalidBaseUrl {
        url: url.to_string(),
    };
    let host_start = url.find("//").ok_or_else(invalid)? + 2;

    let (base, host_end) = match url[host_start..].find('/') {
        Some(pos) => (url.to_string(), host_start + pos),
        None => (format!("{}/", url), url.len()),
    };
    let host = &url[host_start..host_end];
    if host.is_empty() {
        return Err(invalid());
    }
    Ok((base, host.to_string()))
}

/// A path with `//` past its first character is absolute; anything else is
/// appended to the base URL verbatim.
fn resolve(base_url: &str, path: &str) -> String {
    if path.find("//").is_some_and(|pos| pos > 0) {
        path.to_string()
    } else {
        format!("{}{}", base_url, path)
    }
}

fn resolve_location(current: &str, location: &str) -> String {
    match Url::parse(current).and_then(|base| base.join(location)) {
        Ok(url) => url.into(),
        Err(_) => location.to_string(),
    }
}

/// A match at offset 0 does not count.
pub(crate) fn indicates_logout(body: &str, indicator: &str) -> bool {
    !indicator.is_empty() && body.find(indicator).is_some_and(|pos| pos > 0)
}
