use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("SSL protocol error")]
    SslProtocolError,
    #[error("Connection timed out")]
    ConnectionTimedOut,

    // URL / request errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Disallowed URL scheme")]
    DisallowedUrlScheme,
    #[error("Too many redirects")]
    TooManyRedirects,
    #[error("Invalid header")]
    InvalidHeader,
    #[error("HTTP body error")]
    HttpBodyError,
    #[error("JSON parse error")]
    JsonParseError,

    // Errors carrying context
    #[error("Invalid base URL {url}: must be in the format protocol://host")]
    InvalidBaseUrl { url: String },
    #[error("Connection to {host}:{port} failed: {message}")]
    ConnectionFailedTo {
        host: String,
        port: u16,
        message: String,
    },
    #[error("Could not resolve {domain}: {message}")]
    NameNotResolvedFor { domain: String, message: String },
    #[error("HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },
    #[error("Missing {key}")]
    MissingField { key: String },
    #[error("Malformed value for {key}")]
    MalformedField { key: String },
    #[error("Property store error: {message}")]
    StoreError { message: String },
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Unknown error ({0})")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionClosed => -100,
            NetError::ConnectionFailed | NetError::ConnectionFailedTo { .. } => -104,
            NetError::NameNotResolved | NetError::NameNotResolvedFor { .. } => -105,
            NetError::SslProtocolError => -107,
            NetError::ConnectionTimedOut => -118,

            NetError::InvalidUrl | NetError::InvalidBaseUrl { .. } => -300,
            NetError::DisallowedUrlScheme => -301,
            NetError::TooManyRedirects => -310,
            NetError::InvalidHeader => -326,
            NetError::HttpBodyError => -330,
            // Session-level codes (custom, starting at -900)
            NetError::HttpStatus { .. } => -900,
            NetError::MissingField { .. } => -901,
            NetError::MalformedField { .. } => -902,
            NetError::StoreError { .. } => -903,
            NetError::InvalidConfig { .. } => -904,
            NetError::JsonParseError => -905,
            NetError::Unknown(code) => *code,
        }
    }

    /// Create a connection error with target context.
    pub fn connection_failed_to(host: impl Into<String>, port: u16, err: std::io::Error) -> Self {
        NetError::ConnectionFailedTo {
            host: host.into(),
            port,
            message: err.to_string(),
        }
    }

    /// Create a DNS error with domain context.
    pub fn dns_failed(domain: impl Into<String>, err: std::io::Error) -> Self {
        NetError::NameNotResolvedFor {
            domain: domain.into(),
            message: err.to_string(),
        }
    }

    pub fn missing_field(key: impl Into<String>) -> Self {
        NetError::MissingField { key: key.into() }
    }

    pub fn malformed_field(key: impl Into<String>) -> Self {
        NetError::MalformedField { key: key.into() }
    }

    pub fn store_error(message: impl Into<String>) -> Self {
        NetError::StoreError {
            message: message.into(),
        }
    }

    /// True for failures raised before any byte reached the network.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            NetError::InvalidBaseUrl { .. } | NetError::InvalidConfig { .. } | NetError::InvalidUrl
        )
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -100 => NetError::ConnectionClosed,
            -104 => NetError::ConnectionFailed,
            -105 => NetError::NameNotResolved,
            -107 => NetError::SslProtocolError,
            -118 => NetError::ConnectionTimedOut,

            -300 => NetError::InvalidUrl,
            -301 => NetError::DisallowedUrlScheme,
            -310 => NetError::TooManyRedirects,
            -326 => NetError::InvalidHeader,
            -330 => NetError::HttpBodyError,
            -905 => NetError::JsonParseError,
            _ => NetError::Unknown(code),
        }
    }
}

impl From<serde_json::Error> for NetError {
    fn from(_: serde_json::Error) -> Self {
        NetError::JsonParseError
    }
}
