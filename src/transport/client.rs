//! HTTP/1.1 transport over tokio, hyper and BoringSSL.
//!
//! Each fetch opens a fresh connection, sends one request and reads the
//! whole body. No pooling, no redirect following, no content decoding.

use crate::base::neterror::NetError;
use crate::http::{HopResponse, OrderedHeaderMap};
use crate::transport::socket::{self, SocketType};
use crate::transport::{Fetching, Transport, TransportRequest};
use boring::ssl::SslConnector;
use bytes::Bytes;
use http::Request;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::time::Duration;
use url::{Position, Url};

/// Default transport used by sessions.
///
/// # Example
///
/// ```rust,ignore
/// use sessionnet::transport::HyperTransport;
/// use std::time::Duration;
///
/// let transport = HyperTransport::builder()
///     .timeout(Duration::from_secs(30))
///     .user_agent("sessionnet/0.1")
///     .build()?;
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    tls: SslConnector,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    error_for_status: bool,
}

impl HyperTransport {
    /// Transport with certificate verification, no timeout, and failure on
    /// 4xx/5xx statuses.
    pub fn new() -> Result<Self, NetError> {
        Self::builder().build()
    }

    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::default()
    }
}

/// Builder for a [`HyperTransport`].
#[derive(Debug, Clone)]
pub struct HyperTransportBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
    error_for_status: bool,
    verify_peer: bool,
}

impl Default for HyperTransportBuilder {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: None,
            error_for_status: true,
            verify_peer: true,
        }
    }
}

impl HyperTransportBuilder {
    /// Bound each exchange (connect + send + body read).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send a `User-Agent` unless the request carries its own.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// When `false`, 4xx/5xx responses are returned instead of failing
    /// with [`NetError::HttpStatus`].
    pub fn error_for_status(mut self, enabled: bool) -> Self {
        self.error_for_status = enabled;
        self
    }

    /// Disable certificate verification (test servers only).
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.verify_peer = !accept;
        self
    }

    pub fn build(self) -> Result<HyperTransport, NetError> {
        Ok(HyperTransport {
            tls: socket::tls_connector(self.verify_peer)?,
            timeout: self.timeout,
            user_agent: self.user_agent,
            error_for_status: self.error_for_status,
        })
    }
}

impl Transport for HyperTransport {
    fn fetch(&self, request: TransportRequest) -> Fetching {
        let this = self.clone();
        Box::pin(async move {
            let exchange = this.execute(request);
            match this.timeout {
                Some(limit) => tokio::time::timeout(limit, exchange)
                    .await
                    .map_err(|_| NetError::ConnectionTimedOut)?,
                None => exchange.await,
            }
        })
    }
}

impl HyperTransport {
    async fn execute(&self, request: TransportRequest) -> Result<HopResponse, NetError> {
        let url = Url::parse(&request.url).map_err(|_| NetError::InvalidUrl)?;
        let socket: SocketType = socket::connect(&url, &self.tls).await?;

        let (mut sender, conn) = http1::handshake(TokioIo::new(socket))
            .await
            .map_err(|_| NetError::ConnectionFailed)?;

        // Drive the connection until the exchange completes
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection closed with error");
            }
        });

        let mut headers = OrderedHeaderMap::new();
        headers.insert("host", &host_header(&url))?;
        if let Some(ua) = &self.user_agent {
            headers.insert("user-agent", ua)?;
        }
        if let Some(content_type) = request.body.content_type() {
            headers.insert("content-type", content_type)?;
        }
        headers.extend_from(&request.headers);

        let target = &url[Position::BeforePath..];
        let mut req = Request::builder()
            .method(request.method.clone())
            .uri(target)
            .body(Full::new(request.body.to_bytes()))
            .map_err(|_| NetError::InvalidUrl)?;
        *req.headers_mut() = headers.to_header_map();

        let resp = sender.send_request(req).await.map_err(|e| {
            tracing::debug!(url = %request.url, error = %e, "request failed");
            NetError::ConnectionClosed
        })?;

        let (parts, incoming) = resp.into_parts();
        let response_headers = parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let bytes: Bytes = incoming
            .collect()
            .await
            .map_err(|_| NetError::HttpBodyError)?
            .to_bytes();
        let body = String::from_utf8_lossy(&bytes).into_owned();

        let status = parts.status;
        if self.error_for_status && (status.is_client_error() || status.is_server_error()) {
            return Err(NetError::HttpStatus {
                status: status.as_u16(),
                url: request.url,
            });
        }

        Ok(HopResponse::new(status, response_headers, body))
    }
}

/// `Host` header value: host plus port when it is not the scheme default.
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_header_omits_default_port() {
        let url = Url::parse("https://example.com/login").unwrap();
        assert_eq!(host_header(&url), "example.com");

        let url = Url::parse("http://127.0.0.1:8080/app").unwrap();
        assert_eq!(host_header(&url), "127.0.0.1:8080");
    }

    #[test]
    fn test_builder_defaults() {
        let builder = HyperTransportBuilder::default();
        assert!(builder.error_for_status);
        assert!(builder.verify_peer);
        assert!(builder.timeout.is_none());
    }

    #[tokio::test]
    async fn test_rejects_unknown_scheme() {
        let transport = HyperTransport::new().unwrap();
        let err = transport
            .fetch(TransportRequest::new("ftp://example.com/file", http::Method::GET))
            .await
            .unwrap_err();
        assert_eq!(err, NetError::DisallowedUrlScheme);
    }

    #[tokio::test]
    async fn test_rejects_unparsable_url() {
        let transport = HyperTransport::new().unwrap();
        let err = transport
            .fetch(TransportRequest::new("not a url", http::Method::GET))
            .await
            .unwrap_err();
        assert_eq!(err, NetError::InvalidUrl);
    }
}
