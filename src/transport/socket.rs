//! Connection setup for [`HyperTransport`](super::client::HyperTransport):
//! DNS -> TCP -> optional TLS.

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use boring::ssl::{SslConnector, SslMethod, SslVerifyMode, SslVersion};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use url::Url;

/// A connected socket, plain or TLS.
#[derive(Debug)]
pub enum SocketType {
    Tcp(TcpStream),
    Ssl(tokio_boring::SslStream<TcpStream>),
}

impl AsyncRead for SocketType {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            SocketType::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            SocketType::Ssl(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for SocketType {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            SocketType::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            SocketType::Ssl(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            SocketType::Tcp(s) => Pin::new(s).poll_flush(cx),
            SocketType::Ssl(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            SocketType::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            SocketType::Ssl(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

/// Build the TLS connector used for `https` targets.
///
/// HTTP/1.1 only: the transport never negotiates h2.
pub fn tls_connector(verify_peer: bool) -> Result<SslConnector, NetError> {
    let mut builder =
        SslConnector::builder(SslMethod::tls()).map_err(|_| NetError::SslProtocolError)?;
    builder
        .set_min_proto_version(Some(SslVersion::TLS1_2))
        .map_err(|_| NetError::SslProtocolError)?;
    builder
        .set_alpn_protos(b"\x08http/1.1")
        .map_err(|_| NetError::SslProtocolError)?;
    builder.set_verify(if verify_peer {
        SslVerifyMode::PEER
    } else {
        SslVerifyMode::NONE
    });
    Ok(builder.build())
}

/// Open a connection to the URL's host, wrapping it in TLS for `https`.
pub async fn connect(url: &Url, tls: &SslConnector) -> Result<SocketType, NetError> {
    let secure = match url.scheme() {
        "http" => false,
        "https" => true,
        _ => return Err(NetError::DisallowedUrlScheme),
    };
    let host = url
        .host_str()
        .ok_or(NetError::InvalidUrl)?
        .trim_start_matches('[')
        .trim_end_matches(']');
    let port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;

    let addrs = tokio::net::lookup_host((host, port))
        .await
        .dns_context(host)?;

    let mut last_err = None;
    let mut stream = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(s) => {
                stream = Some(s);
                break;
            }
            Err(e) => last_err = Some(e),
        }
    }
    let stream = match (stream, last_err) {
        (Some(s), _) => s,
        (None, Some(e)) => return Err(e).connection_context(host, port),
        (None, None) => return Err(NetError::NameNotResolved),
    };

    if !secure {
        return Ok(SocketType::Tcp(stream));
    }

    let mut config = tls.configure().map_err(|_| NetError::SslProtocolError)?;
    // SNI must not be sent for raw IP addresses
    if host.parse::<std::net::IpAddr>().is_ok() {
        config.set_use_server_name_indication(false);
        config.set_verify_hostname(false);
    }
    let tls_stream = tokio_boring::connect(config, host, stream)
        .await
        .map_err(|e| {
            tracing::debug!(host = %host, error = ?e, "TLS handshake failed");
            NetError::SslProtocolError
        })?;
    Ok(SocketType::Ssl(tls_stream))
}
