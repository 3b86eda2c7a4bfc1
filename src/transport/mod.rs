//! Single-request transport abstraction.
//!
//! A [`Transport`] performs exactly one HTTP exchange. It never follows
//! redirects: the session walks `Location` chains itself so it can update
//! cookies and the referer on every hop.

pub mod client;
pub mod socket;

use crate::base::neterror::NetError;
use crate::http::{HopResponse, OrderedHeaderMap, RequestBody};
use futures::future::BoxFuture;
use http::Method;
use std::fmt;
use std::sync::Arc;

pub use client::{HyperTransport, HyperTransportBuilder};

/// One outgoing request as handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: String,
    pub method: Method,
    pub headers: OrderedHeaderMap,
    pub body: RequestBody,
    /// Always `false` when built by a session.
    pub follow_redirects: bool,
}

impl TransportRequest {
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
            headers: OrderedHeaderMap::new(),
            body: RequestBody::Empty,
            follow_redirects: false,
        }
    }

    /// Current `Cookie` header, if one is attached.
    pub fn cookie(&self) -> Option<&str> {
        self.headers.get_str("cookie")
    }

    /// Current `Referer` header, if one is attached.
    pub fn referer(&self) -> Option<&str> {
        self.headers.get_str("referer")
    }
}

impl fmt::Display for TransportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)?;
        for (name, value) in self.headers.iter() {
            write!(f, " [{}: {}]", name, value.to_str().unwrap_or("<binary>"))?;
        }
        if !self.body.is_empty() {
            write!(f, " ({} byte body)", self.body.len())?;
        }
        Ok(())
    }
}

/// Alias for the `Future` type returned by a transport.
pub type Fetching = BoxFuture<'static, Result<HopResponse, NetError>>;

/// Trait for performing one HTTP request.
///
/// Implementations must be thread-safe and must not follow redirects;
/// the returned response is the server's direct answer to `request`.
pub trait Transport: Send + Sync {
    fn fetch(&self, request: TransportRequest) -> Fetching;
}

/// Blanket implementation for Arc-wrapped transports.
impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn fetch(&self, request: TransportRequest) -> Fetching {
        (**self).fetch(request)
    }
}
