//! Per-request options.

use crate::base::neterror::NetError;
use crate::http::{OrderedHeaderMap, RequestBody};
use http::Method;

/// Method, extra headers and payload for one [`Session::request`] call.
///
/// Redirect following is not an option: the session always resolves
/// `Location` chains itself.
///
/// [`Session::request`]: crate::session::Session::request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: OrderedHeaderMap,
    pub payload: RequestBody,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post(payload: impl Into<RequestBody>) -> Self {
        Self::new(Method::POST).payload(payload)
    }

    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: OrderedHeaderMap::new(),
            payload: RequestBody::Empty,
        }
    }

    pub fn payload(mut self, payload: impl Into<RequestBody>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Add a header. Fails on names or values that cannot go on the wire.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, NetError> {
        self.headers.insert(name, value)?;
        Ok(self)
    }

    /// Add several headers in order.
    pub fn headers<K, V>(mut self, pairs: &[(K, V)]) -> Result<Self, NetError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (k, v) in pairs {
            self.headers.insert(k.as_ref(), v.as_ref())?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_plain_get() {
        let options = RequestOptions::default();
        assert_eq!(options.method, Method::GET);
        assert!(options.headers.is_empty());
        assert!(options.payload.is_empty());
    }

    #[test]
    fn test_post_with_headers() {
        let options = RequestOptions::post("a=1")
            .headers(&[("X-Requested-With", "XMLHttpRequest")])
            .unwrap();
        assert_eq!(options.method, Method::POST);
        assert_eq!(options.payload.len(), 3);
        assert_eq!(
            options.headers.get_str("x-requested-with"),
            Some("XMLHttpRequest")
        );
    }

    #[test]
    fn test_invalid_header_fails() {
        assert_eq!(
            RequestOptions::get().header("bad name", "v").unwrap_err(),
            NetError::InvalidHeader
        );
    }
}
