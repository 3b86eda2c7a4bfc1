//! Request payloads for POST and login requests.

use bytes::Bytes;

/// Content type sent with [`RequestBody::Form`] payloads.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body (GET hops, redirects).
    #[default]
    Empty,
    /// Raw bytes or text, sent unescaped.
    Bytes(Bytes),
    /// Key/value pairs, url-encoded on the wire.
    Form(Vec<(String, String)>),
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Bytes(Bytes::from(s))
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(v))
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Bytes(Bytes::from(s.to_owned()))
    }
}

impl From<Bytes> for RequestBody {
    fn from(b: Bytes) -> Self {
        RequestBody::Bytes(b)
    }
}

impl RequestBody {
    /// Build a form payload from borrowed pairs.
    pub fn form<K, V>(pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        RequestBody::Form(
            pairs
                .iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
                .collect(),
        )
    }

    /// Build a JSON payload.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, crate::base::neterror::NetError> {
        Ok(RequestBody::Bytes(Bytes::from(serde_json::to_vec(value)?)))
    }

    /// Check if the body is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Empty => true,
            RequestBody::Bytes(b) => b.is_empty(),
            RequestBody::Form(pairs) => pairs.is_empty(),
        }
    }

    /// Get the length of the encoded body in bytes.
    pub fn len(&self) -> usize {
        self.to_bytes().len()
    }

    /// Content type implied by the payload kind, if any.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Form(_) => Some(FORM_CONTENT_TYPE),
            _ => None,
        }
    }

    /// Wire encoding of the payload.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(b) => b.clone(),
            RequestBody::Form(pairs) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs.iter())
                    .finish();
                Bytes::from(encoded)
            }
        }
    }
}
