use crate::base::neterror::NetError;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use std::str::FromStr;

/// A header map that strictly preserves insertion order.
/// Used for per-request headers so callers control what goes on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedHeaderMap {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl OrderedHeaderMap {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    /// Build a map from string pairs, failing on the first invalid entry.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Result<Self, NetError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = Self::new();
        for (k, v) in pairs {
            map.insert(k.as_ref(), v.as_ref())?;
        }
        Ok(map)
    }

    /// Update in place if the name exists (case-insensitive), else append.
    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), NetError> {
        let name_header = HeaderName::from_str(name).map_err(|_| NetError::InvalidHeader)?;
        let value_header = HeaderValue::from_str(value).map_err(|_| NetError::InvalidHeader)?;

        if let Some((_, v)) = self.headers.iter_mut().find(|(n, _)| *n == name_header) {
            *v = value_header;
        } else {
            self.headers.push((name_header, value_header));
        }
        Ok(())
    }

    /// Merge `other` into this map; entries of `other` win.
    pub fn extend_from(&mut self, other: &OrderedHeaderMap) {
        for (name, value) in &other.headers {
            if let Some((_, v)) = self.headers.iter_mut().find(|(n, _)| n == name) {
                *v = value.clone();
            } else {
                self.headers.push((name.clone(), value.clone()));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        let target = HeaderName::from_str(name).ok()?;
        self.headers
            .iter()
            .find(|(n, _)| *n == target)
            .map(|(_, v)| v)
    }

    /// Header value as text, if present and visible ASCII.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.headers.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Consumes the map and returns a standard http::HeaderMap.
    pub fn to_header_map(self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in self.headers {
            map.append(name, value);
        }
        map
    }
}
