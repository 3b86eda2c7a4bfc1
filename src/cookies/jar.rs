use crate::base::neterror::NetError;
use std::collections::BTreeMap;

/// Separator between scope tokens in a cookie's scope record.
const SCOPE_SEPARATOR: char = '|';

/// Placeholder used when a `Set-Cookie` omits `Domain` or `Path`.
const ANY_SCOPE: &str = "*";

/// Composite `Cookie` header plus the scopes each cookie name was seen with.
///
/// A `Set-Cookie` for a name/scope pair that was already recorded replaces
/// the existing `name=value` segment in place. Any other `Set-Cookie` is
/// appended, so one name may appear several times when the server issues it
/// under different `Domain`/`Path` combinations.
///
/// Scope records only ever grow for the lifetime of the jar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    header: String,
    scopes: BTreeMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a jar from a previously captured header and scope registry.
    pub fn from_parts(header: impl Into<String>, scopes: BTreeMap<String, String>) -> Self {
        Self {
            header: header.into(),
            scopes,
        }
    }

    /// The current `Cookie` header value (`a=1; b=2`).
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    /// Per-name scope records, each a `|`-terminated list of scope tokens.
    pub fn scopes(&self) -> &BTreeMap<String, String> {
        &self.scopes
    }

    pub fn scopes_for(&self, name: &str) -> Option<&str> {
        self.scopes.get(name).map(String::as_str)
    }

    /// Fold raw `Set-Cookie` values into the jar and return the new header.
    ///
    /// Accepts anything iterable: `None::<&str>` leaves the jar untouched,
    /// `Some(value)` applies one cookie, a slice or `Vec` applies them in order.
    pub fn update<I, S>(&mut self, set_cookies: I) -> &str
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in set_cookies {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                continue;
            }
            self.apply(raw);
        }
        &self.header
    }

    fn apply(&mut self, raw: &str) {
        let name = cookie_name(raw);
        let scope = scope_token(raw);
        let segment = name_value(raw);

        let recorded = self.scopes.entry(name.to_string()).or_default();
        // The k-th recorded token belongs to the k-th `name=` segment.
        let slot = recorded
            .split(SCOPE_SEPARATOR)
            .filter(|token| !token.is_empty())
            .position(|token| token == scope);

        let target = slot.and_then(|k| {
            find_segment(&self.header, name, k).or_else(|| find_segment(&self.header, name, 0))
        });

        match target {
            Some((start, end)) => {
                self.header.replace_range(start..end, segment);
            }
            None => {
                if !self.header.is_empty() {
                    self.header.push_str("; ");
                }
                self.header.push_str(segment);
                recorded.push_str(&scope);
                recorded.push(SCOPE_SEPARATOR);
            }
        }
    }

    /// Serialize the scope registry as a JSON object (name to scope record).
    pub fn scopes_json(&self) -> Result<String, NetError> {
        Ok(serde_json::to_string(&self.scopes)?)
    }

    /// Restore persisted state. Missing parts leave the jar's value as is.
    pub fn hydrate(
        &mut self,
        header: Option<String>,
        scopes_json: Option<&str>,
    ) -> Result<(), NetError> {
        if let Some(json) = scopes_json.filter(|j| !j.trim().is_empty()) {
            self.scopes = serde_json::from_str(json)?;
        }
        if let Some(header) = header {
            self.header = header;
        }
        Ok(())
    }
}

/// Cookie name: everything before the first `=`.
fn cookie_name(raw: &str) -> &str {
    raw.find('=').map(|pos| raw[..pos].trim()).unwrap_or("")
}

/// `name=value` part of a `Set-Cookie`, attributes stripped.
fn name_value(raw: &str) -> &str {
    raw.split(';').next().unwrap_or(raw).trim()
}

/// Value of a `Key=` attribute, up to the next `;` or the end of the string.
fn attribute<'a>(raw: &'a str, key: &str) -> Option<&'a str> {
    let pos = raw.find(key).filter(|&pos| pos > 0)?;
    let rest = &raw[pos + key.len()..];
    Some(rest.split(';').next().unwrap_or(rest))
}

/// Simplified Domain+Path scope key used to decide replace vs append.
pub(crate) fn scope_token(raw: &str) -> String {
    let domain = attribute(raw, "Domain=").unwrap_or(ANY_SCOPE);
    let path = attribute(raw, "Path=").unwrap_or(ANY_SCOPE);
    format!("{}{}", domain, path)
}

/// Byte range of the `nth` (zero-based) `name=...` segment in a composite header.
fn find_segment(header: &str, name: &str, nth: usize) -> Option<(usize, usize)> {
    let mut start = 0;
    let mut seen = 0;
    loop {
        let rest = &header[start..];
        let trimmed = rest.trim_start();
        let seg_start = start + (rest.len() - trimmed.len());
        let seg_len = trimmed.find(';').unwrap_or(trimmed.len());

        if trimmed[..seg_len]
            .strip_prefix(name)
            .is_some_and(|after| after.starts_with('='))
        {
            if seen == nth {
                return Some((seg_start, seg_start + seg_len));
            }
            seen += 1;
        }

        if seg_len == trimmed.len() {
            return None;
        }
        start = seg_start + seg_len + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_value_is_noop() {
        let mut jar = CookieJar::from_parts("a=1; b=2", BTreeMap::new());
        assert_eq!(jar.update(None::<&str>), "a=1; b=2");
        assert!(jar.scopes().is_empty());
    }

    #[test]
    fn test_first_cookie_is_appended() {
        let mut jar = CookieJar::new();
        jar.update(Some("JSESSIONID=abc; Path=/app; HttpOnly"));
        assert_eq!(jar.header(), "JSESSIONID=abc");
        assert_eq!(jar.scopes_for("JSESSIONID"), Some("*/app|"));
    }

    #[test]
    fn test_same_scope_replaces_in_place() {
        let mut jar = CookieJar::new();
        jar.update(["a=1; Path=/", "sid=old; Path=/", "z=9; Path=/"]);
        let before = jar.header().len();

        jar.update(Some("sid=newer; Path=/"));

        assert_eq!(jar.header(), "a=1; sid=newer; z=9");
        assert_eq!(jar.header().len(), before + "newer".len() - "old".len());
        assert_eq!(jar.scopes_for("sid"), Some("*/|"));
    }

    #[test]
    fn test_different_scopes_coexist() {
        let mut jar = CookieJar::new();
        jar.update(Some("sid=root; Path=/"));
        jar.update(Some("sid=feature; Path=/feature"));

        assert_eq!(jar.header(), "sid=root; sid=feature");
        assert_eq!(jar.scopes_for("sid"), Some("*/|*/feature|"));
    }

    #[test]
    fn test_reissue_targets_matching_scope_segment() {
        let mut jar = CookieJar::new();
        jar.update(["pref=a; Path=/", "lang=en", "pref=b; Path=/admin"]);

        jar.update(Some("pref=d; Path=/admin"));
        assert_eq!(jar.header(), "pref=a; lang=en; pref=d");

        jar.update(Some("pref=c; Path=/"));
        assert_eq!(jar.header(), "pref=c; lang=en; pref=d");
        assert_eq!(jar.scopes_for("pref"), Some("*/|*/admin|"));
    }

    #[test]
    fn test_hydrated_scope_with_fewer_segments_replaces_first() {
        let mut scopes = BTreeMap::new();
        scopes.insert("sid".to_string(), "*/|*/app|".to_string());
        let mut jar = CookieJar::from_parts("sid=only", scopes);

        jar.update(Some("sid=new; Path=/app"));

        assert_eq!(jar.header(), "sid=new");
        assert_eq!(jar.scopes_for("sid"), Some("*/|*/app|"));
    }

    #[test]
    fn test_domain_is_part_of_scope() {
        let mut jar = CookieJar::new();
        jar.update(Some("t=1; Domain=example.com; Path=/"));
        jar.update(Some("t=2; Domain=www.example.com; Path=/"));
        jar.update(Some("t=3; Domain=example.com; Path=/"));

        assert_eq!(jar.header(), "t=3; t=2");
        assert_eq!(
            jar.scopes_for("t"),
            Some("example.com/|www.example.com/|")
        );
    }

    #[test]
    fn test_replace_does_not_match_name_suffix() {
        let mut jar = CookieJar::new();
        jar.update(["sid=1", "id=2"]);
        jar.update(Some("id=3"));
        assert_eq!(jar.header(), "sid=1; id=3");
    }

    #[test]
    fn test_attribute_at_end_of_string() {
        assert_eq!(scope_token("a=1; Domain=example.com"), "example.com*");
        assert_eq!(scope_token("a=1; Path=/x"), "*/x");
        assert_eq!(scope_token("a=1"), "**");
    }

    #[test]
    fn test_hydrated_scope_without_segment_appends() {
        let mut scopes = BTreeMap::new();
        scopes.insert("sid".to_string(), "*/|".to_string());
        let mut jar = CookieJar::from_parts("", scopes);

        jar.update(Some("sid=x; Path=/"));

        assert_eq!(jar.header(), "sid=x");
        assert_eq!(jar.scopes_for("sid"), Some("*/|*/|"));
    }

    #[test]
    fn test_scopes_json_hydrate() {
        let mut jar = CookieJar::new();
        jar.update(["a=1; Path=/", "b=2; Path=/b"]);
        let json = jar.scopes_json().unwrap();

        let mut restored = CookieJar::new();
        restored
            .hydrate(Some(jar.header().to_string()), Some(&json))
            .unwrap();
        assert_eq!(restored, jar);
    }

    #[test]
    fn test_hydrate_rejects_bad_json() {
        let mut jar = CookieJar::new();
        let err = jar.hydrate(None, Some("not json")).unwrap_err();
        assert_eq!(err, NetError::JsonParseError);
    }
}
