//! Attribute scraping from HTML text.
//!
//! These helpers do not parse markup. They locate a known fragment (the
//! *locator*), find the attribute name near it, and read the quoted value
//! that follows `key=`. Callers use them to pull form defaults and hidden
//! tokens out of login pages.
//!
//! ```rust
//! use sessionnet::extract::{extract, get_form_param};
//!
//! let html = r#"<input name="csrf" value="a1b2"><a href='/next' id="go">"#;
//! assert_eq!(get_form_param(html, r#"name="csrf""#).unwrap(), "a1b2");
//! assert_eq!(extract(html, "href", "<a").unwrap(), "/next");
//! ```

use crate::base::neterror::NetError;

/// Value of the first `key` attribute at or after `locator`.
///
/// A `locator` that does not occur in `body` is an error
/// (`MissingField(locator)`); the search never falls back to the start of
/// the body.
pub fn extract<'a>(body: &'a str, key: &str, locator: &str) -> Result<&'a str, NetError> {
    let anchor = locate(body, locator)?;
    let pos = body[anchor..]
        .find(key)
        .map(|p| anchor + p)
        .ok_or_else(|| NetError::missing_field(key))?;
    quoted_value(body, key, pos)
}

/// Value of the last `key` attribute starting at or before `locator`.
///
/// For markup where the attribute precedes the text that identifies it,
/// e.g. `<option value="7">Seven</option>` located by `>Seven<`.
pub fn extract_reverse<'a>(body: &'a str, key: &str, locator: &str) -> Result<&'a str, NetError> {
    let anchor = locate(body, locator)?;
    let pos = body
        .match_indices(key)
        .map(|(p, _)| p)
        .take_while(|&p| p <= anchor)
        .last()
        .ok_or_else(|| NetError::missing_field(key))?;
    quoted_value(body, key, pos)
}

/// Default value of the form field identified by `locator`.
pub fn get_form_param<'a>(body: &'a str, locator: &str) -> Result<&'a str, NetError> {
    extract(body, "value", locator)
}

fn locate(body: &str, locator: &str) -> Result<usize, NetError> {
    body.find(locator)
        .ok_or_else(|| NetError::missing_field(locator))
}

/// Read `key=<q>value<q>` where `key` starts at `pos`.
///
/// The character right after `key` is the separator and the next one is the
/// quote; the value runs up to the next occurrence of that same quote.
fn quoted_value<'a>(body: &'a str, key: &str, pos: usize) -> Result<&'a str, NetError> {
    let after_key = pos + key.len();
    let mut chars = body[after_key..].char_indices();

    let (_, separator) = chars
        .next()
        .ok_or_else(|| NetError::malformed_field(key))?;
    let (quote_offset, quote) = chars
        .next()
        .ok_or_else(|| NetError::malformed_field(key))?;
    if separator != '=' {
        return Err(NetError::malformed_field(key));
    }

    let start = after_key + quote_offset + quote.len_utf8();
    let len = body[start..]
        .find(quote)
        .ok_or_else(|| NetError::malformed_field(key))?;
    Ok(&body[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_value_after_locator() {
        let body = r#"<input name="x" value="42">"#;
        assert_eq!(extract(body, "value", "name=\"x\"").unwrap(), "42");
    }

    #[test]
    fn test_extract_skips_earlier_matches() {
        let body = r#"<input name="a" value="1"><input name="b" value="2">"#;
        assert_eq!(get_form_param(body, r#"name="b""#).unwrap(), "2");
    }

    #[test]
    fn test_extract_single_quotes() {
        let body = "<form action='/login.do' method='post'>";
        assert_eq!(extract(body, "action", "<form").unwrap(), "/login.do");
    }

    #[test]
    fn test_extract_empty_value() {
        let body = r#"<input name="token" value="">"#;
        assert_eq!(get_form_param(body, "token").unwrap(), "");
    }

    #[test]
    fn test_missing_key_after_locator() {
        let body = r#"<input value="1" name="x">"#;
        let err = extract(body, "value", r#"name="x""#).unwrap_err();
        assert_eq!(err, NetError::missing_field("value"));
    }

    #[test]
    fn test_missing_locator() {
        let err = extract(r#"<input value="1">"#, "value", "nowhere").unwrap_err();
        assert_eq!(err, NetError::missing_field("nowhere"));
    }

    #[test]
    fn test_unterminated_value() {
        let err = extract(r#"<input value="open"#, "value", "<input").unwrap_err();
        assert_eq!(err, NetError::malformed_field("value"));
    }

    #[test]
    fn test_key_at_end_of_body() {
        let err = extract("<input value", "value", "<input").unwrap_err();
        assert_eq!(err, NetError::malformed_field("value"));
    }

    #[test]
    fn test_extract_reverse_attribute_before_locator() {
        let body = r#"<option value="6">Six</option><option value="7">Seven</option>"#;
        assert_eq!(extract_reverse(body, "value", ">Seven<").unwrap(), "7");
        assert_eq!(extract_reverse(body, "value", ">Six<").unwrap(), "6");
    }

    #[test]
    fn test_extract_reverse_missing_key() {
        let body = r#"<b>Seven</b><option value="7">"#;
        let err = extract_reverse(body, "value", "Seven").unwrap_err();
        assert_eq!(err, NetError::missing_field("value"));
    }

    #[test]
    fn test_non_ascii_values() {
        let body = r#"<input name="city" value="Zürich">"#;
        assert_eq!(get_form_param(body, "city").unwrap(), "Zürich");
    }
}
