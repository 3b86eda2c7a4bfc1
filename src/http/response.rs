//! A single fetched hop: status, ordered headers and body text.

use http::StatusCode;

/// Response to one request, before any redirect handling.
///
/// Headers are kept as an ordered list so repeated entries (several
/// `Set-Cookie` lines) survive. Name lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopResponse {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: String,
}

impl HopResponse {
    pub fn new(status: StatusCode, headers: Vec<(String, String)>, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// A `200 OK` response with the given body and no headers.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, Vec::new(), body)
    }

    /// A `302 Found` pointing at `location`.
    pub fn redirect(location: &str) -> Self {
        Self::new(
            StatusCode::FOUND,
            vec![("Location".to_string(), location.to_string())],
            "",
        )
    }

    /// Append a header, keeping any existing entries with the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// All headers in wire order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_all(name).next()
    }

    /// Every value of `name`, in wire order.
    pub fn header_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + 'n
    where
        'a: 'n,
    {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Raw `Set-Cookie` values.
    pub fn set_cookies(&self) -> impl Iterator<Item = &str> + '_ {
        self.header_all("Set-Cookie")
    }

    /// Redirect target, if the server sent one.
    pub fn location(&self) -> Option<&str> {
        self.header("Location").filter(|l| !l.is_empty())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_set_cookie_preserved() {
        let resp = HopResponse::ok("")
            .with_header("Set-Cookie", "a=1; Path=/")
            .with_header("content-type", "text/html")
            .with_header("set-cookie", "b=2; Path=/x");

        let cookies: Vec<_> = resp.set_cookies().collect();
        assert_eq!(cookies, ["a=1; Path=/", "b=2; Path=/x"]);
    }

    #[test]
    fn test_location_lookup_ignores_case() {
        let resp = HopResponse::new(
            StatusCode::SEE_OTHER,
            vec![("location".into(), "/next".into())],
            "",
        );
        assert_eq!(resp.location(), Some("/next"));
        assert_eq!(HopResponse::ok("x").location(), None);
    }

    #[test]
    fn test_empty_location_is_ignored() {
        let resp = HopResponse::ok("").with_header("Location", "");
        assert_eq!(resp.location(), None);
    }
}
