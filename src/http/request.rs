use std::collections::HashMap;

/// One parsed HTTP-shaped request.
///
/// Headers are stored with lowercased names. The request line itself is
/// kept as a pseudo-header whose value is `None`, so a handler can still
/// see it without the framer having to understand methods or paths.
#[derive(Debug, Clone)]
pub struct Request {
    /// Header names (lowercased) mapped to their value; `None` for
    /// lines that carried no `": "` separator
    pub headers: HashMap<String, Option<String>>,
    /// Request body, exactly `content-length` bytes
    pub body: Vec<u8>,
}

impl Request {
    /// Retrieves a header value by its lowercased name.
    ///
    /// # Example
    ///
    /// ```
    /// # use std::collections::HashMap;
    /// # use hostlink::http::request::Request;
    /// let mut headers = HashMap::new();
    /// headers.insert("host".to_string(), Some("localhost".to_string()));
    /// let req = Request { headers, body: Vec::new() };
    /// assert_eq!(req.header("host"), Some("localhost"));
    /// assert_eq!(req.header("missing"), None);
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.as_deref())
    }

    /// Retrieves the `content-length` header value and parses it as a
    /// usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
}
