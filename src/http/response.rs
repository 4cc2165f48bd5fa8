use std::collections::BTreeMap;

use crate::http::codec;

/// The response preamble applied to every reply.
///
/// Holds the fixed base headers, with the status line as a valueless
/// entry, plus an overridable map of extra headers. Every response is
/// `200 OK` at the transport level: action failures travel inside the
/// JSON body, never as HTTP status codes. The permissive CORS header
/// lets browser clients on any origin reach the endpoint.
#[derive(Debug, Clone)]
pub struct ResponseHeaders {
    base: Vec<(String, Option<String>)>,
    extra: BTreeMap<String, String>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        let mut headers = Self {
            base: Vec::new(),
            extra: BTreeMap::new(),
        };
        headers.reset();
        headers
    }

    /// Restores the base preamble and drops all extra headers.
    pub fn reset(&mut self) {
        self.base = vec![
            ("HTTP/1.1 200 OK".to_string(), None),
            ("Content-Type".to_string(), Some("text/json".to_string())),
            ("Access-Control-Allow-Origin".to_string(), Some("*".to_string())),
        ];
        self.extra.clear();
    }

    /// Adds or replaces an extra header applied on every build.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.extra.insert(name.into(), value.into());
    }

    /// The full ordered header list: base preamble first, then the
    /// extra headers in sorted order so identical replies frame
    /// byte-identically.
    pub fn lines(&self) -> Vec<(String, Option<String>)> {
        let mut lines = self.base.clone();
        for (name, value) in &self.extra {
            lines.push((name.clone(), Some(value.clone())));
        }
        lines
    }

    /// Builds the complete response bytes for `body`.
    ///
    /// `Content-Length` is recomputed from the serialized body length
    /// immediately before the headers are assembled, overriding any
    /// stale value.
    pub fn build(&self, body: &[u8]) -> Vec<u8> {
        let mut headers = self.clone();
        headers.set("Content-Length", body.len().to_string());
        codec::serialize_response(&headers.lines(), body)
    }
}

impl Default for ResponseHeaders {
    fn default() -> Self {
        Self::new()
    }
}
