use crate::http::request::Request;
use std::collections::HashMap;

/// Attempts to extract one complete HTTP-shaped message from `buf`.
///
/// Returns `None` while the buffer does not yet hold a full message.
/// An incomplete buffer is not an error: the caller keeps the bytes it
/// has and tries again once more have arrived. On success returns the
/// parsed request and the total number of bytes consumed so the caller
/// can discard them.
pub fn parse_request(buf: &[u8]) -> Option<(Request, usize)> {
    // Look for the header/body separator
    let headers_end = find_headers_end(buf)?;
    let header_bytes = &buf[..headers_end];

    // Each line splits at the first ": ". The request line has none,
    // so it lands in the map as a pseudo-header with no value.
    let mut headers = HashMap::new();
    for line in String::from_utf8_lossy(header_bytes).split("\r\n") {
        match line.split_once(": ") {
            Some((name, value)) => {
                headers.insert(name.to_ascii_lowercase(), Some(value.to_string()));
            }
            None => {
                headers.insert(line.to_ascii_lowercase(), None);
            }
        }
    }

    let header_length = headers_end + 4;

    // Absent or unparsable content-length both mean an empty body
    let body_length = headers
        .get("content-length")
        .and_then(|v| v.as_deref())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    let total_length = header_length + body_length;
    if buf.len() < total_length {
        return None;
    }

    let body = buf[header_length..total_length].to_vec();

    Some((Request { headers, body }, total_length))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}

/// Serializes a reply from an ordered header list and a body.
///
/// A header whose value is `None` is emitted as its name alone (the
/// status line is carried this way); everything else as `name: value`.
/// The header block is terminated by a blank line and the body bytes
/// are appended verbatim.
pub fn serialize_response(headers: &[(String, Option<String>)], body: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();

    for (name, value) in headers {
        buf.extend_from_slice(name.as_bytes());
        if let Some(value) = value {
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
        }
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf.extend_from_slice(body);

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_request(req).unwrap();

        assert_eq!(parsed.header("host"), Some("example.com"));
        assert!(parsed.body.is_empty());
        assert_eq!(consumed, req.len());
    }
}
