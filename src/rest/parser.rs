use std::collections::HashMap;

use bytes::BytesMut;

use crate::rest::request::{Method, Request};

/// Hard cap on buffered request bytes. A client that never finishes its
/// headers must not grow the inbound buffer without bound.
const MAX_REQUEST_SIZE: usize = 16 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidMethod,
    InvalidHeader,
    InvalidContentLength,
    TooLarge,
    Incomplete,
}

/// Outcome of feeding bytes into a [`Parser`].
#[derive(Debug)]
pub enum Feed {
    /// The buffered bytes do not yet form a complete request.
    NeedMore,
    /// A complete request was parsed; the parser is done.
    Complete(Request),
}

/// Incremental push parser, one instance per connection.
///
/// Accumulates inbound chunks and re-attempts a full parse after each feed.
/// Re-parsing from the start on every chunk is fine at management-plane
/// request sizes and keeps the parser stateless between feeds.
#[derive(Debug, Default)]
pub struct Parser {
    buf: BytesMut,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(1024),
        }
    }

    /// Feeds one chunk of socket bytes. Never blocks.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Feed, ParseError> {
        if self.buf.len() + bytes.len() > MAX_REQUEST_SIZE {
            return Err(ParseError::TooLarge);
        }
        self.buf.extend_from_slice(bytes);

        match parse_request(&self.buf) {
            Ok((request, _consumed)) => Ok(Feed::Complete(request)),
            Err(ParseError::Incomplete) => Ok(Feed::NeedMore),
            Err(e) => Err(e),
        }
    }
}

/// Parses a single request out of `buf`, returning it together with the
/// number of bytes consumed. `Err(Incomplete)` means more bytes are needed.
pub fn parse_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str = std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;

    // Headers
    let mut headers = HashMap::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;

        headers.insert(key.trim().to_string(), value.trim().to_string());
    }

    // Body
    let content_length = headers
        .get("Content-Length")
        .map(|v| v.parse::<usize>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()?
        .unwrap_or(0);

    if content_length > MAX_REQUEST_SIZE {
        return Err(ParseError::TooLarge);
    }

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let body = body_bytes[..content_length].to_vec();

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body,
    };

    let total_consumed = headers_end + 4 + content_length;
    Ok((request, total_consumed))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
