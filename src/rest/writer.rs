use std::io::{self, ErrorKind, Write};

use crate::rest::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes a response into the exact bytes put on the wire.
///
/// Headers are emitted in sorted order so the output is deterministic for a
/// given response.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    let mut keys: Vec<&String> = resp.headers.keys().collect();
    keys.sort();
    for k in keys {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(resp.headers[k].as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(&resp.body);

    buf
}

/// Progress of one flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteProgress {
    /// Some or none of the remaining bytes were accepted; call again when the
    /// socket is writable.
    Partial,
    /// The whole response has been flushed.
    Done,
}

/// Outbound buffer for one response, flushed across multiple non-blocking
/// write attempts.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    /// Bytes still to be written. Non-increasing across calls to
    /// [`ResponseWriter::write_some`].
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.written
    }

    /// Issues at most one write syscall. `WouldBlock` is a normal
    /// progress-free return; a zero-length write or any other error means the
    /// peer is gone and the connection must be dropped.
    pub fn write_some<W: Write>(&mut self, stream: &mut W) -> io::Result<WriteProgress> {
        if self.remaining() == 0 {
            return Ok(WriteProgress::Done);
        }

        match stream.write(&self.buffer[self.written..]) {
            Ok(0) => Err(io::Error::new(
                ErrorKind::WriteZero,
                "peer stopped accepting response bytes",
            )),
            Ok(n) => {
                self.written += n;
                if self.remaining() == 0 {
                    Ok(WriteProgress::Done)
                } else {
                    Ok(WriteProgress::Partial)
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(WriteProgress::Partial),
            Err(e) => Err(e),
        }
    }
}
