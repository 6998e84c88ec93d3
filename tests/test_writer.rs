use std::io::{self, Write};

use borderd_rest::rest::response::Response;
use borderd_rest::rest::writer::{ResponseWriter, WriteProgress, serialize_response};

/// Writer that accepts a fixed number of bytes per call, with optional
/// injected failures.
struct ThrottledWriter {
    accepted: Vec<u8>,
    per_call: usize,
    fail_next: Option<io::ErrorKind>,
}

impl ThrottledWriter {
    fn new(per_call: usize) -> Self {
        Self {
            accepted: Vec::new(),
            per_call,
            fail_next: None,
        }
    }
}

impl Write for ThrottledWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(kind) = self.fail_next.take() {
            return Err(kind.into());
        }
        let n = self.per_call.min(buf.len());
        self.accepted.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_flush_across_partial_writes() {
    let resp = Response::ok_json(&"x");
    let expected = serialize_response(&resp);
    let mut writer = ResponseWriter::new(&resp);
    let mut sink = ThrottledWriter::new(7);

    let mut last_remaining = writer.remaining();
    loop {
        match writer.write_some(&mut sink).unwrap() {
            WriteProgress::Done => break,
            WriteProgress::Partial => {
                assert!(writer.remaining() < last_remaining);
                last_remaining = writer.remaining();
            }
        }
    }

    assert_eq!(writer.remaining(), 0);
    assert_eq!(sink.accepted, expected);
}

#[test]
fn test_would_block_makes_no_progress() {
    let resp = Response::ok_json(&"x");
    let mut writer = ResponseWriter::new(&resp);
    let mut sink = ThrottledWriter::new(4);
    sink.fail_next = Some(io::ErrorKind::WouldBlock);

    let before = writer.remaining();
    assert_eq!(writer.write_some(&mut sink).unwrap(), WriteProgress::Partial);
    assert_eq!(writer.remaining(), before);
}

#[test]
fn test_broken_pipe_is_an_error() {
    let resp = Response::ok_json(&"x");
    let mut writer = ResponseWriter::new(&resp);
    let mut sink = ThrottledWriter::new(4);
    sink.fail_next = Some(io::ErrorKind::BrokenPipe);

    let err = writer.write_some(&mut sink).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}

#[test]
fn test_zero_length_write_is_an_error() {
    let resp = Response::ok_json(&"x");
    let mut writer = ResponseWriter::new(&resp);
    let mut sink = ThrottledWriter::new(0);

    let err = writer.write_some(&mut sink).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::WriteZero);
}

#[test]
fn test_done_writer_stays_done() {
    let resp = Response::ok_json(&"x");
    let mut writer = ResponseWriter::new(&resp);
    let mut sink = ThrottledWriter::new(usize::MAX);

    assert_eq!(writer.write_some(&mut sink).unwrap(), WriteProgress::Done);
    assert_eq!(writer.write_some(&mut sink).unwrap(), WriteProgress::Done);
}
