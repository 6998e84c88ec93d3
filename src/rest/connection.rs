//! Per-connection lifecycle state machine.
//!
//! A [`Connection`] owns one accepted socket from accept to close and drives
//! it through read, dispatch, and write phases without ever blocking. The
//! event loop asks each connection what it needs ([`Connection::update_interest`])
//! before polling, then delivers readiness ([`Connection::process`]) once per
//! iteration. A single `process` call performs at most one read syscall, one
//! write syscall, or one handler dispatch, so no connection can hold up the
//! shared loop.
//!
//! Each phase carries its own wall-clock budget measured from the phase's
//! start. Transitions and the `start_time` re-arm happen in one place
//! ([`Connection::transition`]); a stale timestamp would otherwise either cut
//! a client off early or let it hang the phase forever.

use std::io::{ErrorKind, Read, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::rest::parser::{Feed, ParseError, Parser};
use crate::rest::request::Request;
use crate::rest::resource::{CompletionSlot, Dispatch, Handler};
use crate::rest::response::Response;
use crate::rest::writer::{ResponseWriter, WriteProgress};

/// Per-phase deadline budgets.
///
/// Read-slow clients get their own allowance; handler execution and response
/// flushing are budgeted independently, so no single slow phase can consume a
/// connection's whole lifetime.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub read: Duration,
    pub handler: Duration,
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(2),
            handler: Duration::from_secs(10),
            write: Duration::from_secs(10),
        }
    }
}

/// What a connection currently needs from the event loop: socket readiness
/// and/or a wakeup at its phase deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interest {
    pub readable: bool,
    pub writable: bool,
    pub deadline: Option<Instant>,
}

/// Lifecycle phase. Each variant owns only the data that phase needs, so a
/// buffer from a finished phase cannot be touched by a later one.
enum Phase {
    /// Pulling bytes from the socket into the parser.
    Reading { parser: Parser },
    /// Waiting for an asynchronous handler to resolve its completion slot.
    Waiting { pending: CompletionSlot },
    /// Flushing the serialized response.
    Writing { writer: ResponseWriter },
    /// Socket is done; the connection table may drop this connection, which
    /// closes the socket.
    Complete,
}

/// Phase transition decided by one `process` step.
enum Step {
    Stay,
    Dispatch(Request),
    Write(Response),
    Finish,
}

/// State machine for one accepted management-plane socket.
///
/// Generic over the byte stream so tests can drive it with a scripted
/// in-memory stream and simulated time; the event loop instantiates it with a
/// non-blocking `mio` TCP stream.
pub struct Connection<S> {
    stream: S,
    handler: Rc<dyn Handler>,
    timeouts: Timeouts,
    phase: Phase,
    start_time: Instant,
}

impl<S: Read + Write> Connection<S> {
    pub fn new(stream: S, handler: Rc<dyn Handler>, timeouts: Timeouts, now: Instant) -> Self {
        Self {
            stream,
            handler,
            timeouts,
            phase: Phase::Reading { parser: Parser::new() },
            start_time: now,
        }
    }

    /// The underlying stream, for event-loop registration.
    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Whether this connection can be removed from the table.
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Complete)
    }

    /// Current interest, a pure function of phase and phase start time.
    /// Performs no I/O; calling it repeatedly without an intervening
    /// [`Connection::process`] returns the same value.
    pub fn update_interest(&self) -> Interest {
        match self.phase {
            Phase::Reading { .. } => Interest {
                readable: true,
                writable: false,
                deadline: Some(self.start_time + self.timeouts.read),
            },
            Phase::Waiting { .. } => Interest {
                readable: false,
                writable: false,
                deadline: Some(self.start_time + self.timeouts.handler),
            },
            Phase::Writing { .. } => Interest {
                readable: false,
                writable: true,
                deadline: Some(self.start_time + self.timeouts.write),
            },
            Phase::Complete => Interest {
                readable: false,
                writable: false,
                deadline: None,
            },
        }
    }

    /// Advances the state machine by one step. The only mutating entry point.
    ///
    /// Never blocks: at most one read syscall, one write syscall, or one
    /// handler dispatch per call. Safe to call with neither readiness flag
    /// set; that is a pure deadline check.
    pub fn process(&mut self, readable: bool, writable: bool, now: Instant) {
        let deadline = self.update_interest().deadline;

        let step = match &mut self.phase {
            Phase::Reading { parser } => {
                step_reading(&mut self.stream, parser, readable, deadline, now)
            }
            Phase::Waiting { pending } => step_waiting(pending, deadline, now),
            Phase::Writing { writer } => {
                step_writing(&mut self.stream, writer, writable, deadline, now)
            }
            Phase::Complete => Step::Stay,
        };

        match step {
            Step::Stay => {}
            Step::Dispatch(request) => {
                tracing::debug!(method = ?request.method, path = %request.path, "request parsed");
                match self.handler.handle(&request) {
                    Dispatch::Response(response) => {
                        self.transition(Phase::Writing { writer: ResponseWriter::new(&response) }, now);
                    }
                    Dispatch::Pending(pending) => {
                        self.transition(Phase::Waiting { pending }, now);
                    }
                }
            }
            Step::Write(response) => {
                self.transition(Phase::Writing { writer: ResponseWriter::new(&response) }, now);
            }
            Step::Finish => {
                self.transition(Phase::Complete, now);
            }
        }
    }

    /// The single place a phase changes; re-arms the phase timestamp.
    fn transition(&mut self, phase: Phase, now: Instant) {
        self.phase = phase;
        self.start_time = now;
    }
}

fn step_reading<S: Read>(
    stream: &mut S,
    parser: &mut Parser,
    readable: bool,
    deadline: Option<Instant>,
    now: Instant,
) -> Step {
    if deadline.is_some_and(|d| now >= d) {
        tracing::debug!("read deadline elapsed, dropping connection");
        return Step::Finish;
    }
    if !readable {
        return Step::Stay;
    }

    let mut chunk = [0u8; 1024];
    match stream.read(&mut chunk) {
        // Peer closed before finishing its request; nothing to answer.
        Ok(0) => Step::Finish,
        Ok(n) => match parser.feed(&chunk[..n]) {
            Ok(Feed::NeedMore) => Step::Stay,
            Ok(Feed::Complete(request)) => Step::Dispatch(request),
            Err(ParseError::TooLarge) => {
                tracing::warn!("request exceeds buffer cap");
                Step::Write(Response::payload_too_large())
            }
            Err(e) => {
                tracing::warn!(error = ?e, "malformed request");
                Step::Write(Response::bad_request())
            }
        },
        Err(e) if e.kind() == ErrorKind::WouldBlock => Step::Stay,
        Err(e) => {
            tracing::debug!(error = %e, "read failed, dropping connection");
            Step::Finish
        }
    }
}

fn step_waiting(pending: &CompletionSlot, deadline: Option<Instant>, now: Instant) -> Step {
    // When a result lands on the same tick its deadline expires, the deadline
    // wins and the timeout response is sent.
    if deadline.is_some_and(|d| now >= d) {
        tracing::warn!("handler deadline elapsed, substituting timeout response");
        return Step::Write(Response::request_timeout());
    }
    match pending.poll() {
        Some(response) => Step::Write(response),
        None => Step::Stay,
    }
}

fn step_writing<S: Write>(
    stream: &mut S,
    writer: &mut ResponseWriter,
    writable: bool,
    deadline: Option<Instant>,
    now: Instant,
) -> Step {
    if deadline.is_some_and(|d| now >= d) {
        tracing::debug!("write deadline elapsed, abandoning response");
        return Step::Finish;
    }
    if !writable {
        return Step::Stay;
    }

    match writer.write_some(stream) {
        Ok(WriteProgress::Done) => Step::Finish,
        Ok(WriteProgress::Partial) => Step::Stay,
        Err(e) => {
            tracing::debug!(error = %e, "write failed, dropping connection");
            Step::Finish
        }
    }
}
