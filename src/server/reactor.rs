//! The event loop that drives every connection.
//!
//! Strictly single-threaded and cooperative: each iteration asks every live
//! connection for its interest and deadline, polls with the minimum timeout,
//! then gives every connection one `process` turn. Connections whose
//! descriptor saw no event still get a turn with neither readiness flag set,
//! which serves as their deadline tick.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::rc::Rc;
use std::time::Instant;

use anyhow::Context;
use mio::net::TcpStream;
use mio::{Events, Poll, Token};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::mesh::MeshCache;
use crate::rest::connection::{Connection, Interest, Timeouts};
use crate::rest::resource::{Handler, Resource};
use crate::server::listener;

const LISTENER: Token = Token(0);
const EVENT_CAPACITY: usize = 128;

struct Entry {
    conn: Connection<TcpStream>,
    registered: bool,
}

fn socket_interest(interest: &Interest) -> Option<mio::Interest> {
    match (interest.readable, interest.writable) {
        (true, true) => Some(mio::Interest::READABLE | mio::Interest::WRITABLE),
        (true, false) => Some(mio::Interest::READABLE),
        (false, true) => Some(mio::Interest::WRITABLE),
        (false, false) => None,
    }
}

/// Runs the management interface until an unrecoverable error.
pub fn run(cfg: &Config, mesh: Rc<RefCell<MeshCache>>) -> anyhow::Result<()> {
    let mut listener = listener::bind(&cfg.listen_addr)?;
    let mut poll = Poll::new().context("creating poller")?;
    poll.registry()
        .register(&mut listener, LISTENER, mio::Interest::READABLE)?;

    let resource = Rc::new(Resource::new(mesh, cfg.diagnostics_window()));
    let handler: Rc<dyn Handler> = resource.clone();
    let timeouts = cfg.timeouts();

    let mut events = Events::with_capacity(EVENT_CAPACITY);
    let mut table: HashMap<Token, Entry> = HashMap::new();
    let mut next_token = 1usize;

    loop {
        // Interest and timeout aggregation pass. Connections with socket
        // interest are re-registered every turn: they read or write at most
        // one chunk per turn, and the re-registration re-arms readiness for
        // bytes still buffered in the kernel.
        let now = Instant::now();
        let mut wake_at = resource.next_wakeup();
        for (token, entry) in table.iter_mut() {
            let interest = entry.conn.update_interest();
            if let Some(deadline) = interest.deadline {
                wake_at = Some(wake_at.map_or(deadline, |w| w.min(deadline)));
            }
            match socket_interest(&interest) {
                Some(wanted) if entry.registered => {
                    poll.registry()
                        .reregister(entry.conn.stream_mut(), *token, wanted)?;
                }
                Some(wanted) => {
                    poll.registry()
                        .register(entry.conn.stream_mut(), *token, wanted)?;
                    entry.registered = true;
                }
                None if entry.registered => {
                    poll.registry().deregister(entry.conn.stream_mut())?;
                    entry.registered = false;
                }
                None => {}
            }
        }

        let timeout = wake_at.map(|t| t.saturating_duration_since(now));
        poll.poll(&mut events, timeout).context("polling")?;

        let now = Instant::now();
        let mut ready: HashMap<Token, (bool, bool)> = HashMap::new();
        let mut accept_ready = false;
        for event in events.iter() {
            if event.token() == LISTENER {
                accept_ready = true;
                continue;
            }
            let flags = ready.entry(event.token()).or_insert((false, false));
            flags.0 |= event.is_readable();
            flags.1 |= event.is_writable();
        }

        if accept_ready {
            accept_all(&mut listener, &mut table, &mut next_token, &handler, timeouts, now)?;
        }

        // Resolve expired diagnostic collections first so a connection
        // waiting on one sees the result in this turn, not the next.
        resource.process(now);

        // One turn per connection; no event means a pure deadline tick.
        for (token, entry) in table.iter_mut() {
            let (readable, writable) = ready.get(token).copied().unwrap_or((false, false));
            entry.conn.process(readable, writable, now);
        }

        let done: Vec<Token> = table
            .iter()
            .filter(|(_, entry)| entry.conn.is_complete())
            .map(|(token, _)| *token)
            .collect();
        for token in done {
            if let Some(mut entry) = table.remove(&token) {
                if entry.registered {
                    poll.registry().deregister(entry.conn.stream_mut())?;
                }
                debug!(token = token.0, "connection closed");
            }
        }
    }
}

fn accept_all(
    listener: &mut mio::net::TcpListener,
    table: &mut HashMap<Token, Entry>,
    next_token: &mut usize,
    handler: &Rc<dyn Handler>,
    timeouts: Timeouts,
    now: Instant,
) -> anyhow::Result<()> {
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                let token = Token(*next_token);
                *next_token += 1;
                info!(%peer, token = token.0, "Accepted connection");
                let conn = Connection::new(stream, handler.clone(), timeouts, now);
                // Registration happens in the next aggregation pass.
                table.insert(token, Entry { conn, registered: false });
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "accept failed");
                return Err(e).context("accepting connection");
            }
        }
    }
}
