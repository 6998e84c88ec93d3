//! Management-plane REST front end for a mesh border router daemon.
//!
//! Exposes node, topology, and diagnostic state as JSON over HTTP and is
//! built to share a single-threaded event loop with the rest of the daemon:
//! every socket is non-blocking and every connection advances one bounded
//! step per loop turn.

pub mod config;
pub mod mesh;
pub mod rest;
pub mod server;
