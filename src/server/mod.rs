//! Listening socket setup and the single-threaded event loop.

pub mod listener;
pub mod reactor;
