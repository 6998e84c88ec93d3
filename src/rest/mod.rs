//! RESTful management interface.
//!
//! This module implements the HTTP front end of the border router daemon:
//! node, topology, and diagnostic state served as JSON over a small,
//! single-threaded HTTP/1.1 endpoint.
//!
//! # Submodules
//!
//! - **`connection`**: the per-socket lifecycle state machine driven by the
//!   event loop
//! - **`parser`**: incremental HTTP request parser
//! - **`request`**: parsed request representation
//! - **`response`**: response representation with builder and synthesized
//!   error responses
//! - **`writer`**: non-blocking response serialization and flushing
//! - **`resource`**: route table mapping paths to mesh state
//!
//! # Connection lifecycle
//!
//! Each accepted socket moves forward through four phases, each with its own
//! deadline:
//!
//! ```text
//!        ┌──────────────────┐
//!        │  ReadingRequest  │ ← pull bytes, feed the parser
//!        └────────┬─────────┘
//!                 │ request parsed          parse error → Writing (400)
//!                 ▼                         peer close / deadline → Complete
//!        ┌──────────────────┐
//!        │     Waiting      │ ← handler running asynchronously
//!        └────────┬─────────┘
//!                 │ result ready            deadline → Writing (408)
//!                 ▼
//!        ┌──────────────────┐
//!        │ WritingResponse  │ ← flush, possibly across partial writes
//!        └────────┬─────────┘
//!                 │ flushed / deadline / socket error
//!                 ▼
//!        ┌──────────────────┐
//!        │     Complete     │ ← socket closed, table removes the connection
//!        └──────────────────┘
//! ```
//!
//! One request per connection; the socket always closes after the response.

pub mod connection;
pub mod parser;
pub mod request;
pub mod resource;
pub mod response;
pub mod writer;
