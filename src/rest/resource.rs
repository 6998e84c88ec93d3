//! Resource layer: maps parsed requests to responses.
//!
//! Node state resources answer synchronously out of the [`MeshCache`]. The
//! diagnostics resource is asynchronous: a collection pass over the mesh
//! takes a configurable window, so the handler returns a pending completion
//! slot and the event loop ticks [`Resource::process`] until the window
//! elapses and the slot is resolved.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::mesh::MeshCache;
use crate::rest::request::{Method, Request};
use crate::rest::response::Response;

/// Result of dispatching a request to a handler.
pub enum Dispatch {
    /// The handler produced a response synchronously.
    Response(Response),
    /// The handler scheduled asynchronous work; the slot resolves later on
    /// the same event-loop thread.
    Pending(CompletionSlot),
}

/// Translates a parsed request into a response, possibly asynchronously.
pub trait Handler {
    fn handle(&self, request: &Request) -> Dispatch;
}

/// Single-threaded completion channel between a handler and the connection
/// that is waiting on it.
///
/// The handler keeps one clone and calls [`CompletionSlot::complete`]; the
/// connection polls its clone each loop turn. `Rc` keeps this on the event
/// loop thread by construction.
#[derive(Clone, Default)]
pub struct CompletionSlot {
    inner: Rc<RefCell<Option<Response>>>,
}

impl CompletionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the slot. A second completion overwrites the first; the
    /// connection only ever takes one response out.
    pub fn complete(&self, response: Response) {
        *self.inner.borrow_mut() = Some(response);
    }

    /// Takes the response out if the slot has been resolved.
    pub fn poll(&self) -> Option<Response> {
        self.inner.borrow_mut().take()
    }
}

struct PendingDiagnostics {
    slot: CompletionSlot,
    ready_at: Instant,
}

/// The border router's REST resource table.
pub struct Resource {
    mesh: Rc<RefCell<MeshCache>>,
    collection_window: Duration,
    pending: RefCell<Vec<PendingDiagnostics>>,
}

impl Resource {
    pub fn new(mesh: Rc<RefCell<MeshCache>>, collection_window: Duration) -> Self {
        Self {
            mesh,
            collection_window,
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Resolves diagnostic collections whose window has elapsed. Called once
    /// per event-loop iteration.
    pub fn process(&self, now: Instant) {
        let mut pending = self.pending.borrow_mut();
        pending.retain(|p| {
            if now >= p.ready_at {
                let mesh = self.mesh.borrow();
                tracing::debug!(routers = mesh.routers().len(), "diagnostic collection finished");
                p.slot.complete(Response::ok_json(&mesh.routers()));
                false
            } else {
                true
            }
        });
    }

    /// Earliest instant at which a pending collection becomes ready, fed into
    /// the event loop's poll timeout.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.pending.borrow().iter().map(|p| p.ready_at).min()
    }

    fn start_diagnostics(&self) -> Dispatch {
        let slot = CompletionSlot::new();
        self.pending.borrow_mut().push(PendingDiagnostics {
            slot: slot.clone(),
            ready_at: Instant::now() + self.collection_window,
        });
        tracing::debug!("diagnostic collection started");
        Dispatch::Pending(slot)
    }
}

impl Handler for Resource {
    fn handle(&self, request: &Request) -> Dispatch {
        if request.method != Method::GET {
            return Dispatch::Response(Response::method_not_allowed());
        }

        if request.path == "/diagnostics" {
            return self.start_diagnostics();
        }

        let mesh = self.mesh.borrow();
        let node = mesh.node();
        let response = match request.path.as_str() {
            "/node" => Response::ok_json(node),
            "/node/state" => Response::ok_json(&node.state),
            "/node/ext-address" => Response::ok_json(&node.ext_address),
            "/node/network-name" => Response::ok_json(&node.network_name),
            "/node/rloc16" => Response::ok_json(&node.rloc16),
            "/node/rloc" => Response::ok_json(&node.rloc_address),
            "/node/ext-panid" => Response::ok_json(&node.ext_pan_id),
            "/node/leader-data" => Response::ok_json(&node.leader_data),
            "/node/num-of-router" => Response::ok_json(&node.num_of_router),
            _ => Response::not_found(),
        };
        Dispatch::Response(response)
    }
}
