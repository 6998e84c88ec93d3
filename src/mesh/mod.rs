//! Typed mesh network state exposed over the REST interface.
//!
//! The border router's control-protocol client keeps a [`MeshCache`] up to
//! date as the radio stack reports changes; the REST resource layer only ever
//! reads snapshots out of it. The control-protocol transport itself lives
//! outside this crate.

use serde::Serialize;

/// Leader data advertised by the current partition leader.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LeaderData {
    pub partition_id: u32,
    pub weighting: u8,
    pub data_version: u8,
    pub stable_data_version: u8,
    pub leader_router_id: u8,
}

/// Snapshot of this node's own state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeInfo {
    /// Device role ("disabled", "detached", "child", "router", "leader").
    pub state: String,
    pub network_name: String,
    /// Extended address, 16 hex chars.
    pub ext_address: String,
    pub rloc16: u16,
    /// Extended PAN ID, 16 hex chars.
    pub ext_pan_id: String,
    /// Mesh-local routing locator address.
    pub rloc_address: String,
    pub leader_data: LeaderData,
    pub num_of_router: u8,
}

/// One child entry in a router's child table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChildEntry {
    pub child_id: u16,
    pub timeout: u32,
    pub mode: LinkMode,
}

/// Link mode bits for a device.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinkMode {
    pub rx_on_when_idle: bool,
    pub device_type: bool,
    pub network_data: bool,
}

/// Diagnostic record for one router in the mesh, as gathered by a
/// network-diagnostic collection pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouterDiagnostics {
    pub ext_address: String,
    pub rloc16: u16,
    pub mode: LinkMode,
    pub leader_data: LeaderData,
    pub child_table: Vec<ChildEntry>,
    #[serde(rename = "IP6AddressList")]
    pub ip6_address_list: Vec<String>,
}

/// In-process snapshot of mesh state.
///
/// Written by the control-protocol client, read by the REST resources. The
/// whole cache lives on the single event-loop thread, so plain `&mut`
/// mutation is enough.
#[derive(Debug, Clone)]
pub struct MeshCache {
    node: NodeInfo,
    routers: Vec<RouterDiagnostics>,
}

impl MeshCache {
    /// A cache for a node that has not attached to any partition yet.
    pub fn detached() -> Self {
        Self {
            node: NodeInfo {
                state: "detached".to_string(),
                network_name: String::new(),
                ext_address: "0000000000000000".to_string(),
                rloc16: 0xffff,
                ext_pan_id: "0000000000000000".to_string(),
                rloc_address: "::".to_string(),
                leader_data: LeaderData {
                    partition_id: 0,
                    weighting: 0,
                    data_version: 0,
                    stable_data_version: 0,
                    leader_router_id: 0,
                },
                num_of_router: 0,
            },
            routers: Vec::new(),
        }
    }

    pub fn node(&self) -> &NodeInfo {
        &self.node
    }

    pub fn routers(&self) -> &[RouterDiagnostics] {
        &self.routers
    }

    /// Replaces the node snapshot. Called by the control-protocol client when
    /// the radio stack reports a state change.
    pub fn set_node(&mut self, node: NodeInfo) {
        self.node = node;
    }

    /// Replaces the diagnostic topology. Called once a diagnostic collection
    /// pass over the mesh has finished.
    pub fn set_routers(&mut self, routers: Vec<RouterDiagnostics>) {
        self.routers = routers;
    }
}
