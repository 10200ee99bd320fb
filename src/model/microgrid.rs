use serde::{Deserialize, Serialize};

/// Supply/demand balance of a microgrid or one of its areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    Balanced,
    Excess,
    Deficit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Solar,
    Battery,
    Load,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Online,
    Offline,
}

/// A physical node on the microgrid bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicrogridNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub status: NodeStatus,
    /// Power flowing through the node (kW).
    pub flow: f32,
}

/// One load-balancing area of the microgrid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicrogridArea {
    pub id: String,
    pub name: String,
    /// Demand (kW).
    pub consumption: f32,
    /// Local generation (kW).
    pub production: f32,
    /// Battery state of charge (percent, 0-100).
    pub battery: f32,
    pub status: BalanceStatus,
}

impl MicrogridArea {
    /// Production minus consumption (kW).
    pub fn balance(&self) -> f32 {
        self.production - self.consumption
    }
}

/// Aggregate load-balancing state of the whole microgrid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicrogridState {
    pub id: String,
    /// Current load (kW).
    pub current_load: f32,
    /// Target load (kW).
    pub optimal_load: f32,
    /// Percent, 0-100.
    pub efficiency: f32,
    pub battery_level: f32,
    pub battery_capacity: f32,
    pub connected_devices: u32,
    /// Never exceeds `connected_devices`.
    pub priority_devices: u32,
    pub status: BalanceStatus,
    pub nodes: Vec<MicrogridNode>,
    pub total_load: f32,
    pub total_generation: f32,
    /// Percent, 0-100.
    pub battery_status: f32,
    /// Signed kW, positive = exporting.
    pub grid_connection: f32,
    pub areas: Vec<MicrogridArea>,
}

impl MicrogridState {
    pub fn is_exporting(&self) -> bool {
        self.grid_connection > 0.0
    }
}
