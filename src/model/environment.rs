use serde::{Deserialize, Serialize};

/// Cumulative environmental benefit of the installation. Read-only snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalImpact {
    /// CO2 emissions avoided (kg).
    pub co2_saved: f64,
    pub trees_equivalent: u32,
    pub homes_powered: u32,
    /// Water saved versus thermal generation (liters).
    pub water_saved: f64,
}
