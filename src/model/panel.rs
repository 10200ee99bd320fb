use serde::{Deserialize, Serialize};

/// Health classification assigned by the data source.
///
/// Not derived from efficiency or temperature; the source sets it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelStatus {
    Optimal,
    Warning,
    Critical,
}

/// A single solar panel and its latest readings.
///
/// Serialized field names are camelCase; this is the layout persisted in the
/// device-local panel cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    /// Unique key, e.g. `"panel-5"`.
    pub id: String,
    pub location: String,
    /// Tilt angle (degrees).
    pub angle: f32,
    pub status: PanelStatus,
    /// Current output (kW).
    pub production: f32,
    /// Efficiency (percent, 0-100).
    pub efficiency: f32,
    /// Cell temperature (°C).
    pub temperature: f32,
    /// Next maintenance date, ISO `YYYY-MM-DD`.
    pub next_maintenance: String,
    pub alerts: Vec<String>,
}

impl Panel {
    /// Returns `true` for any panel that is not in optimal state.
    pub fn needs_attention(&self) -> bool {
        self.status != PanelStatus::Optimal
    }

    /// Returns a copy with `next_maintenance` replaced, all other fields kept.
    pub fn with_next_maintenance(&self, date: &str) -> Self {
        Self {
            next_maintenance: date.to_string(),
            ..self.clone()
        }
    }
}

/// Number of panels in each status bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PanelStatusCounts {
    pub total: usize,
    pub optimal: usize,
    pub warning: usize,
    pub critical: usize,
}

impl PanelStatusCounts {
    pub fn from_panels(panels: &[Panel]) -> Self {
        panels.iter().fold(
            Self {
                total: panels.len(),
                ..Self::default()
            },
            |mut counts, panel| {
                match panel.status {
                    PanelStatus::Optimal => counts.optimal += 1,
                    PanelStatus::Warning => counts.warning += 1,
                    PanelStatus::Critical => counts.critical += 1,
                }
                counts
            },
        )
    }
}
