//! Value records exchanged between the access layer and its callers.
//!
//! Records are created fresh on every fixture request and are never mutated
//! in place; updates happen by full replacement.

pub mod consumption;
pub mod environment;
pub mod forecast;
pub mod microgrid;
pub mod panel;

pub use consumption::ConsumptionSample;
pub use environment::EnvironmentalImpact;
pub use forecast::{ForecastSample, Weather, Weekday};
pub use microgrid::{
    BalanceStatus, MicrogridArea, MicrogridNode, MicrogridState, NodeKind, NodeStatus,
};
pub use panel::{Panel, PanelStatus, PanelStatusCounts};
