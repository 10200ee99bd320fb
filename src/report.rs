//! Plain-text system report built from fetched records.

use std::fmt;

use serde::Serialize;

use crate::model::consumption::{total_consumption, total_production};
use crate::model::{
    ConsumptionSample, EnvironmentalImpact, MicrogridState, Panel, PanelStatusCounts,
};

const SCHEDULE_MAINTENANCE: &str =
    "Schedule maintenance for panels with warnings or critical issues.";
const REGULAR_MAINTENANCE: &str = "Continue regular maintenance schedule.";
const REDUCE_PEAK: &str = "Consider reducing energy consumption during peak hours.";
const STORE_SURPLUS: &str = "Consider storing excess energy for future use.";
const MONITOR_WEATHER: &str = "Monitor weather conditions for optimal energy production planning.";

/// Microgrid figures quoted in the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MicrogridSummary {
    pub current_load_kw: f32,
    /// Percent, 0-100.
    pub efficiency_pct: f32,
}

/// Snapshot of the day's energy balance, panel health, environmental
/// impact and microgrid load, with recommendations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemReport {
    /// Total production today (kWh).
    pub total_production_kwh: f32,
    /// Total consumption today (kWh).
    pub total_consumption_kwh: f32,
    /// Production minus consumption (kWh).
    pub net_energy_kwh: f32,
    pub panels: PanelStatusCounts,
    /// Ids of panels that are not optimal, in source order.
    pub attention_needed: Vec<String>,
    pub impact: EnvironmentalImpact,
    pub microgrid: MicrogridSummary,
    /// Always three entries: maintenance, energy balance, weather.
    pub recommendations: Vec<String>,
}

impl SystemReport {
    pub fn build(
        consumption: &[ConsumptionSample],
        panels: &[Panel],
        impact: &EnvironmentalImpact,
        microgrid: &MicrogridState,
    ) -> Self {
        let total_production_kwh = total_production(consumption);
        let total_consumption_kwh = total_consumption(consumption);
        let net_energy_kwh = total_production_kwh - total_consumption_kwh;
        let counts = PanelStatusCounts::from_panels(panels);
        let maintenance = if counts.warning > 0 || counts.critical > 0 {
            SCHEDULE_MAINTENANCE
        } else {
            REGULAR_MAINTENANCE
        };
        let balance = if net_energy_kwh < 0.0 {
            REDUCE_PEAK
        } else {
            STORE_SURPLUS
        };
        Self {
            total_production_kwh,
            total_consumption_kwh,
            net_energy_kwh,
            panels: counts,
            attention_needed: panels
                .iter()
                .filter(|p| p.needs_attention())
                .map(|p| p.id.clone())
                .collect(),
            impact: impact.clone(),
            microgrid: MicrogridSummary {
                current_load_kw: microgrid.current_load,
                efficiency_pct: microgrid.efficiency,
            },
            recommendations: [maintenance, balance, MONITOR_WEATHER]
                .map(String::from)
                .to_vec(),
        }
    }

    pub fn is_surplus(&self) -> bool {
        self.net_energy_kwh >= 0.0
    }
}

impl fmt::Display for SystemReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- System Report ---")?;
        writeln!(
            f,
            "Total production today:  {:.1} kWh",
            self.total_production_kwh
        )?;
        writeln!(
            f,
            "Total consumption today: {:.1} kWh",
            self.total_consumption_kwh
        )?;
        writeln!(
            f,
            "Net energy:              {:.1} kWh ({})",
            self.net_energy_kwh.abs(),
            if self.is_surplus() { "Surplus" } else { "Deficit" }
        )?;
        writeln!(f)?;
        writeln!(f, "Total panels:            {}", self.panels.total)?;
        writeln!(f, "Optimal:                 {}", self.panels.optimal)?;
        writeln!(f, "Warning:                 {}", self.panels.warning)?;
        writeln!(f, "Critical:                {}", self.panels.critical)?;
        if !self.attention_needed.is_empty() {
            writeln!(
                f,
                "Needs attention:         {}",
                self.attention_needed.join(", ")
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "CO2 emissions avoided:   {:.0} kg",
            self.impact.co2_saved
        )?;
        writeln!(
            f,
            "Tree equivalent:         {}",
            self.impact.trees_equivalent
        )?;
        writeln!(f, "Homes powered:           {}", self.impact.homes_powered)?;
        // shown in thousands of liters
        writeln!(
            f,
            "Water saved:             {:.0}k L",
            self.impact.water_saved / 1000.0
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "Current load:            {} kW",
            self.microgrid.current_load_kw
        )?;
        writeln!(
            f,
            "Grid efficiency:         {}%",
            self.microgrid.efficiency_pct
        )?;
        writeln!(f)?;
        writeln!(f, "Recommendations:")?;
        for (i, rec) in self.recommendations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}. {rec}", i + 1)?;
        }
        Ok(())
    }
}
