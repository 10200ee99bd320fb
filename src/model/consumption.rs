use serde::{Deserialize, Serialize};

/// Number of hourly samples in one day of consumption data.
pub const SAMPLES_PER_DAY: usize = 24;

/// One hour of household energy flow.
///
/// # Sign Convention
/// `battery` is positive while charging and negative while discharging.
/// `grid` is positive while exporting and negative while importing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionSample {
    /// Hour label, `HH:MM`.
    pub timestamp: String,
    /// Energy produced by the array (kWh).
    pub production: f32,
    /// Energy consumed by the household (kWh).
    pub consumption: f32,
    /// Battery flow (kWh, signed).
    pub battery: f32,
    /// Grid flow (kWh, signed).
    pub grid: f32,
}

impl ConsumptionSample {
    /// Creates a sample for the given hour (`0..24`), labelled `HH:00`.
    pub fn at_hour(
        hour: usize,
        production: f32,
        consumption: f32,
        battery: f32,
        grid: f32,
    ) -> Self {
        Self {
            timestamp: format!("{hour:02}:00"),
            production,
            consumption,
            battery,
            grid,
        }
    }

    /// Production minus consumption (kWh). Positive means surplus.
    pub fn net(&self) -> f32 {
        self.production - self.consumption
    }
}

/// Sums production over a series of samples (kWh).
pub fn total_production(samples: &[ConsumptionSample]) -> f32 {
    samples.iter().map(|s| s.production).sum()
}

/// Sums consumption over a series of samples (kWh).
pub fn total_consumption(samples: &[ConsumptionSample]) -> f32 {
    samples.iter().map(|s| s.consumption).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_hour_pads_timestamp() {
        let s = ConsumptionSample::at_hour(7, 2.5, 1.0, 0.8, 0.7);
        assert_eq!(s.timestamp, "07:00");
        let s = ConsumptionSample::at_hour(23, 0.1, 0.3, -0.1, -0.1);
        assert_eq!(s.timestamp, "23:00");
    }

    #[test]
    fn net_is_production_minus_consumption() {
        let s = ConsumptionSample::at_hour(12, 6.0, 2.2, 2.3, 1.5);
        assert!((s.net() - 3.8).abs() < 1e-6);
    }

    #[test]
    fn totals_over_series() {
        let series = vec![
            ConsumptionSample::at_hour(0, 1.0, 0.5, 0.0, 0.0),
            ConsumptionSample::at_hour(1, 2.0, 1.5, 0.0, 0.0),
        ];
        assert!((total_production(&series) - 3.0).abs() < 1e-6);
        assert!((total_consumption(&series) - 2.0).abs() < 1e-6);
        assert_eq!(total_production(&[]), 0.0);
    }

    #[test]
    fn serializes_with_plain_field_names() {
        let s = ConsumptionSample::at_hour(5, 0.5, 0.6, -0.1, 0.0);
        let json = serde_json::to_value(&s).expect("sample should serialize");
        assert_eq!(json["timestamp"], "05:00");
        assert!(json.get("grid").is_some());
    }
}
