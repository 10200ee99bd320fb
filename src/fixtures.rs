//! Hard-coded ground truth served by the simulated backend.
//!
//! Every accessor is pure: no inputs, no side effects, identical output on
//! every call. Randomness and failure belong to the access layer above.

use crate::model::{
    BalanceStatus, ConsumptionSample, EnvironmentalImpact, ForecastSample, MicrogridArea,
    MicrogridNode, MicrogridState, NodeKind, NodeStatus, Panel, PanelStatus, Weather, Weekday,
};

/// Source of domain records for the access layer.
///
/// Swapping this out for a real backend leaves the latency, failure and
/// cache behaviour of the access layer untouched.
pub trait FixtureProvider: Send + Sync {
    /// 24 hourly samples, `00:00` through `23:00`.
    fn daily_consumption(&self) -> Vec<ConsumptionSample>;
    /// 7 daily samples, `Mon` through `Sun`.
    fn week_forecast(&self) -> Vec<ForecastSample>;
    fn panels(&self) -> Vec<Panel>;
    fn environmental_impact(&self) -> EnvironmentalImpact;
    fn microgrid_state(&self) -> MicrogridState;
}

/// The built-in demo installation: ten panels, one three-area microgrid.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticFixtures;

/// `(production, consumption, battery, grid)` per hour.
const DAILY_FLOWS: [(f32, f32, f32, f32); 24] = [
    (0.1, 0.5, -0.2, -0.2),
    (0.1, 0.4, -0.2, -0.1),
    (0.1, 0.3, -0.1, -0.1),
    (0.1, 0.3, -0.1, -0.1),
    (0.2, 0.4, -0.1, -0.1),
    (0.5, 0.6, -0.1, 0.0),
    (1.2, 0.8, 0.2, 0.2),
    (2.5, 1.0, 0.8, 0.7),
    (3.8, 1.2, 1.5, 1.1),
    (4.5, 1.5, 1.8, 1.2),
    (5.2, 1.8, 2.0, 1.4),
    (5.8, 2.0, 2.2, 1.6),
    (6.0, 2.2, 2.3, 1.5),
    (5.9, 2.1, 2.2, 1.6),
    (5.5, 2.0, 2.0, 1.5),
    (4.8, 1.8, 1.7, 1.3),
    (3.5, 1.5, 1.2, 0.8),
    (2.0, 1.2, 0.5, 0.3),
    (0.8, 1.0, -0.1, -0.1),
    (0.3, 0.7, -0.2, -0.2),
    (0.1, 0.5, -0.2, -0.2),
    (0.1, 0.4, -0.2, -0.1),
    (0.1, 0.3, -0.1, -0.1),
    (0.1, 0.3, -0.1, -0.1),
];

const WEEK: [(f32, f32, Weather); 7] = [
    (4.2, 3.8, Weather::Sunny),
    (4.5, 4.2, Weather::PartlyCloudy),
    (5.2, 5.0, Weather::Sunny),
    (3.2, 2.8, Weather::Cloudy),
    (4.8, 4.5, Weather::PartlyCloudy),
    (5.7, 5.5, Weather::Sunny),
    (3.5, 3.0, Weather::Rainy),
];

#[expect(clippy::too_many_arguments)]
fn panel(
    n: u32,
    location: &str,
    angle: f32,
    status: PanelStatus,
    production: f32,
    efficiency: f32,
    temperature: f32,
    next_maintenance: &str,
    alerts: &[&str],
) -> Panel {
    Panel {
        id: format!("panel-{n}"),
        location: location.to_string(),
        angle,
        status,
        production,
        efficiency,
        temperature,
        next_maintenance: next_maintenance.to_string(),
        alerts: alerts.iter().map(|a| (*a).to_string()).collect(),
    }
}

fn area(
    id: &str,
    name: &str,
    consumption: f32,
    production: f32,
    battery: f32,
    status: BalanceStatus,
) -> MicrogridArea {
    MicrogridArea {
        id: id.to_string(),
        name: name.to_string(),
        consumption,
        production,
        battery,
        status,
    }
}

fn node(id: &str, kind: NodeKind, flow: f32) -> MicrogridNode {
    MicrogridNode {
        id: id.to_string(),
        kind,
        status: NodeStatus::Online,
        flow,
    }
}

impl FixtureProvider for StaticFixtures {
    fn daily_consumption(&self) -> Vec<ConsumptionSample> {
        DAILY_FLOWS
            .iter()
            .enumerate()
            .map(|(hour, &(production, consumption, battery, grid))| {
                ConsumptionSample::at_hour(hour, production, consumption, battery, grid)
            })
            .collect()
    }

    fn week_forecast(&self) -> Vec<ForecastSample> {
        Weekday::ALL
            .iter()
            .zip(WEEK)
            .map(|(&day, (predicted, actual, weather))| ForecastSample {
                day,
                predicted,
                actual,
                weather,
            })
            .collect()
    }

    fn panels(&self) -> Vec<Panel> {
        use PanelStatus::{Critical, Optimal, Warning};
        vec![
            panel(1, "Roof", 30.0, Optimal, 1.2, 95.0, 42.0, "2025-08-15", &[]),
            panel(2, "Roof", 30.0, Optimal, 1.1, 92.0, 44.0, "2025-09-03", &[]),
            panel(
                3,
                "Roof",
                30.0,
                Warning,
                0.9,
                76.0,
                48.0,
                "2025-07-28",
                &["Dust accumulation", "Performance degradation"],
            ),
            panel(
                4,
                "Ground",
                45.0,
                Optimal,
                1.3,
                94.0,
                40.0,
                "2025-10-05",
                &[],
            ),
            panel(
                5,
                "Ground",
                45.0,
                Critical,
                0.1,
                12.0,
                65.0,
                "2025-07-15",
                &[
                    "Electrical fault",
                    "Immediate service needed",
                    "High temperature",
                ],
            ),
            panel(6, "Roof", 30.0, Optimal, 1.2, 93.0, 43.0, "2025-11-22", &[]),
            panel(7, "Roof", 30.0, Optimal, 1.1, 91.0, 45.0, "2025-09-25", &[]),
            panel(
                8,
                "Roof",
                30.0,
                Warning,
                0.9,
                78.0,
                47.0,
                "2025-08-12",
                &["Performance degradation"],
            ),
            panel(
                9,
                "Ground",
                45.0,
                Optimal,
                1.3,
                96.0,
                41.0,
                "2025-10-18",
                &[],
            ),
            panel(
                10,
                "Ground",
                45.0,
                Critical,
                0.1,
                15.0,
                63.0,
                "2025-07-10",
                &["Connection issue", "Hardware fault"],
            ),
        ]
    }

    fn environmental_impact(&self) -> EnvironmentalImpact {
        EnvironmentalImpact {
            co2_saved: 15_000.0,
            trees_equivalent: 500,
            homes_powered: 60,
            water_saved: 800_000.0,
        }
    }

    fn microgrid_state(&self) -> MicrogridState {
        MicrogridState {
            id: "microgrid-1".to_string(),
            current_load: 150.0,
            optimal_load: 120.0,
            efficiency: 85.0,
            battery_level: 75.0,
            battery_capacity: 100.0,
            connected_devices: 45,
            priority_devices: 15,
            status: BalanceStatus::Balanced,
            nodes: vec![
                node("solar-1", NodeKind::Solar, 50.0),
                node("battery-1", NodeKind::Battery, 25.0),
                node("load-1", NodeKind::Load, 75.0),
            ],
            total_load: 180.0,
            total_generation: 195.0,
            battery_status: 78.0,
            grid_connection: 15.0,
            areas: vec![
                area(
                    "area-1",
                    "Residential Area",
                    65.0,
                    80.0,
                    90.0,
                    BalanceStatus::Excess,
                ),
                area(
                    "area-2",
                    "Commercial Zone",
                    85.0,
                    70.0,
                    60.0,
                    BalanceStatus::Deficit,
                ),
                area(
                    "area-3",
                    "Industrial Park",
                    30.0,
                    45.0,
                    85.0,
                    BalanceStatus::Balanced,
                ),
            ],
        }
    }
}
