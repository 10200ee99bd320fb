//! Artificial latency and failure injection.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::AccessError;

/// Source of uniform draws in `[0, 1)`.
///
/// Injected so tests can pin both the delay and the failure outcome.
pub trait Entropy: Send {
    fn next_unit(&mut self) -> f64;
}

/// Pseudo-random draws from a `StdRng`.
#[derive(Debug)]
pub struct SeededEntropy {
    rng: StdRng,
}

impl SeededEntropy {
    /// Reproducible sequence for a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from operating-system randomness.
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl Entropy for SeededEntropy {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of draws, then repeats the last one.
///
/// An empty script always yields `0.0`.
#[derive(Debug, Clone)]
pub struct ScriptedEntropy {
    draws: VecDeque<f64>,
    last: f64,
}

impl ScriptedEntropy {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            last: 0.0,
        }
    }
}

impl Entropy for ScriptedEntropy {
    fn next_unit(&mut self) -> f64 {
        if let Some(next) = self.draws.pop_front() {
            self.last = next.clamp(0.0, 1.0 - f64::EPSILON);
        }
        self.last
    }
}

/// Delay window and failure probability of the simulated network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyProfile {
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Probability in `[0, 1]` that a call fails after its delay.
    pub error_rate: f64,
}

impl Default for LatencyProfile {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(300),
            max_delay: Duration::from_millis(1500),
            error_rate: 0.1,
        }
    }
}

impl LatencyProfile {
    /// No delay, no failures.
    pub fn instant() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            error_rate: 0.0,
        }
    }

    /// Maps a unit draw linearly onto `[min_delay, max_delay]`.
    pub fn delay_for(&self, unit: f64) -> Duration {
        let span = self.max_delay.saturating_sub(self.min_delay);
        self.min_delay + span.mul_f64(unit.clamp(0.0, 1.0))
    }

    /// A call fails when its draw falls below the error rate.
    pub fn fails_on(&self, unit: f64) -> bool {
        unit < self.error_rate
    }
}

/// Stand-in for the network between the dashboard and its backend.
pub struct NetworkSimulator {
    profile: LatencyProfile,
    entropy: Mutex<Box<dyn Entropy>>,
}

impl std::fmt::Debug for NetworkSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkSimulator")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl NetworkSimulator {
    pub fn new(profile: LatencyProfile, entropy: impl Entropy + 'static) -> Self {
        Self {
            profile,
            entropy: Mutex::new(Box::new(entropy)),
        }
    }

    pub fn profile(&self) -> &LatencyProfile {
        &self.profile
    }

    fn draw(&self) -> f64 {
        self.entropy.lock().next_unit()
    }

    /// Suspends for a random delay, then fails with probability `error_rate`.
    ///
    /// The failure draw happens after the delay, so a failing call still
    /// takes at least `min_delay`.
    pub async fn round_trip(&self) -> Result<(), AccessError> {
        let delay = self.profile.delay_for(self.draw());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.profile.fails_on(self.draw()) {
            return Err(AccessError::transient());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_maps_unit_onto_window() {
        let p = LatencyProfile::default();
        assert_eq!(p.delay_for(0.0), Duration::from_millis(300));
        assert_eq!(p.delay_for(0.5), Duration::from_millis(900));
        assert!(p.delay_for(0.999_999) <= Duration::from_millis(1500));
    }

    #[test]
    fn failure_threshold_is_strict() {
        let p = LatencyProfile::default();
        assert!(p.fails_on(0.0));
        assert!(p.fails_on(0.099));
        assert!(!p.fails_on(0.1));
        assert!(!LatencyProfile::instant().fails_on(0.0));
    }

    #[test]
    fn scripted_entropy_repeats_last_draw() {
        let mut e = ScriptedEntropy::new([0.25, 0.75]);
        assert_eq!(e.next_unit(), 0.25);
        assert_eq!(e.next_unit(), 0.75);
        assert_eq!(e.next_unit(), 0.75);
        assert_eq!(ScriptedEntropy::new([]).next_unit(), 0.0);
    }

    #[test]
    fn seeded_entropy_is_reproducible_and_in_range() {
        let mut a = SeededEntropy::from_seed(7);
        let mut b = SeededEntropy::from_seed(7);
        for _ in 0..100 {
            let x = a.next_unit();
            assert_eq!(x, b.next_unit());
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn round_trip_waits_then_fails_below_threshold() {
        let net =
            NetworkSimulator::new(LatencyProfile::default(), ScriptedEntropy::new([0.0, 0.05]));
        let start = tokio::time::Instant::now();
        let result = net.round_trip().await;
        assert_eq!(result, Err(AccessError::transient()));
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn round_trip_succeeds_above_threshold() {
        let net =
            NetworkSimulator::new(LatencyProfile::default(), ScriptedEntropy::new([1.0, 0.5]));
        let start = tokio::time::Instant::now();
        assert!(net.round_trip().await.is_ok());
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1499));
        assert!(elapsed <= Duration::from_millis(1501));
    }
}
