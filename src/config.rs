use crate::error::{BalancerError, Result};
use crate::model::test::total_duration;
use crate::model::{EventConfiguration, Minutes, Station, Test};

/// Iteration budget shared by both balancing phases.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Spread at or below which stations count as balanced.
pub const BALANCE_TOLERANCE_MINUTES: Minutes = 5;

/// Parameters for a balancer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceConfig {
    /// Maximum tolerable total duration for any single station. `None`
    /// skips the cap-compliance phase entirely.
    pub max_time: Option<Minutes>,
    /// Upper bound on relocations across both phases.
    pub max_iterations: usize,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            max_time: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl BalanceConfig {
    pub fn new(max_time: Option<Minutes>, max_iterations: usize) -> Self {
        Self {
            max_time,
            max_iterations,
        }
    }

    /// Configuration for balancing `event`. The cap comes from
    /// `max_time` if given, then the event's stored cap, then
    /// [`suggested_max_time`]. `no_cap` disables it outright.
    pub fn for_event(
        event: &EventConfiguration,
        max_time: Option<Minutes>,
        no_cap: bool,
        max_iterations: usize,
    ) -> Self {
        let max_time = if no_cap {
            None
        } else {
            max_time
                .or_else(|| event.configured_max_time())
                .or_else(|| {
                    let suggested = suggested_max_time(&event.stations, &event.tests);
                    (suggested > 0).then_some(suggested)
                })
        };
        Self::new(max_time, max_iterations)
    }

    pub fn with_max_time(mut self, max_time: Minutes) -> Self {
        self.max_time = Some(max_time);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Reject a zero cap or a zero iteration budget. The balancer itself
    /// assumes both are positive.
    pub fn validate(&self) -> Result<()> {
        if let Some(0) = self.max_time {
            return Err(BalancerError::InvalidMaxTime(0));
        }
        if self.max_iterations == 0 {
            return Err(BalancerError::InvalidIterations);
        }
        Ok(())
    }
}

/// Default cap offered for a dataset: 120% of the average station load,
/// rounded up. Zero when there are no stations.
pub fn suggested_max_time(stations: &[Station], tests: &[Test]) -> Minutes {
    if stations.is_empty() {
        return 0;
    }
    // ceil(total / n * 6 / 5) in integers
    let total = total_duration(tests);
    (total * 6).div_ceil(5 * stations.len() as Minutes)
}
