use crate::balancer::durations::{
    assignment_durations, assignments_of, find_extremes, station_durations, stations_over,
    Assignments, DurationMap,
};
use crate::balancer::moves::{find_balance_move, find_cap_relief_move};
use crate::balancer::result::{BalanceResult, StationTimes, Suggestion};
use crate::balancer::station_map::StationMap;
use crate::config::{BalanceConfig, BALANCE_TOLERANCE_MINUTES};
use crate::model::test::total_duration;
use crate::model::{Minutes, Station, Test};

/// Runs the two-phase balancer with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Balancer {
    config: BalanceConfig,
}

impl Balancer {
    pub fn new(config: BalanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    pub fn run(&self, stations: &[Station], tests: &[Test]) -> BalanceResult {
        balance(
            stations,
            tests,
            self.config.max_time,
            self.config.max_iterations,
        )
    }
}

/// Working state threaded through both phases.
struct Plan<'a> {
    tests: &'a [Test],
    assignments: Assignments,
    durations: DurationMap,
    suggestions: Vec<Suggestion>,
}

impl Plan<'_> {
    fn apply(&mut self, suggestion: Suggestion) {
        tracing::debug!(
            test_id = %suggestion.test_id,
            from = %suggestion.source_station_id,
            to = %suggestion.destination_station_id,
            source_after = suggestion.source_after,
            dest_after = suggestion.dest_after,
            "Relocating test"
        );

        suggestion.apply_to(&mut self.assignments);
        self.durations
            .insert(suggestion.source_station_id.clone(), suggestion.source_after);
        self.durations
            .insert(suggestion.destination_station_id.clone(), suggestion.dest_after);
        self.suggestions.push(suggestion);
    }

    /// Phase 1: move tests off over-cap stations until none remain, no
    /// station can be relieved, or the budget runs out. Returns the number
    /// of iterations spent.
    fn relieve_over_cap(&mut self, max_time: Minutes, max_iterations: usize) -> usize {
        let mut iteration = 0;

        while iteration < max_iterations {
            let over = stations_over(&self.durations, max_time);
            if over.is_empty() {
                tracing::debug!(iteration, max_time, "All stations within max time");
                break;
            }

            let relief = over.iter().find_map(|station_id| {
                find_cap_relief_move(
                    station_id,
                    max_time,
                    &self.durations,
                    &self.assignments,
                    self.tests,
                )
            });

            let Some(suggestion) = relief else {
                tracing::debug!(
                    iteration,
                    max_time,
                    over = ?over,
                    "No relocation brings an over-cap station within max time"
                );
                break;
            };

            self.apply(suggestion);
            iteration += 1;
        }

        iteration
    }

    /// Phase 2: shift tests from the busiest to the least-busy station while
    /// the spread exceeds the tolerance and the budget allows.
    fn even_out(&mut self, max_time: Option<Minutes>, mut iteration: usize, max_iterations: usize) {
        while iteration < max_iterations {
            let extremes = find_extremes(&self.durations);
            if extremes.spread() <= BALANCE_TOLERANCE_MINUTES
                || extremes.max_station_id == extremes.min_station_id
            {
                tracing::debug!(iteration, spread = extremes.spread(), "Stations balanced");
                break;
            }

            let Some(suggestion) = find_balance_move(
                &extremes.max_station_id,
                extremes.max_duration,
                &extremes.min_station_id,
                extremes.min_duration,
                &self.assignments,
                self.tests,
            ) else {
                tracing::debug!(iteration, spread = extremes.spread(), "No balancing move found");
                break;
            };

            if max_time.is_some_and(|cap| suggestion.dest_after > cap) {
                tracing::debug!(
                    iteration,
                    test_id = %suggestion.test_id,
                    dest_after = suggestion.dest_after,
                    "Balancing move would exceed max time"
                );
                break;
            }

            self.apply(suggestion);
            iteration += 1;
        }
    }
}

/// Compute single-test relocations that bring every station within
/// `max_time` where feasible and then narrow the spread between the busiest
/// and least-busy station.
///
/// Both phases share `max_iterations`. The inputs are never modified; the
/// returned result carries its own copy of the final assignment. Fewer than
/// two stations or an empty catalog short-circuit to a result with no moves.
pub fn balance(
    stations: &[Station],
    tests: &[Test],
    max_time: Option<Minutes>,
    max_iterations: usize,
) -> BalanceResult {
    let original_durations = station_durations(stations, tests);
    let original = find_extremes(&original_durations);
    let original_total_time = total_duration(tests);

    if stations.len() < 2 || tests.is_empty() {
        tracing::debug!(
            stations = stations.len(),
            tests = tests.len(),
            "Nothing to balance"
        );
        return BalanceResult {
            original_total_time,
            original_max_time: original.max_duration,
            original_min_time: original.min_duration,
            adjusted_max_time: original.max_duration,
            adjusted_min_time: original.min_duration,
            station_times: station_times(&original_durations, &original_durations),
            suggestions: Vec::new(),
            suggested_assignments: assignments_of(stations),
        };
    }

    let mut plan = Plan {
        tests,
        assignments: assignments_of(stations),
        durations: original_durations.clone(),
        suggestions: Vec::new(),
    };

    let spent = match max_time {
        Some(cap) => plan.relieve_over_cap(cap, max_iterations),
        None => 0,
    };
    plan.even_out(max_time, spent, max_iterations);

    let final_durations = assignment_durations(&plan.assignments, tests);
    let adjusted = find_extremes(&final_durations);

    tracing::info!(
        moves = plan.suggestions.len(),
        original_max = original.max_duration,
        adjusted_max = adjusted.max_duration,
        original_spread = original.spread(),
        adjusted_spread = adjusted.spread(),
        "Balancing complete"
    );

    BalanceResult {
        original_total_time,
        original_max_time: original.max_duration,
        original_min_time: original.min_duration,
        adjusted_max_time: adjusted.max_duration,
        adjusted_min_time: adjusted.min_duration,
        station_times: station_times(&original_durations, &final_durations),
        suggestions: plan.suggestions,
        suggested_assignments: plan.assignments,
    }
}

fn station_times(before: &DurationMap, after: &DurationMap) -> StationMap<StationTimes> {
    before
        .iter()
        .map(|(id, &before)| {
            let after = after.get(id).copied().unwrap_or_default();
            (id, StationTimes { before, after })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balancer_uses_configured_cap_and_budget() {
        let stations = vec![
            Station::new("a", "A").with_tests(["t1", "t2", "t3"]),
            Station::new("b", "B"),
        ];
        let tests = vec![
            Test::new("t1", "one", 20),
            Test::new("t2", "two", 20),
            Test::new("t3", "three", 20),
        ];

        let one_step = Balancer::new(BalanceConfig::default().with_max_iterations(1));
        assert_eq!(one_step.run(&stations, &tests).suggestions.len(), 1);

        let direct = balance(&stations, &tests, None, 1);
        assert_eq!(one_step.run(&stations, &tests), direct);
    }

    #[test]
    fn shared_budget_is_consumed_by_cap_phase() {
        let stations = vec![
            Station::new("a", "A").with_tests(["t1", "t2", "t3", "t4"]),
            Station::new("b", "B").with_tests(["t5", "t6", "t7", "t8"]),
            Station::new("c", "C"),
        ];
        let tests: Vec<Test> = (1..=8)
            .map(|i| Test::new(format!("t{i}"), format!("test {i}"), 10))
            .collect();

        // One relocation relieves a; b is left over the cap.
        let result = balance(&stations, &tests, Some(30), 1);
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.suggestions[0].source_station_id, "a");
        assert_eq!(result.suggestions[0].destination_station_id, "c");
        assert_eq!(result.station_times.get("b").unwrap().after, 40);
        assert!(result.exceeds_max_time(30));

        let result = balance(&stations, &tests, Some(30), 10);
        assert_eq!(result.suggestions.len(), 2);
        assert_eq!(result.station_times.get("a").unwrap().after, 30);
        assert_eq!(result.station_times.get("b").unwrap().after, 30);
        assert_eq!(result.station_times.get("c").unwrap().after, 20);
        assert!(!result.exceeds_max_time(30));
    }

    #[test]
    fn station_times_pairs_before_and_after() {
        let before: DurationMap = [("a", 10), ("b", 0)].into_iter().collect();
        let after: DurationMap = [("a", 5), ("b", 5)].into_iter().collect();
        let times = station_times(&before, &after);
        assert_eq!(times.get("a"), Some(&StationTimes { before: 10, after: 5 }));
        assert_eq!(times.get("b"), Some(&StationTimes { before: 0, after: 5 }));
    }
}
