use serde::Serialize;

use crate::balancer::durations::Assignments;
use crate::balancer::station_map::StationMap;
use crate::model::Minutes;

/// One proposed single-test relocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub source_station_id: String,
    pub destination_station_id: String,
    pub test_id: String,
    pub test_name: String,
    pub source_before: Minutes,
    pub source_after: Minutes,
    pub dest_before: Minutes,
    pub dest_after: Minutes,
}

impl Suggestion {
    /// Move the test in `assignments`: drop it from the source and append it
    /// to the destination.
    pub fn apply_to(&self, assignments: &mut Assignments) {
        if let Some(source) = assignments.get_mut(&self.source_station_id) {
            source.retain(|id| *id != self.test_id);
        }
        if let Some(dest) = assignments.get_mut(&self.destination_station_id) {
            dest.push(self.test_id.clone());
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StationTimes {
    pub before: Minutes,
    pub after: Minutes,
}

/// Outcome of one balancer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    /// Sum of every test in the catalog.
    pub original_total_time: Minutes,
    pub original_max_time: Minutes,
    pub original_min_time: Minutes,
    pub adjusted_max_time: Minutes,
    pub adjusted_min_time: Minutes,
    pub station_times: StationMap<StationTimes>,
    pub suggestions: Vec<Suggestion>,
    pub suggested_assignments: Assignments,
}

impl BalanceResult {
    pub fn original_spread(&self) -> Minutes {
        self.original_max_time.saturating_sub(self.original_min_time)
    }

    pub fn adjusted_spread(&self) -> Minutes {
        self.adjusted_max_time.saturating_sub(self.adjusted_min_time)
    }

    pub fn is_unchanged(&self) -> bool {
        self.suggestions.is_empty()
    }

    /// True if any station still ends above `max_time`.
    pub fn exceeds_max_time(&self, max_time: Minutes) -> bool {
        self.station_times.values().any(|t| t.after > max_time)
    }

    /// Final destination of every test that moved at least once.
    pub fn moved_tests(&self) -> StationMap<String> {
        let mut moved = StationMap::new();
        for s in &self.suggestions {
            moved.insert(s.test_id.clone(), s.destination_station_id.clone());
        }
        moved
    }

    /// Apply the suggestions one at a time to `original`.
    pub fn replay(&self, original: &Assignments) -> Assignments {
        let mut assignments = original.clone();
        for s in &self.suggestions {
            s.apply_to(&mut assignments);
        }
        assignments
    }
}
