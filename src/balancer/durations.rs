use crate::balancer::station_map::StationMap;
use crate::model::test::find_test;
use crate::model::{Minutes, Station, Test};

/// Station id to ordered test ids.
pub type Assignments = StationMap<Vec<String>>;

/// Station id to total assigned minutes.
pub type DurationMap = StationMap<Minutes>;

/// Sum of the resolvable test durations in `test_ids`. Ids missing from the
/// catalog contribute nothing.
pub fn sum_durations(test_ids: &[String], tests: &[Test]) -> Minutes {
    test_ids
        .iter()
        .filter_map(|id| find_test(tests, id))
        .map(|t| t.estimated_duration)
        .sum()
}

/// Copy each station's current test list, keeping input order.
pub fn assignments_of(stations: &[Station]) -> Assignments {
    stations
        .iter()
        .map(|s| (s.id.clone(), s.tests.clone()))
        .collect()
}

/// Total duration per station, in input order.
pub fn station_durations(stations: &[Station], tests: &[Test]) -> DurationMap {
    stations
        .iter()
        .map(|s| (s.id.clone(), sum_durations(&s.tests, tests)))
        .collect()
}

/// Total duration per station of a working assignment.
pub fn assignment_durations(assignments: &Assignments, tests: &[Test]) -> DurationMap {
    assignments
        .iter()
        .map(|(id, test_ids)| (id, sum_durations(test_ids, tests)))
        .collect()
}

/// Busiest and least-busy stations of a duration map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extremes {
    pub max_station_id: String,
    pub max_duration: Minutes,
    pub min_station_id: String,
    pub min_duration: Minutes,
}

impl Extremes {
    pub fn spread(&self) -> Minutes {
        self.max_duration.saturating_sub(self.min_duration)
    }
}

/// Find the busiest and least-busy stations. On ties the station seen first
/// wins. An empty map yields empty ids and zero durations.
pub fn find_extremes(durations: &DurationMap) -> Extremes {
    let mut iter = durations.iter();
    let Some((first_id, &first)) = iter.next() else {
        return Extremes::default();
    };

    let mut extremes = Extremes {
        max_station_id: first_id.to_string(),
        max_duration: first,
        min_station_id: first_id.to_string(),
        min_duration: first,
    };

    for (id, &duration) in iter {
        if duration > extremes.max_duration {
            extremes.max_duration = duration;
            extremes.max_station_id = id.to_string();
        }
        if duration < extremes.min_duration {
            extremes.min_duration = duration;
            extremes.min_station_id = id.to_string();
        }
    }

    extremes
}

/// Stations whose duration strictly exceeds `max_time`, in map order.
pub fn stations_over(durations: &DurationMap, max_time: Minutes) -> Vec<String> {
    durations
        .iter()
        .filter(|(_, d)| **d > max_time)
        .map(|(id, _)| id.to_string())
        .collect()
}
