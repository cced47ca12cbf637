//! Single-move searches used by the two balancing phases.
//!
//! Both searches are greedy: they walk candidates in a fixed sorted order and
//! return the first one that qualifies. Neither explores every combination,
//! so the result converges toward feasibility and balance without any claim
//! of optimality.

use crate::balancer::durations::{Assignments, DurationMap};
use crate::balancer::result::Suggestion;
use crate::model::test::find_test;
use crate::model::{Minutes, Test};

/// Resolved tests of a station, shortest first. Equal durations keep their
/// assignment order.
fn tests_by_duration<'a>(
    assignments: &Assignments,
    station_id: &str,
    tests: &'a [Test],
) -> Vec<&'a Test> {
    let mut resolved: Vec<&Test> = assignments
        .get(station_id)
        .map(|ids| ids.iter().filter_map(|id| find_test(tests, id)).collect())
        .unwrap_or_default();
    resolved.sort_by_key(|t| t.estimated_duration);
    resolved
}

/// Find one test on an over-cap station whose relocation brings the station
/// to `max_time` or below without pushing the destination above it.
///
/// Tests are tried shortest first; for each, destinations are tried least
/// loaded first. A test whose removal still leaves the source over the cap
/// is skipped outright.
pub fn find_cap_relief_move(
    source_station_id: &str,
    max_time: Minutes,
    durations: &DurationMap,
    assignments: &Assignments,
    tests: &[Test],
) -> Option<Suggestion> {
    let source_duration = *durations.get(source_station_id)?;
    let candidates = tests_by_duration(assignments, source_station_id, tests);
    if candidates.is_empty() {
        return None;
    }

    let mut destinations: Vec<(&str, Minutes)> = durations
        .iter()
        .filter(|(id, _)| *id != source_station_id)
        .map(|(id, d)| (id, *d))
        .collect();
    destinations.sort_by_key(|(_, d)| *d);

    for test in candidates {
        let source_after = source_duration.saturating_sub(test.estimated_duration);
        if source_after > max_time {
            continue;
        }

        let fit = destinations
            .iter()
            .find(|(_, dest_before)| dest_before + test.estimated_duration <= max_time);

        if let Some(&(dest_id, dest_before)) = fit {
            return Some(Suggestion {
                source_station_id: source_station_id.to_string(),
                destination_station_id: dest_id.to_string(),
                test_id: test.id.clone(),
                test_name: test.name.clone(),
                source_before: source_duration,
                source_after,
                dest_before,
                dest_after: dest_before + test.estimated_duration,
            });
        }
    }

    None
}

/// Find one test to move from the busiest station to the least-busy one.
///
/// Tests are tried shortest first. A move qualifies when the busiest
/// station is still at least as loaded as the receiver afterwards, so the
/// receiver never overtakes it.
pub fn find_balance_move(
    max_station_id: &str,
    max_duration: Minutes,
    min_station_id: &str,
    min_duration: Minutes,
    assignments: &Assignments,
    tests: &[Test],
) -> Option<Suggestion> {
    tests_by_duration(assignments, max_station_id, tests)
        .into_iter()
        .find(|t| {
            max_duration.saturating_sub(t.estimated_duration) >= min_duration + t.estimated_duration
        })
        .map(|test| Suggestion {
            source_station_id: max_station_id.to_string(),
            destination_station_id: min_station_id.to_string(),
            test_id: test.id.clone(),
            test_name: test.name.clone(),
            source_before: max_duration,
            source_after: max_duration.saturating_sub(test.estimated_duration),
            dest_before: min_duration,
            dest_after: min_duration + test.estimated_duration,
        })
}
