pub mod driver;
pub mod durations;
pub mod moves;
pub mod result;
pub mod station_map;

pub use driver::{balance, Balancer};
pub use durations::{Assignments, DurationMap, Extremes};
pub use result::{BalanceResult, StationTimes, Suggestion};
pub use station_map::StationMap;
