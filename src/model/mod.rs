pub mod event;
pub mod station;

pub use event::EventConfiguration;
pub use station::Station;
pub use test::{Test, TestStatus};

/// Durations are whole minutes throughout.
pub type Minutes = u64;
