use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::balancer::Assignments;
use crate::error::{BalancerError, Result};
use crate::model::{Minutes, Station, Test};

/// An exported research event: stations, their tests, and the people and
/// chat history that travel with them.
///
/// Members and chat messages are kept as raw JSON; nothing here reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfiguration {
    pub event_name: String,
    /// Per-station cap in minutes. Zero means no cap was set.
    #[serde(default)]
    pub max_time: Minutes,
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default)]
    pub members: Vec<serde_json::Value>,
    #[serde(default)]
    pub tests: Vec<Test>,
    #[serde(default)]
    pub chat: Vec<serde_json::Value>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Top-level fields this crate does not model, kept for write-back.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EventConfiguration {
    pub fn new(event_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            event_name: event_name.into(),
            max_time: 0,
            stations: Vec::new(),
            members: Vec::new(),
            tests: Vec::new(),
            chat: Vec::new(),
            created_at: now,
            updated_at: now,
            extra: serde_json::Map::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let event = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            stations = event.stations.len(),
            tests = event.tests.len(),
            "Loaded event configuration"
        );
        Ok(event)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        tracing::debug!(path = %path.display(), "Saved event configuration");
        Ok(())
    }

    /// The stored cap, if one was set.
    pub fn configured_max_time(&self) -> Option<Minutes> {
        (self.max_time > 0).then_some(self.max_time)
    }

    /// Check the invariants the balancer relies on: unique station ids,
    /// unique test ids with positive durations, and no test on two stations.
    pub fn validate(&self) -> Result<()> {
        let mut station_ids = HashSet::new();
        for station in &self.stations {
            if !station_ids.insert(station.id.as_str()) {
                return Err(BalancerError::DuplicateStation(station.id.clone()));
            }
        }

        let mut test_ids = HashSet::new();
        for test in &self.tests {
            if !test_ids.insert(test.id.as_str()) {
                return Err(BalancerError::DuplicateTest(test.id.clone()));
            }
            if test.estimated_duration == 0 {
                return Err(BalancerError::ZeroDuration(test.id.clone()));
            }
        }

        let mut owner: HashMap<&str, &str> = HashMap::new();
        for station in &self.stations {
            for test_id in &station.tests {
                if let Some(first) = owner.insert(test_id.as_str(), station.id.as_str()) {
                    return Err(BalancerError::TestAssignedTwice {
                        test_id: test_id.clone(),
                        first: first.to_string(),
                        second: station.id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Write a balancer assignment back onto the stations. Stations absent
    /// from `assignments` are left alone. Returns how many stations changed.
    pub fn apply_assignments(&mut self, assignments: &Assignments) -> usize {
        let now = Utc::now();
        let mut changed = 0;

        for station in &mut self.stations {
            if let Some(tests) = assignments.get(&station.id) {
                if station.set_tests(tests.clone(), now) {
                    changed += 1;
                }
            }
        }

        if changed > 0 {
            self.updated_at = now;
        }
        tracing::info!(event = %self.event_name, changed, "Applied station assignments");
        changed
    }
}
