use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named bucket of tests; the unit being load-balanced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<String>,
    /// Terminal unlock PIN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[serde(default)]
    pub member_count: usize,
    #[serde(default)]
    pub test_count: usize,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub members: Vec<Value>,
    /// Ordered ids of the tests currently assigned here.
    #[serde(default)]
    pub tests: Vec<String>,
    /// Fields this crate does not model (UI status, unread counts, ...),
    /// carried through unchanged on write-back.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Station {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            terminal_id: None,
            pin: None,
            member_count: 0,
            test_count: 0,
            created_at: now,
            updated_at: now,
            members: Vec::new(),
            tests: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_tests<I, S>(mut self, tests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tests = tests.into_iter().map(Into::into).collect();
        self.test_count = self.tests.len();
        self
    }

    /// Replace the assigned tests. Returns true if the list changed.
    pub fn set_tests(&mut self, tests: Vec<String>, now: DateTime<Utc>) -> bool {
        if self.tests == tests {
            return false;
        }
        self.tests = tests;
        self.test_count = self.tests.len();
        self.updated_at = now;
        true
    }
}
