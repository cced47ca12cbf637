pub mod balancer;
pub mod config;
pub mod error;
pub mod model;

pub use balancer::{balance, BalanceResult, Balancer, Suggestion};
pub use config::BalanceConfig;
pub use error::{BalancerError, Result};
pub use model::{EventConfiguration, Minutes, Station, Test, TestStatus};
