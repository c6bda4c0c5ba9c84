//! Rule document model and service configuration.
//!
//! [`RuleDocument`] is the typed view of a rules file's front-matter;
//! [`RulesServiceConfig`] describes where rules are synced and how.

pub mod config;
pub mod document;
pub mod error;

pub use config::{
    AgentFolder, ConflictStrategy, PerformanceConfig, RulesServiceConfig, SyncConfig,
};
pub use document::{EnforcementLevel, RuleDocument};
pub use error::{Error, Result};
