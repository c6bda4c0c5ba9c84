//! Shared test utilities for the rules-service workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`corpus`]: [`TestCorpus`](corpus::TestCorpus) builder for rule trees on disk
//! - [`fixtures`]: canned rule and target documents

pub mod corpus;
pub mod fixtures;

pub use corpus::{RuleFile, TestCorpus};
