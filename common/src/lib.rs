//! # Progwall Common
//!
//! Shared vocabulary for the `progwall` workspace: the rule and target models,
//! the error taxonomy and the outbound ports ([`store::RuleStore`],
//! [`report::ReportSink`]) that the core drives.

pub mod config;
pub mod error;
pub mod outcome;
pub mod report;
pub mod rule;
pub mod store;
pub mod target;
