//! # Progwall Core
//!
//! Rule reconciliation for executables discovered under a path.
//!
//! * [`resolver`] turns a path into [`ExecutableTarget`]s.
//! * [`reconciler`] diffs targets against the [`RuleStore`] and applies the
//!   minimal set of creates and removes.
//! * [`orphans`] purges owner-tagged rules whose program no longer exists.
//! * [`store`] holds the concrete stores: the Windows `NetSecurity` adapter and
//!   an in-memory store.
//!
//! Every store call is made at the moment it is needed. Nothing read from the
//! store is reused for a later mutation, since other tools share the table.
//!
//! [`ExecutableTarget`]: progwall_common::target::ExecutableTarget
//! [`RuleStore`]: progwall_common::store::RuleStore

pub mod orphans;
pub mod query;
pub mod reconciler;
pub mod report;
pub mod resolver;
pub mod store;
