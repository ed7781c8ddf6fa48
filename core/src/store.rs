//! Concrete [`RuleStore`](progwall_common::store::RuleStore) implementations.
//!
//! * [`netsecurity`]: Windows Defender Firewall through the `NetSecurity`
//!   PowerShell module.
//! * [`memory`]: an in-process table, used by tests.

pub mod memory;
pub mod netsecurity;
mod powershell;
