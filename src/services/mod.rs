//! Service layer.

pub mod usage_ledger;

pub use usage_ledger::{LedgerState, RoleUsage, UsageLedger};
