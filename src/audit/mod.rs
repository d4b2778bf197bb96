//! Audit trail for ledger mutations
//!
//! Every create, update and delete of a trip, traveler, stop or expense is
//! appended to `audit.log` as one JSON line, with before/after snapshots and
//! a short field-level diff for updates.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
