//! Shared primitive types used across the desk.

/// Identifier of a fraud case, assigned by the analysis service.
pub type CaseId = String;

/// A stable identifier for customers, accounts, merchants and transactions.
pub type EntityId = String;

/// Monotonic counter for case-set replacements.
pub type Generation = u64;
