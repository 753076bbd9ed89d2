//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a basket entry row.
pub type EntryId = i64;
/// The ID of a payment row.
pub type PaymentId = i64;
