//! The bulk-import reconciliation engine.
//!
//! Takes unstructured rows (from the OCR upload flow or manual bulk
//! entry), matches each row to a party, and inserts the resulting basket
//! entries transactionally with partial-success reporting. Row-level
//! problems are collected, never raised; a batch commits iff at least one
//! row made it through.

mod date;
mod endpoint;
mod engine;
mod row;

pub use date::parse_flexible_date;
pub use endpoint::import_save_endpoint;
pub use engine::{ImportBatch, ImportOutcome, import_batch};
pub use row::{AmountField, RawRow, RowIssue};
