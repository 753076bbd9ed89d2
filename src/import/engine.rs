//! Batch staging and transactional commit for bulk-imported rows.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    basket::{NewBasketEntry, create_basket_entry},
    database_id::DatabaseId,
    party::{NewWholesaler, PartyType, create_wholesaler, find_wholesaler_by_mark, party_name},
};

use super::{
    date::parse_flexible_date,
    row::{RawRow, RowIssue},
};

/// One bulk-import call: a sequence of rows plus the batch-level routing
/// settings.
///
/// Field names follow the upload source's wire format.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatch {
    /// The rows to import, in upload order.
    #[serde(default)]
    pub rows: Vec<RawRow>,
    /// Which kind of party every row in the batch belongs to.
    pub transaction_type: PartyType,
    /// The single pan shop every row targets, for pan-shop batches.
    #[serde(default)]
    pub pan_shop_id: Option<DatabaseId>,
    /// Whether to register a new wholesaler when a row's mark matches
    /// nobody.
    #[serde(default)]
    pub auto_create_wholesaler: bool,
}

/// The result of a bulk import: which rows made it in and why the rest
/// did not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportOutcome {
    /// The rows that were inserted, echoed back verbatim.
    pub inserted: Vec<RawRow>,
    /// One message per rejected row, naming the row and the reason.
    pub errors: Vec<String>,
    /// A human-readable summary of the batch.
    pub message: String,
}

/// Run a bulk-import batch against the store.
///
/// Rows are processed independently: a bad row is recorded in the
/// outcome's `errors` and never aborts its neighbours. All staged entries
/// (and any auto-created wholesalers) live in a single SQL transaction
/// that commits iff at least one row succeeded; a batch whose rows all
/// fail leaves the store untouched.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyBatch] if the batch contains no rows,
/// - or [Error::SqlError] if the transaction itself cannot be started or
///   committed.
pub fn import_batch(batch: &ImportBatch, connection: &Connection) -> Result<ImportOutcome, Error> {
    if batch.rows.is_empty() {
        return Err(Error::EmptyBatch);
    }

    let tx = connection.unchecked_transaction()?;

    let mut inserted = Vec::new();
    let mut errors = Vec::new();

    for (index, row) in batch.rows.iter().enumerate() {
        match stage_row(row, batch, &tx) {
            Ok(()) => inserted.push(row.clone()),
            Err(issue) => {
                tracing::debug!("skipping import row {}: {issue}", index + 1);
                errors.push(format!("row {}: {issue}", index + 1));
            }
        }
    }

    if inserted.is_empty() {
        tx.rollback()?;
    } else {
        tx.commit()?;
    }

    let message = format!(
        "Inserted {} entries, {} errors.",
        inserted.len(),
        errors.len()
    );

    Ok(ImportOutcome {
        inserted,
        errors,
        message,
    })
}

/// Validate one row, resolve its party and stage its basket entry inside
/// the batch transaction.
///
/// The import model is one row = one basket-equivalent lump transaction:
/// staged entries always have a basket count of 1 with the row's amount
/// as both the per-basket price and the total.
fn stage_row(row: &RawRow, batch: &ImportBatch, connection: &Connection) -> Result<(), RowIssue> {
    let amount_field = row.amount.as_ref().ok_or(RowIssue::MissingAmount)?;

    let mark = row.mark.as_deref().map(str::trim).unwrap_or("");
    if batch.transaction_type == PartyType::Wholesaler && mark.is_empty() {
        return Err(RowIssue::MissingMark);
    }

    let date_text = row.date.as_deref().map(str::trim).unwrap_or("");
    if date_text.is_empty() {
        return Err(RowIssue::MissingDate);
    }

    let amount = amount_field.parse()?;

    let (party_type, party_id) = match batch.transaction_type {
        PartyType::Wholesaler => (
            PartyType::Wholesaler,
            resolve_wholesaler(mark, batch.auto_create_wholesaler, connection)?,
        ),
        PartyType::Panshop => {
            let pan_shop_id = batch.pan_shop_id.ok_or(RowIssue::MissingPanShop)?;

            match party_name(PartyType::Panshop, pan_shop_id, connection).map_err(store_issue)? {
                Some(_) => (PartyType::Panshop, pan_shop_id),
                None => return Err(RowIssue::UnknownPanShop(pan_shop_id)),
            }
        }
    };

    let date = parse_flexible_date(date_text)
        .ok_or_else(|| RowIssue::UnparseableDate(date_text.to_owned()))?;

    create_basket_entry(
        NewBasketEntry {
            party_type,
            party_id,
            date,
            basket_count: 1,
            price_per_basket: amount,
            mark: (!mark.is_empty()).then(|| mark.to_owned()),
        },
        connection,
    )
    .map_err(store_issue)?;

    Ok(())
}

/// Find the wholesaler a mark refers to, registering one when allowed.
///
/// A wholesaler created here is inserted through the open batch
/// transaction, so later rows in the same batch resolve to it before
/// anything commits.
fn resolve_wholesaler(
    mark: &str,
    auto_create: bool,
    connection: &Connection,
) -> Result<DatabaseId, RowIssue> {
    if let Some(wholesaler) = find_wholesaler_by_mark(mark, connection).map_err(store_issue)? {
        return Ok(wholesaler.id);
    }

    if !auto_create {
        return Err(RowIssue::UnknownMark(mark.to_owned()));
    }

    let wholesaler = create_wholesaler(
        NewWholesaler {
            name: format!("Auto-created: {mark}"),
            contact_info: None,
            mark: Some(mark.to_owned()),
        },
        connection,
    )
    .map_err(store_issue)?;

    tracing::debug!("auto-created wholesaler {} for mark \"{mark}\"", wholesaler.id);

    Ok(wholesaler.id)
}

fn store_issue(error: Error) -> RowIssue {
    RowIssue::Store(error.to_string())
}
