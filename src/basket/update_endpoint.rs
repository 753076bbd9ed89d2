//! Endpoint for updating a basket entry, optionally cascading party
//! changes to all entries imported under the same mark.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use time::Date;

use crate::{
    AppState, Error,
    database_id::{DatabaseId, EntryId},
    party::{PartyType, party_name},
};

use super::core::get_basket_entry;

/// The state needed to update a basket entry.
#[derive(Debug, Clone)]
pub struct UpdateEntryState {
    /// The database connection for managing basket entries.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateEntryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for updating a basket entry. Absent fields are left
/// unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEntryForm {
    /// Re-parent the entry to this kind of party.
    pub party_type: Option<PartyType>,
    /// Re-parent the entry to this party ID.
    pub party_id: Option<DatabaseId>,
    /// Change the transaction date.
    pub date: Option<Date>,
    /// Change the basket count. Does not recompute the total.
    pub basket_count: Option<i64>,
    /// Change the per-basket price. Does not recompute the total.
    pub price_per_basket: Option<f64>,
    /// Override the total independently of count and price.
    ///
    /// This is the escape hatch for correcting imported lump amounts.
    pub total_price: Option<f64>,
    /// Change the entry's mark code.
    pub mark: Option<String>,
    /// Also re-parent every other entry sharing the entry's mark.
    #[serde(default)]
    pub update_related: bool,
    /// The mark the related entries currently carry. Defaults to the
    /// entry's (possibly just-updated) mark.
    pub original_mark: Option<String>,
}

/// A route handler for updating a basket entry.
pub async fn update_basket_entry_endpoint(
    State(state): State<UpdateEntryState>,
    Path(entry_id): Path<EntryId>,
    Json(form): Json<UpdateEntryForm>,
) -> Result<Json<serde_json::Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let related_updated = update_basket_entry(entry_id, form, &connection)?;

    Ok(Json(json!({
        "success": true,
        "message": "Basket entry updated successfully",
        "related_updated": related_updated,
    })))
}

/// Apply `form` to the entry with `entry_id`, cascading party changes to
/// same-mark entries when requested. Returns how many related entries
/// were touched by the cascade.
///
/// The update and its cascade are committed atomically.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingEntry] if `entry_id` does not refer to a valid entry,
/// - [Error::InvalidParty] if the form re-parents to a missing party,
/// - or [Error::SqlError] if there is some other SQL error.
fn update_basket_entry(
    entry_id: EntryId,
    form: UpdateEntryForm,
    connection: &Connection,
) -> Result<usize, Error> {
    let tx = connection.unchecked_transaction()?;

    let existing = get_basket_entry(entry_id, &tx).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingEntry(entry_id),
        error => error,
    })?;

    if let (Some(party_type), Some(party_id)) = (form.party_type, form.party_id)
        && party_name(party_type, party_id, &tx)?.is_none()
    {
        return Err(Error::InvalidParty(party_type, party_id));
    }

    let mark = form.mark.clone().or(existing.mark);

    tx.execute(
        "UPDATE basket_entry SET
            party_type = :party_type,
            party_id = :party_id,
            date = :date,
            basket_count = :basket_count,
            price_per_basket = :price_per_basket,
            total_price = :total_price,
            mark = :mark
         WHERE id = :id",
        rusqlite::named_params! {
            ":party_type": form.party_type.unwrap_or(existing.party_type),
            ":party_id": form.party_id.unwrap_or(existing.party_id),
            ":date": form.date.unwrap_or(existing.date),
            ":basket_count": form.basket_count.unwrap_or(existing.basket_count),
            ":price_per_basket": form.price_per_basket.unwrap_or(existing.price_per_basket),
            // The total is only changed by an explicit override.
            ":total_price": form.total_price.unwrap_or(existing.total_price),
            ":mark": mark,
            ":id": entry_id,
        },
    )?;

    let mut related_updated = 0;

    if form.update_related
        && let Some(mark) = mark.as_deref().filter(|mark| !mark.is_empty())
    {
        let original_mark = form.original_mark.as_deref().unwrap_or(mark);

        // The cascade only re-parents; dates and amounts of related
        // entries are left alone.
        related_updated = tx.execute(
            "UPDATE basket_entry SET
                party_type = COALESCE(:party_type, party_type),
                party_id = COALESCE(:party_id, party_id),
                mark = CASE
                    WHEN :new_mark IS NOT NULL AND :new_mark <> :original_mark THEN :new_mark
                    ELSE mark
                END
             WHERE mark = :original_mark AND id <> :id",
            rusqlite::named_params! {
                ":party_type": form.party_type,
                ":party_id": form.party_id,
                ":new_mark": form.mark,
                ":original_mark": original_mark,
                ":id": entry_id,
            },
        )?;
    }

    tx.commit()?;

    Ok(related_updated)
}
