//! Endpoint for deleting a basket entry.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{AppState, Error, database_id::EntryId};

/// The state needed to delete a basket entry.
#[derive(Debug, Clone)]
pub struct DeleteEntryState {
    /// The database connection for managing basket entries.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteEntryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a basket entry.
pub async fn delete_basket_entry_endpoint(
    State(state): State<DeleteEntryState>,
    Path(entry_id): Path<EntryId>,
) -> Result<Json<serde_json::Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    match delete_basket_entry(entry_id, &connection)? {
        0 => Err(Error::DeleteMissingEntry(entry_id)),
        _ => Ok(Json(json!({
            "success": true,
            "message": "Basket entry deleted successfully",
        }))),
    }
}

type RowsAffected = usize;

fn delete_basket_entry(id: EntryId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM basket_entry WHERE id = :id", &[(":id", &id)])
        .map_err(|error| error.into())
}
