//! Endpoint for saving bulk-imported rows.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{AppState, Error};

use super::engine::{ImportBatch, ImportOutcome, import_batch};

/// The state needed for the bulk import.
#[derive(Debug, Clone)]
pub struct ImportState {
    /// The database connection the batch transaction runs on.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for saving a batch of bulk-imported rows.
///
/// Always responds with the full outcome, including per-row errors; the
/// only failure modes are an empty batch and a store-level fault.
pub async fn import_save_endpoint(
    State(state): State<ImportState>,
    Json(batch): Json<ImportBatch>,
) -> Result<Json<ImportOutcome>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    import_batch(&batch, &connection).map(Json)
}
