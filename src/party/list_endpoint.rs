//! Endpoints for listing registered wholesalers and pan shops.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{AppState, Error};

use super::core::{PanShop, Wholesaler, list_pan_shops, list_wholesalers};

/// The state needed for listing parties.
#[derive(Debug, Clone)]
pub struct ListPartiesState {
    /// The database connection for managing parties.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListPartiesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing all wholesalers.
pub async fn list_wholesalers_endpoint(
    State(state): State<ListPartiesState>,
) -> Result<Json<Vec<Wholesaler>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    list_wholesalers(&connection).map(Json)
}

/// A route handler for listing all pan shops.
pub async fn list_pan_shops_endpoint(
    State(state): State<ListPartiesState>,
) -> Result<Json<Vec<PanShop>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    list_pan_shops(&connection).map(Json)
}
