//! Endpoint for listing payments.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error, database_id::DatabaseId, party::PartyType};

use super::core::{PaymentListItem, list_payments};

/// The state needed for listing payments.
#[derive(Debug, Clone)]
pub struct ListPaymentsState {
    /// The database connection for managing payments.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListPaymentsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters accepted by the payment listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPaymentsParams {
    /// Only return payments made by this kind of party.
    pub party_type: Option<PartyType>,
    /// Only return payments made by this party ID.
    pub party_id: Option<DatabaseId>,
}

/// A route handler for listing payments, newest first.
pub async fn list_payments_endpoint(
    State(state): State<ListPaymentsState>,
    Query(params): Query<ListPaymentsParams>,
) -> Result<Json<Vec<PaymentListItem>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    list_payments(params.party_type, params.party_id, &connection).map(Json)
}
