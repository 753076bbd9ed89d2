//! Endpoint serving the per-kind balance summary listing.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error, party::PartyType};

use super::core::{BalanceSummary, summaries_for_kind};

/// The state needed for the balance summary listing.
#[derive(Debug, Clone)]
pub struct BalanceSummaryState {
    /// The database connection for the ledger tables.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BalanceSummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters accepted by the balance summary listing.
///
/// The party kind arrives as a raw string so that invalid values produce
/// a field-level validation error instead of a generic decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceSummaryParams {
    /// Which kind of party to summarize, `wholesaler` or `panshop`.
    pub party_type: Option<String>,
}

/// A route handler for the balance summary of every party of a kind.
pub async fn balance_summary_endpoint(
    State(state): State<BalanceSummaryState>,
    Query(params): Query<BalanceSummaryParams>,
) -> Result<Json<Vec<BalanceSummary>>, Error> {
    let party_type = match params.party_type.as_deref() {
        Some("wholesaler") => PartyType::Wholesaler,
        Some("panshop") => PartyType::Panshop,
        Some(other) => return Err(Error::UnknownPartyType(other.to_owned())),
        None => return Err(Error::FieldMissing("party_type")),
    };

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    summaries_for_kind(party_type, &connection).map(Json)
}
