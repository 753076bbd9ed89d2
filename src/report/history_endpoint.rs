//! Endpoint serving the bounded transaction history.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::{AppState, Error, database_id::DatabaseId, party::PartyType};

use super::history::{TransactionHistory, transaction_history};

/// The state needed for the history report.
#[derive(Debug, Clone)]
pub struct HistoryState {
    /// The database connection for the ledger tables.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Query parameters accepted by the history report. All are required;
/// they arrive as raw strings so missing or malformed values surface as
/// field-level validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    /// Which kind of party to report on, `wholesaler` or `panshop`.
    pub party_type: Option<String>,
    /// The ID of the party to report on.
    pub party_id: Option<DatabaseId>,
    /// The first date of the range, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// The last date of the range, `YYYY-MM-DD`.
    pub end_date: Option<String>,
}

/// A route handler for a party's transaction history over an inclusive
/// date range.
pub async fn history_endpoint(
    State(state): State<HistoryState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<TransactionHistory>, Error> {
    let party_type = match params.party_type.as_deref() {
        Some("wholesaler") => PartyType::Wholesaler,
        Some("panshop") => PartyType::Panshop,
        Some(other) => return Err(Error::UnknownPartyType(other.to_owned())),
        None => return Err(Error::FieldMissing("party_type")),
    };
    let party_id = params.party_id.ok_or(Error::FieldMissing("party_id"))?;
    let start = parse_iso_date(params.start_date.as_deref(), "start_date")?;
    let end = parse_iso_date(params.end_date.as_deref(), "end_date")?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    transaction_history(party_type, party_id, start, end, &connection).map(Json)
}

fn parse_iso_date(text: Option<&str>, field: &'static str) -> Result<Date, Error> {
    let text = text.ok_or(Error::FieldMissing(field))?;

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        basket::{NewBasketEntry, create_basket_entry},
        db::initialize,
        party::PartyType,
    };

    use super::{HistoryParams, HistoryState, history_endpoint};

    fn get_test_state() -> HistoryState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        HistoryState {
            db_connection: Arc::new(Mutex::new(conn)),
        }
    }

    fn params(party_type: &str, start: &str, end: &str) -> HistoryParams {
        HistoryParams {
            party_type: Some(party_type.to_owned()),
            party_id: Some(1),
            start_date: Some(start.to_owned()),
            end_date: Some(end.to_owned()),
        }
    }

    #[tokio::test]
    async fn serves_history_for_the_range() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_basket_entry(
                NewBasketEntry {
                    party_type: PartyType::Wholesaler,
                    party_id: 1,
                    date: date!(2025 - 06 - 05),
                    basket_count: 2,
                    price_per_basket: 50.0,
                    mark: None,
                },
                &connection,
            )
            .unwrap();
        }

        let got = history_endpoint(
            State(state),
            Query(params("wholesaler", "2025-06-01", "2025-06-30")),
        )
        .await
        .unwrap()
        .0;

        assert_eq!(got.baskets.len(), 1);
        assert_eq!(got.summary.total_basket_value, 100.0);
    }

    #[tokio::test]
    async fn rejects_missing_parameters() {
        let state = get_test_state();

        let got = history_endpoint(State(state), Query(HistoryParams::default())).await;

        assert_eq!(got.unwrap_err(), Error::FieldMissing("party_type"));
    }

    #[tokio::test]
    async fn rejects_malformed_dates() {
        let state = get_test_state();

        let got = history_endpoint(
            State(state),
            Query(params("wholesaler", "01-06-2025", "2025-06-30")),
        )
        .await;

        assert_eq!(
            got.unwrap_err(),
            Error::InvalidDate("01-06-2025".to_owned())
        );
    }
}
