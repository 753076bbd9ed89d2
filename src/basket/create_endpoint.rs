//! Endpoint for recording a basket entry.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use time::Date;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    party::{PartyType, ensure_party_exists},
};

use super::core::{NewBasketEntry, create_basket_entry};

/// The state needed for creating a basket entry.
#[derive(Debug, Clone)]
pub struct CreateEntryState {
    /// The database connection for managing basket entries.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateEntryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating a basket entry.
///
/// Fields are optional at the wire level so that missing values surface as
/// field-level validation errors rather than a generic decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct BasketEntryForm {
    party_type: Option<PartyType>,
    party_id: Option<DatabaseId>,
    date: Option<Date>,
    basket_count: Option<i64>,
    price_per_basket: Option<f64>,
    #[serde(default)]
    mark: Option<String>,
}

impl BasketEntryForm {
    fn validate(self) -> Result<NewBasketEntry, Error> {
        Ok(NewBasketEntry {
            party_type: self.party_type.ok_or(Error::FieldMissing("party_type"))?,
            party_id: self.party_id.ok_or(Error::FieldMissing("party_id"))?,
            date: self.date.ok_or(Error::FieldMissing("date"))?,
            basket_count: self
                .basket_count
                .ok_or(Error::FieldMissing("basket_count"))?,
            price_per_basket: self
                .price_per_basket
                .ok_or(Error::FieldMissing("price_per_basket"))?,
            mark: self.mark,
        })
    }
}

/// A route handler for recording a basket entry.
///
/// The referenced party must exist; the entry's total price is derived
/// from the basket count and per-basket price.
pub async fn create_basket_entry_endpoint(
    State(state): State<CreateEntryState>,
    Json(form): Json<BasketEntryForm>,
) -> Result<(StatusCode, Json<serde_json::Value>), Error> {
    let new_entry = form.validate()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    ensure_party_exists(new_entry.party_type, new_entry.party_id, &connection)?;

    let entry = create_basket_entry(new_entry, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Basket entry added successfully", "entry": entry})),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        basket::count_basket_entries,
        db::initialize,
        party::{NewWholesaler, PartyType, create_wholesaler},
    };

    use super::{BasketEntryForm, CreateEntryState, create_basket_entry_endpoint};

    fn get_test_state_with_wholesaler() -> (CreateEntryState, i64) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let wholesaler = create_wholesaler(
            NewWholesaler {
                name: "Sharma Produce".to_owned(),
                contact_info: None,
                mark: Some("SH".to_owned()),
            },
            &conn,
        )
        .unwrap();

        (
            CreateEntryState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            wholesaler.id,
        )
    }

    fn form(party_id: Option<i64>) -> BasketEntryForm {
        BasketEntryForm {
            party_type: Some(PartyType::Wholesaler),
            party_id,
            date: Some(date!(2025 - 06 - 01)),
            basket_count: Some(4),
            price_per_basket: Some(25.0),
            mark: None,
        }
    }

    #[tokio::test]
    async fn create_entry_succeeds() {
        let (state, wholesaler_id) = get_test_state_with_wholesaler();

        let (status_code, Json(body)) =
            create_basket_entry_endpoint(State(state.clone()), Json(form(Some(wholesaler_id))))
                .await
                .expect("Could not create basket entry");

        assert_eq!(status_code, StatusCode::CREATED);
        assert_eq!(body["entry"]["total_price"], 100.0);
    }

    #[tokio::test]
    async fn create_entry_rejects_missing_field() {
        let (state, wholesaler_id) = get_test_state_with_wholesaler();
        let mut form = form(Some(wholesaler_id));
        form.date = None;

        let got = create_basket_entry_endpoint(State(state), Json(form)).await;

        assert_eq!(got.unwrap_err(), Error::FieldMissing("date"));
    }

    #[tokio::test]
    async fn create_entry_rejects_unknown_party() {
        let (state, _) = get_test_state_with_wholesaler();

        let got = create_basket_entry_endpoint(State(state.clone()), Json(form(Some(999)))).await;

        assert_eq!(
            got.unwrap_err(),
            Error::PartyNotFound(PartyType::Wholesaler, 999)
        );

        let connection = state.db_connection.lock().unwrap();
        let count = count_basket_entries(&Default::default(), &connection).unwrap();
        assert_eq!(count, 0, "no entry should be created");
    }
}
