//! Endpoint for recording a payment.

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

use super::core::{NewPayment, PaymentMode, create_payment};

/// The state needed for recording a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentState {
    /// The database connection for managing payments.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreatePaymentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for recording a payment.
///
/// Fields are optional at the wire level so that missing values surface as
/// field-level validation errors rather than a generic decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentForm {
    party_type: Option<PartyType>,
    party_id: Option<DatabaseId>,
    amount: Option<f64>,
    date: Option<Date>,
    #[serde(default)]
    note: Option<String>,
    payment_mode: Option<PaymentMode>,
    #[serde(default)]
    upi_account: Option<String>,
}

impl PaymentForm {
    fn validate(self) -> Result<NewPayment, Error> {
        Ok(NewPayment {
            party_type: self.party_type.ok_or(Error::FieldMissing("party_type"))?,
            party_id: self.party_id.ok_or(Error::FieldMissing("party_id"))?,
            amount: self.amount.ok_or(Error::FieldMissing("amount"))?,
            date: self.date.ok_or(Error::FieldMissing("date"))?,
            note: self.note,
            payment_mode: self
                .payment_mode
                .ok_or(Error::FieldMissing("payment_mode"))?,
            upi_account: self.upi_account,
        })
    }
}

/// A route handler for recording a payment.
///
/// The paying party must exist.
pub async fn create_payment_endpoint(
    State(state): State<CreatePaymentState>,
    Json(form): Json<PaymentForm>,
) -> Result<(StatusCode, Json<serde_json::Value>), Error> {
    let new_payment = form.validate()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    ensure_party_exists(new_payment.party_type, new_payment.party_id, &connection)?;

    create_payment(new_payment, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Payment recorded successfully"})),
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
        db::initialize,
        party::{NewPanShop, PartyType, create_pan_shop},
        payment::{PaymentMode, list_payments},
    };

    use super::{CreatePaymentState, PaymentForm, create_payment_endpoint};

    fn get_test_state_with_pan_shop() -> (CreatePaymentState, i64) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let pan_shop = create_pan_shop(
            NewPanShop {
                name: "Corner Pan".to_owned(),
                contact_info: None,
            },
            &conn,
        )
        .unwrap();

        (
            CreatePaymentState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            pan_shop.id,
        )
    }

    fn form(party_id: Option<i64>) -> PaymentForm {
        PaymentForm {
            party_type: Some(PartyType::Panshop),
            party_id,
            amount: Some(250.0),
            date: Some(date!(2025 - 06 - 01)),
            note: None,
            payment_mode: Some(PaymentMode::Cash),
            upi_account: None,
        }
    }

    #[tokio::test]
    async fn record_payment_succeeds() {
        let (state, pan_shop_id) = get_test_state_with_pan_shop();

        let (status_code, _) =
            create_payment_endpoint(State(state.clone()), Json(form(Some(pan_shop_id))))
                .await
                .expect("Could not record payment");

        assert_eq!(status_code, StatusCode::CREATED);

        let connection = state.db_connection.lock().unwrap();
        let payments = list_payments(None, None, &connection).unwrap();
        assert_eq!(payments.len(), 1, "want 1 payment, got {}", payments.len());
        assert_eq!(payments[0].amount, 250.0);
    }

    #[tokio::test]
    async fn record_payment_rejects_missing_amount() {
        let (state, pan_shop_id) = get_test_state_with_pan_shop();
        let mut form = form(Some(pan_shop_id));
        form.amount = None;

        let got = create_payment_endpoint(State(state), Json(form)).await;

        assert_eq!(got.unwrap_err(), Error::FieldMissing("amount"));
    }

    #[tokio::test]
    async fn record_payment_rejects_unknown_party() {
        let (state, _) = get_test_state_with_pan_shop();

        let got = create_payment_endpoint(State(state.clone()), Json(form(Some(999)))).await;

        assert_eq!(
            got.unwrap_err(),
            Error::PartyNotFound(PartyType::Panshop, 999)
        );

        let connection = state.db_connection.lock().unwrap();
        let payments = list_payments(None, None, &connection).unwrap();
        assert!(payments.is_empty(), "no payment should be created");
    }
}
