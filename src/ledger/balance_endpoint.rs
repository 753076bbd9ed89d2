//! Endpoints serving a single party's running balance.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::DatabaseId, party::PartyType};

use super::core::{PartyBalance, balance_for_party};

/// The state needed for computing balances.
#[derive(Debug, Clone)]
pub struct BalanceState {
    /// The database connection for the ledger tables.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BalanceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for a wholesaler's running balance.
///
/// Unknown IDs yield a zeroed balance with the name "Unknown" rather than
/// a 404.
pub async fn wholesaler_balance_endpoint(
    State(state): State<BalanceState>,
    Path(party_id): Path<DatabaseId>,
) -> Result<Json<PartyBalance>, Error> {
    balance_endpoint(PartyType::Wholesaler, party_id, &state)
}

/// A route handler for a pan shop's running balance.
///
/// Unknown IDs yield a zeroed balance with the name "Unknown" rather than
/// a 404.
pub async fn panshop_balance_endpoint(
    State(state): State<BalanceState>,
    Path(party_id): Path<DatabaseId>,
) -> Result<Json<PartyBalance>, Error> {
    balance_endpoint(PartyType::Panshop, party_id, &state)
}

fn balance_endpoint(
    party_type: PartyType,
    party_id: DatabaseId,
    state: &BalanceState,
) -> Result<Json<PartyBalance>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    balance_for_party(party_type, party_id, &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        basket::{NewBasketEntry, create_basket_entry},
        db::initialize,
        party::{NewWholesaler, PartyType, create_wholesaler},
        payment::{NewPayment, PaymentMode, create_payment},
    };

    use super::{BalanceState, wholesaler_balance_endpoint};

    #[tokio::test]
    async fn serves_wholesaler_balance() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let wholesaler = create_wholesaler(
            NewWholesaler {
                name: "Sharma Produce".to_owned(),
                contact_info: None,
                mark: None,
            },
            &conn,
        )
        .unwrap();
        create_basket_entry(
            NewBasketEntry {
                party_type: PartyType::Wholesaler,
                party_id: wholesaler.id,
                date: date!(2025 - 06 - 01),
                basket_count: 4,
                price_per_basket: 25.0,
                mark: None,
            },
            &conn,
        )
        .unwrap();
        create_payment(
            NewPayment {
                party_type: PartyType::Wholesaler,
                party_id: wholesaler.id,
                amount: 60.0,
                date: date!(2025 - 06 - 02),
                note: None,
                payment_mode: PaymentMode::Cash,
                upi_account: None,
            },
            &conn,
        )
        .unwrap();
        let state = BalanceState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let got = wholesaler_balance_endpoint(State(state), Path(wholesaler.id))
            .await
            .unwrap()
            .0;

        assert_eq!(got.party_name, "Sharma Produce");
        assert_eq!(got.total_basket_value, 100.0);
        assert_eq!(got.total_paid, Some(60.0));
        assert_eq!(got.balance, 40.0);
    }
}
