//! Endpoint serving the dashboard summary.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{AppState, Error};

use super::dashboard::{DashboardSummary, dashboard_summary};

/// The state needed for the dashboard summary.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for the ledger tables.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for the dashboard summary report.
pub async fn dashboard_summary_endpoint(
    State(state): State<DashboardState>,
) -> Result<Json<DashboardSummary>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    dashboard_summary(&connection).map(Json)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;

    use crate::db::initialize;

    use super::{DashboardState, dashboard_summary_endpoint};

    #[tokio::test]
    async fn empty_store_serves_zeroed_summary() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let got = dashboard_summary_endpoint(State(state)).await.unwrap().0;

        assert_eq!(got.total_due, 0.0);
        assert_eq!(got.total_transactions, 0);
    }
}
