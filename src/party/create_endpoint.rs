//! Endpoints for registering wholesalers and pan shops.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde_json::json;

use crate::{AppState, Error};

use super::core::{NewPanShop, NewWholesaler, create_pan_shop, create_wholesaler};

/// The state needed for registering a party.
#[derive(Debug, Clone)]
pub struct RegisterPartyState {
    /// The database connection for managing parties.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegisterPartyState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for registering a wholesaler.
pub async fn create_wholesaler_endpoint(
    State(state): State<RegisterPartyState>,
    Json(new_wholesaler): Json<NewWholesaler>,
) -> Result<(StatusCode, Json<serde_json::Value>), Error> {
    let connection = lock_connection(&state)?;

    let wholesaler = create_wholesaler(new_wholesaler, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Wholesaler added", "wholesaler": wholesaler})),
    ))
}

/// A route handler for registering a pan shop.
pub async fn create_pan_shop_endpoint(
    State(state): State<RegisterPartyState>,
    Json(new_pan_shop): Json<NewPanShop>,
) -> Result<(StatusCode, Json<serde_json::Value>), Error> {
    let connection = lock_connection(&state)?;

    let pan_shop = create_pan_shop(new_pan_shop, &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Pan shop added successfully", "pan_shop": pan_shop})),
    ))
}

fn lock_connection(state: &RegisterPartyState) -> Result<MutexGuard<'_, Connection>, Error> {
    state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
