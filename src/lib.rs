//! Pan Basket is the bookkeeping backend for a produce-basket trading
//! operation: it records basket transactions against wholesalers and
//! pan-shops, records payments, and derives running balances and summary
//! reports.
//!
//! This library provides a JSON REST API. Authentication, email delivery
//! and OCR text extraction are handled by external services and are not
//! part of this crate.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod basket;
mod database_id;
mod db;
mod endpoints;
mod import;
mod ledger;
mod logging;
mod pagination;
mod party;
mod payment;
mod report;
mod routing;
mod state;

pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use state::AppState;

use crate::{database_id::DatabaseId, party::PartyType};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required request field was missing or empty.
    #[error("{0} is required")]
    FieldMissing(&'static str),

    /// The request named a party kind other than `wholesaler` or `panshop`.
    #[error("invalid party type \"{0}\"")]
    UnknownPartyType(String),

    /// The referenced party does not exist.
    ///
    /// Returned when creating a basket entry or payment against a party
    /// that was never registered. Read-time balance queries deliberately
    /// do *not* raise this; they report zeroed totals instead.
    #[error("{0} with ID {1} not found")]
    PartyNotFound(PartyType, DatabaseId),

    /// A basket entry update named a replacement party that does not exist.
    ///
    /// Distinct from [Error::PartyNotFound] because re-parenting to a
    /// missing party is a malformed request, not a missing resource.
    #[error("{0} with ID {1} not found")]
    InvalidParty(PartyType, DatabaseId),

    /// An empty string was used to register a party.
    #[error("party name cannot be empty")]
    EmptyPartyName,

    /// A bulk-import request contained no rows.
    #[error("no data provided")]
    EmptyBatch,

    /// A date string in a request could not be parsed.
    #[error("invalid date \"{0}\", use YYYY-MM-DD")]
    InvalidDate(String),

    /// The requested resource was not found.
    ///
    /// The client should check that the parameters (e.g., ID) are correct
    /// and that the resource has been created.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a basket entry that does not exist.
    #[error("basket entry with ID {0} not found")]
    UpdateMissingEntry(DatabaseId),

    /// Tried to delete a basket entry that does not exist.
    #[error("basket entry with ID {0} not found")]
    DeleteMissingEntry(DatabaseId),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code the error maps to.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::FieldMissing(_)
            | Error::UnknownPartyType(_)
            | Error::InvalidParty(_, _)
            | Error::EmptyPartyName
            | Error::EmptyBatch
            | Error::InvalidDate(_) => StatusCode::BAD_REQUEST,
            Error::PartyNotFound(_, _)
            | Error::NotFound
            | Error::UpdateMissingEntry(_)
            | Error::DeleteMissingEntry(_) => StatusCode::NOT_FOUND,
            Error::DatabaseLockError | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            // Store errors are not intended to be shown to the client.
            return (
                status_code,
                Json(json!({"error": "an internal error occurred"})),
            )
                .into_response();
        }

        (status_code, Json(json!({"error": self.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::http::StatusCode;

    use crate::{Error, party::PartyType};

    #[test]
    fn maps_sql_no_rows_to_not_found() {
        let got: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(got, Error::NotFound);
    }

    #[test]
    fn validation_errors_are_bad_request() {
        let errors = [
            Error::FieldMissing("date"),
            Error::UnknownPartyType("shopkeeper".to_owned()),
            Error::EmptyPartyName,
            Error::EmptyBatch,
            Error::InvalidDate("13/13/2025".to_owned()),
            Error::InvalidParty(PartyType::Wholesaler, 7),
        ];

        for error in errors {
            assert_eq!(error.status_code(), StatusCode::BAD_REQUEST, "{error}");
        }
    }

    #[test]
    fn missing_resources_are_not_found() {
        let errors = [
            Error::PartyNotFound(PartyType::Panshop, 42),
            Error::NotFound,
            Error::UpdateMissingEntry(1),
            Error::DeleteMissingEntry(1),
        ];

        for error in errors {
            assert_eq!(error.status_code(), StatusCode::NOT_FOUND, "{error}");
        }
    }
}
