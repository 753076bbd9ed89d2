//! Endpoint for listing basket entries with filters and pagination.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    pagination::{PaginationConfig, page_count, page_offset},
    party::PartyType,
};

use super::core::{BasketEntry, EntryFilter, count_basket_entries, list_basket_entries};

/// The state needed for listing basket entries.
#[derive(Debug, Clone)]
pub struct ListEntriesState {
    /// The database connection for managing basket entries.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListEntriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Query parameters accepted by the basket entry listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEntriesParams {
    /// The 1-indexed page to return.
    pub page: Option<u64>,
    /// How many entries to return per page.
    pub per_page: Option<u64>,
    /// Only return entries recorded against this kind of party.
    pub party_type: Option<PartyType>,
    /// Only return entries recorded against this party ID.
    pub party_id: Option<DatabaseId>,
    /// Only return entries dated exactly this date.
    pub date: Option<Date>,
}

/// A page of basket entries.
#[derive(Debug, Serialize)]
pub struct EntryPage {
    /// The entries on this page, newest first.
    pub entries: Vec<BasketEntry>,
    /// How many entries match the filters across all pages.
    pub total: u64,
    /// The 1-indexed page that was returned.
    pub page: u64,
    /// How many entries were requested per page.
    pub per_page: u64,
    /// How many pages the filtered entries span.
    pub pages: u64,
}

/// A route handler for listing basket entries, newest first.
pub async fn list_basket_entries_endpoint(
    State(state): State<ListEntriesState>,
    Query(params): Query<ListEntriesParams>,
) -> Result<Json<EntryPage>, Error> {
    let page = params.page.unwrap_or(state.pagination_config.default_page);
    let per_page = params
        .per_page
        .unwrap_or(state.pagination_config.default_page_size);
    let filter = EntryFilter {
        party_type: params.party_type,
        party_id: params.party_id,
        date: params.date,
    };

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let total = count_basket_entries(&filter, &connection)?;
    let entries = list_basket_entries(&filter, per_page, page_offset(page, per_page), &connection)?;

    Ok(Json(EntryPage {
        entries,
        total,
        page,
        per_page,
        pages: page_count(total, per_page),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::{Query, State},
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        basket::{NewBasketEntry, create_basket_entry},
        db::initialize,
        pagination::PaginationConfig,
        party::PartyType,
    };

    use super::{ListEntriesParams, ListEntriesState, list_basket_entries_endpoint};

    fn get_test_state() -> ListEntriesState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        ListEntriesState {
            db_connection: Arc::new(Mutex::new(conn)),
            pagination_config: PaginationConfig::default(),
        }
    }

    fn insert_entries(state: &ListEntriesState, count: i64) {
        let connection = state.db_connection.lock().unwrap();
        for day in 1..=count {
            create_basket_entry(
                NewBasketEntry {
                    party_type: PartyType::Wholesaler,
                    party_id: 1,
                    date: date!(2025 - 06 - 01) + time::Duration::days(day),
                    basket_count: 1,
                    price_per_basket: 50.0,
                    mark: None,
                },
                &connection,
            )
            .unwrap();
        }
    }

    #[tokio::test]
    async fn paginates_with_defaults() {
        let state = get_test_state();
        insert_entries(&state, 15);

        let Json(got) =
            list_basket_entries_endpoint(State(state), Query(ListEntriesParams::default()))
                .await
                .expect("Could not list basket entries");

        assert_eq!(got.total, 15);
        assert_eq!(got.page, 1);
        assert_eq!(got.per_page, 10);
        assert_eq!(got.pages, 2);
        assert_eq!(got.entries.len(), 10, "first page should be full");
    }

    #[tokio::test]
    async fn returns_requested_page() {
        let state = get_test_state();
        insert_entries(&state, 15);

        let Json(got) = list_basket_entries_endpoint(
            State(state),
            Query(ListEntriesParams {
                page: Some(2),
                per_page: Some(10),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(got.page, 2);
        assert_eq!(got.entries.len(), 5, "second page should hold the rest");
    }

    #[tokio::test]
    async fn empty_store_yields_one_empty_page() {
        let state = get_test_state();

        let Json(got) =
            list_basket_entries_endpoint(State(state), Query(ListEntriesParams::default()))
                .await
                .unwrap();

        assert_eq!(got.total, 0);
        assert_eq!(got.pages, 1);
        assert!(got.entries.is_empty());
    }
}
