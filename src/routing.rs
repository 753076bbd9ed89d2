//! Application router configuration.

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    basket::{
        create_basket_entry_endpoint, delete_basket_entry_endpoint, list_basket_entries_endpoint,
        update_basket_entry_endpoint,
    },
    endpoints,
    import::import_save_endpoint,
    ledger::{balance_summary_endpoint, panshop_balance_endpoint, wholesaler_balance_endpoint},
    party::{
        create_pan_shop_endpoint, create_wholesaler_endpoint, list_pan_shops_endpoint,
        list_wholesalers_endpoint,
    },
    payment::{create_payment_endpoint, list_payments_endpoint},
    report::{dashboard_summary_endpoint, history_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::WHOLESALERS,
            get(list_wholesalers_endpoint).post(create_wholesaler_endpoint),
        )
        .route(
            endpoints::PANSHOPS,
            get(list_pan_shops_endpoint).post(create_pan_shop_endpoint),
        )
        .route(
            endpoints::BASKET_ENTRIES_ADD,
            post(create_basket_entry_endpoint),
        )
        .route(endpoints::BASKET_ENTRIES, get(list_basket_entries_endpoint))
        .route(
            endpoints::BASKET_ENTRY,
            put(update_basket_entry_endpoint).delete(delete_basket_entry_endpoint),
        )
        .route(endpoints::BALANCE_SUMMARY, get(balance_summary_endpoint))
        .route(
            endpoints::WHOLESALER_BALANCE,
            get(wholesaler_balance_endpoint),
        )
        .route(endpoints::PANSHOP_BALANCE, get(panshop_balance_endpoint))
        .route(
            endpoints::PAYMENTS,
            get(list_payments_endpoint).post(create_payment_endpoint),
        )
        .route(endpoints::IMPORT_SAVE, post(import_save_endpoint))
        .route(
            endpoints::DASHBOARD_SUMMARY,
            get(dashboard_summary_endpoint),
        )
        .route(endpoints::HISTORY, get(history_endpoint))
        .with_state(state)
}
