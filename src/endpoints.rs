//! The API endpoint URIs.

/// The route for registering and listing wholesalers.
pub const WHOLESALERS: &str = "/api/wholesalers";
/// The route for registering and listing pan shops.
pub const PANSHOPS: &str = "/api/panshops";
/// The route for creating a basket entry.
pub const BASKET_ENTRIES_ADD: &str = "/api/basket-entries/add";
/// The route for listing basket entries.
pub const BASKET_ENTRIES: &str = "/api/basket-entries";
/// The route for updating or deleting a single basket entry.
pub const BASKET_ENTRY: &str = "/api/basket-entries/{entry_id}";
/// The route for recording and listing payments.
pub const PAYMENTS: &str = "/api/payments";
/// The route for a single wholesaler's running balance.
pub const WHOLESALER_BALANCE: &str = "/api/payments/wholesaler/{party_id}";
/// The route for a single pan shop's running balance.
pub const PANSHOP_BALANCE: &str = "/api/payments/panshop/{party_id}";
/// The route for the per-kind balance summary listing.
pub const BALANCE_SUMMARY: &str = "/api/payments/balance-summary";
/// The route for saving bulk-imported rows.
pub const IMPORT_SAVE: &str = "/api/import/save";
/// The route for the dashboard summary report.
pub const DASHBOARD_SUMMARY: &str = "/api/dashboard-summary";
/// The route for the bounded transaction history report.
pub const HISTORY: &str = "/api/history";
