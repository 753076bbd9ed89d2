//! The reporting engine: dashboard summaries and bounded transaction
//! history.

mod dashboard;
mod dashboard_endpoint;
mod history;
mod history_endpoint;

pub use dashboard::{
    DailyBasketFlow, DashboardSummary, MonthlyPayments, PartyDue, PartyStanding, dashboard_summary,
};
pub use dashboard_endpoint::dashboard_summary_endpoint;
pub use history::{
    HistoryBasket, HistoryPayment, HistorySummary, TransactionHistory, transaction_history,
};
pub use history_endpoint::history_endpoint;
