//! The ledger aggregator: derives running balances from basket entries
//! and payments.
//!
//! The single derived quantity everything here reduces to is
//! `balance = sum(basket_entry.total_price) - sum(payment.amount)` for a
//! given `(party_type, party_id)` pair.

mod balance_endpoint;
mod core;
mod summary_endpoint;

pub use balance_endpoint::{panshop_balance_endpoint, wholesaler_balance_endpoint};
pub use core::{
    BalanceSummary, PartyBalance, PartyTotals, balance_for_party, party_totals,
    party_totals_in_range, summaries_for_kind,
};
pub use summary_endpoint::balance_summary_endpoint;
