//! Dashboard aggregation: summary cards, top-due listings and the
//! daily/monthly flow series.

use std::collections::HashMap;

use rusqlite::Connection;
use serde::Serialize;
use time::{Date, Month};

use crate::{
    Error,
    ledger::summaries_for_kind,
    party::PartyType,
};

/// How many parties the top-due listings show.
const TOP_PARTY_COUNT: usize = 5;

/// How many distinct dates each side of the daily flow series covers.
const DAILY_FLOW_DATE_LIMIT: u32 = 30;

/// How many distinct months each side of the payment trend covers.
const MONTHLY_TREND_LIMIT: u32 = 12;

/// The whole dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// The summed value of every basket entry.
    pub total_basket_value: f64,
    /// The summed value of every payment.
    pub total_paid: f64,
    /// Grand basket value minus grand payments.
    pub total_due: f64,
    /// How many basket entries and payments exist in total.
    pub total_transactions: u64,
    /// The five wholesalers owed the most, highest first.
    pub top_wholesaler_dues: Vec<PartyDue>,
    /// The five pan shops owing the most, highest first.
    pub top_panshop_balances: Vec<PartyStanding>,
    /// Baskets in from wholesalers and out to pan shops, per date.
    pub daily_basket: Vec<DailyBasketFlow>,
    /// Payments in from pan shops and out to wholesalers, per month.
    pub monthly_payments: Vec<MonthlyPayments>,
}

/// One row of the top wholesaler listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyDue {
    /// The wholesaler's name.
    pub name: String,
    /// How much the business owes them.
    pub due: f64,
}

/// One row of the top pan shop listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyStanding {
    /// The pan shop's name.
    pub name: String,
    /// How much they owe the business.
    pub balance: f64,
}

/// Basket counts for one date of the daily flow series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBasketFlow {
    /// The date the baskets moved.
    pub date: Date,
    /// Baskets bought from wholesalers.
    pub inflow: i64,
    /// Baskets sold to pan shops.
    pub outflow: i64,
}

/// Payment sums for one month of the payment trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPayments {
    /// A three-letter month label, e.g. "Jun".
    pub month: String,
    /// Payments received from pan shops.
    pub incoming: f64,
    /// Payments made to wholesalers.
    pub outgoing: f64,
}

/// Build the dashboard summary.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn dashboard_summary(connection: &Connection) -> Result<DashboardSummary, Error> {
    let (total_basket_value, total_paid, total_transactions) = grand_totals(connection)?;

    let top_wholesaler_dues = top_balances(PartyType::Wholesaler, connection)?
        .into_iter()
        .map(|(name, balance)| PartyDue { name, due: balance })
        .collect();

    let top_panshop_balances = top_balances(PartyType::Panshop, connection)?
        .into_iter()
        .map(|(name, balance)| PartyStanding { name, balance })
        .collect();

    Ok(DashboardSummary {
        total_basket_value,
        total_paid,
        total_due: total_basket_value - total_paid,
        total_transactions,
        top_wholesaler_dues,
        top_panshop_balances,
        daily_basket: daily_basket_flow(connection)?,
        monthly_payments: monthly_payment_trend(connection)?,
    })
}

fn grand_totals(connection: &Connection) -> Result<(f64, f64, u64), Error> {
    let totals = connection
        .prepare(
            "SELECT
                COALESCE((SELECT SUM(total_price) FROM basket_entry), 0),
                COALESCE((SELECT SUM(amount) FROM payment), 0),
                (SELECT COUNT(id) FROM basket_entry) + (SELECT COUNT(id) FROM payment)",
        )?
        .query_one([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get::<_, i64>(2)? as u64))
        })?;

    Ok(totals)
}

/// The names and balances of the parties of a kind with the highest
/// balances, highest first.
///
/// Ties keep the store's iteration order; the sort is stable.
fn top_balances(
    party_type: PartyType,
    connection: &Connection,
) -> Result<Vec<(String, f64)>, Error> {
    let mut summaries = summaries_for_kind(party_type, connection)?;

    summaries.sort_by(|a, b| {
        b.balance
            .partial_cmp(&a.balance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries.truncate(TOP_PARTY_COUNT);

    Ok(summaries
        .into_iter()
        .map(|summary| (summary.party_name, summary.balance))
        .collect())
}

/// The merged inflow/outflow series, ascending by date.
///
/// Each side is independently limited to its last
/// [DAILY_FLOW_DATE_LIMIT] distinct dates with data *before* the union,
/// so the merged series can reach further back on one side than the
/// other when activity does not overlap.
fn daily_basket_flow(connection: &Connection) -> Result<Vec<DailyBasketFlow>, Error> {
    let inflow = daily_basket_totals(PartyType::Wholesaler, connection)?;
    let outflow = daily_basket_totals(PartyType::Panshop, connection)?;

    let mut dates: Vec<Date> = inflow.keys().chain(outflow.keys()).copied().collect();
    dates.sort();
    dates.dedup();

    Ok(dates
        .into_iter()
        .map(|date| DailyBasketFlow {
            date,
            inflow: inflow.get(&date).copied().unwrap_or(0),
            outflow: outflow.get(&date).copied().unwrap_or(0),
        })
        .collect())
}

fn daily_basket_totals(
    party_type: PartyType,
    connection: &Connection,
) -> Result<HashMap<Date, i64>, Error> {
    connection
        .prepare(
            "SELECT date, SUM(basket_count) FROM basket_entry
             WHERE party_type = :party_type
             GROUP BY date
             ORDER BY date DESC
             LIMIT :limit",
        )?
        .query_map(
            rusqlite::named_params! {
                ":party_type": party_type,
                ":limit": DAILY_FLOW_DATE_LIMIT,
            },
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?
        .map(|maybe_row| maybe_row.map_err(Error::SqlError))
        .collect()
}

/// The merged incoming/outgoing payment series, ascending by month.
///
/// Incoming is money from pan shops, outgoing is money to wholesalers.
/// The per-side last-12-months window is applied before the union, like
/// the daily series.
fn monthly_payment_trend(connection: &Connection) -> Result<Vec<MonthlyPayments>, Error> {
    let incoming = monthly_payment_totals(PartyType::Panshop, connection)?;
    let outgoing = monthly_payment_totals(PartyType::Wholesaler, connection)?;

    let mut months: Vec<Date> = incoming.keys().chain(outgoing.keys()).copied().collect();
    months.sort();
    months.dedup();

    Ok(months
        .into_iter()
        .map(|month_start| MonthlyPayments {
            month: month_label(month_start).to_owned(),
            incoming: incoming.get(&month_start).copied().unwrap_or(0.0),
            outgoing: outgoing.get(&month_start).copied().unwrap_or(0.0),
        })
        .collect())
}

/// Monthly payment sums for one party kind, keyed by the first day of
/// each month.
fn monthly_payment_totals(
    party_type: PartyType,
    connection: &Connection,
) -> Result<HashMap<Date, f64>, Error> {
    let rows: Vec<(String, f64)> = connection
        .prepare(
            "SELECT SUBSTR(date, 1, 7) AS month, SUM(amount) FROM payment
             WHERE party_type = :party_type
             GROUP BY month
             ORDER BY month DESC
             LIMIT :limit",
        )?
        .query_map(
            rusqlite::named_params! {
                ":party_type": party_type,
                ":limit": MONTHLY_TREND_LIMIT,
            },
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?
        .map(|maybe_row| maybe_row.map_err(Error::SqlError))
        .collect::<Result<_, _>>()?;

    let mut totals = HashMap::new();

    for (month_key, total) in rows {
        let month_start = month_start_from_key(&month_key)
            .ok_or_else(|| Error::InvalidDate(month_key.clone()))?;
        totals.insert(month_start, total);
    }

    Ok(totals)
}

/// Parse a `YYYY-MM` key (the ISO date prefix the store groups by) into
/// the first day of that month.
fn month_start_from_key(key: &str) -> Option<Date> {
    let (year, month_number) = key.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month = Month::try_from(month_number.parse::<u8>().ok()?).ok()?;

    Date::from_calendar_date(year, month, 1).ok()
}

/// A month as a three-letter label.
fn month_label(date: Date) -> &'static str {
    match date.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
