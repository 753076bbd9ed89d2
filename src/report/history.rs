//! Bounded transaction history for a single party.

use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    database_id::DatabaseId,
    ledger::party_totals_in_range,
    party::PartyType,
    payment::PaymentMode,
};

/// A basket entry as it appears in a history report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryBasket {
    /// The calendar date of the transaction.
    pub date: Date,
    /// How many baskets changed hands.
    pub basket_count: i64,
    /// The price of a single basket.
    pub price_per_basket: f64,
    /// The value of the whole entry.
    pub total_price: f64,
    /// The mark code of the bulk-import batch, if any.
    pub mark: Option<String>,
}

/// A payment as it appears in a history report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPayment {
    /// The calendar date of the payment.
    pub date: Date,
    /// The amount paid.
    pub amount: f64,
    /// How the payment was made.
    pub payment_mode: PaymentMode,
    /// The receiving UPI account, populated for UPI payments.
    pub upi_account: Option<String>,
    /// A free-form note.
    pub note: Option<String>,
}

/// The range-scoped totals accompanying a history report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    /// The summed basket value within the range.
    pub total_basket_value: f64,
    /// The summed payments within the range.
    pub total_paid: f64,
    /// Basket value minus payments, within the range.
    pub balance: f64,
}

/// Everything that happened with one party over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionHistory {
    /// The basket entries in the range, oldest first.
    pub baskets: Vec<HistoryBasket>,
    /// The payments in the range, oldest first.
    pub payments: Vec<HistoryPayment>,
    /// The range-scoped totals.
    pub summary: HistorySummary,
}

/// Fetch one party's basket entries and payments within `[start, end]`
/// plus the range-scoped totals.
///
/// A range with no transactions yields empty lists and a zeroed summary,
/// not an error.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn transaction_history(
    party_type: PartyType,
    party_id: DatabaseId,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<TransactionHistory, Error> {
    let baskets = connection
        .prepare(
            "SELECT date, basket_count, price_per_basket, total_price, mark
             FROM basket_entry
             WHERE party_type = :party_type AND party_id = :party_id
               AND date BETWEEN :start AND :end
             ORDER BY date ASC, id ASC",
        )?
        .query_map(
            rusqlite::named_params! {
                ":party_type": party_type,
                ":party_id": party_id,
                ":start": start,
                ":end": end,
            },
            |row| {
                Ok(HistoryBasket {
                    date: row.get(0)?,
                    basket_count: row.get(1)?,
                    price_per_basket: row.get(2)?,
                    total_price: row.get(3)?,
                    mark: row.get(4)?,
                })
            },
        )?
        .map(|maybe_basket| maybe_basket.map_err(Error::SqlError))
        .collect::<Result<Vec<_>, _>>()?;

    let payments = connection
        .prepare(
            "SELECT date, amount, payment_mode, upi_account, note
             FROM payment
             WHERE party_type = :party_type AND party_id = :party_id
               AND date BETWEEN :start AND :end
             ORDER BY date ASC, id ASC",
        )?
        .query_map(
            rusqlite::named_params! {
                ":party_type": party_type,
                ":party_id": party_id,
                ":start": start,
                ":end": end,
            },
            |row| {
                Ok(HistoryPayment {
                    date: row.get(0)?,
                    amount: row.get(1)?,
                    payment_mode: row.get(2)?,
                    upi_account: row.get(3)?,
                    note: row.get(4)?,
                })
            },
        )?
        .map(|maybe_payment| maybe_payment.map_err(Error::SqlError))
        .collect::<Result<Vec<_>, _>>()?;

    let totals = party_totals_in_range(party_type, party_id, start, end, connection)?;

    Ok(TransactionHistory {
        baskets,
        payments,
        summary: HistorySummary {
            total_basket_value: totals.total_basket_value,
            total_paid: totals.total_paid,
            balance: totals.balance(),
        },
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        basket::{NewBasketEntry, create_basket_entry},
        db::initialize,
        party::PartyType,
        payment::{NewPayment, PaymentMode, create_payment},
    };

    use super::transaction_history;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert_entry(conn: &Connection, party_id: i64, total: f64, date: time::Date) {
        create_basket_entry(
            NewBasketEntry {
                party_type: PartyType::Wholesaler,
                party_id,
                date,
                basket_count: 1,
                price_per_basket: total,
                mark: None,
            },
            conn,
        )
        .unwrap();
    }

    fn insert_payment(conn: &Connection, party_id: i64, amount: f64, date: time::Date) {
        create_payment(
            NewPayment {
                party_type: PartyType::Wholesaler,
                party_id,
                amount,
                date,
                note: Some("settlement".to_owned()),
                payment_mode: PaymentMode::Upi,
                upi_account: Some("shop@upi".to_owned()),
            },
            conn,
        )
        .unwrap();
    }

    #[test]
    fn returns_rows_and_summary_within_range() {
        let conn = get_test_connection();
        insert_entry(&conn, 1, 100.0, date!(2025 - 06 - 01));
        insert_entry(&conn, 1, 200.0, date!(2025 - 06 - 05));
        insert_entry(&conn, 1, 400.0, date!(2025 - 07 - 01));
        insert_payment(&conn, 1, 150.0, date!(2025 - 06 - 03));

        let got = transaction_history(
            PartyType::Wholesaler,
            1,
            date!(2025 - 06 - 01),
            date!(2025 - 06 - 30),
            &conn,
        )
        .unwrap();

        assert_eq!(got.baskets.len(), 2, "the July entry is out of range");
        assert_eq!(got.payments.len(), 1);
        assert_eq!(got.summary.total_basket_value, 300.0);
        assert_eq!(got.summary.total_paid, 150.0);
        assert_eq!(got.summary.balance, 150.0);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let conn = get_test_connection();
        let day = date!(2025 - 06 - 15);
        insert_entry(&conn, 1, 100.0, day);

        let got = transaction_history(PartyType::Wholesaler, 1, day, day, &conn).unwrap();

        assert_eq!(got.baskets.len(), 1);
    }

    #[test]
    fn empty_range_yields_zero_summary_not_an_error() {
        let conn = get_test_connection();
        let day = date!(2025 - 06 - 15);

        let got = transaction_history(PartyType::Wholesaler, 1, day, day, &conn).unwrap();

        assert!(got.baskets.is_empty());
        assert!(got.payments.is_empty());
        assert_eq!(got.summary.total_basket_value, 0.0);
        assert_eq!(got.summary.total_paid, 0.0);
        assert_eq!(got.summary.balance, 0.0);
    }

    #[test]
    fn other_parties_are_excluded() {
        let conn = get_test_connection();
        let day = date!(2025 - 06 - 15);
        insert_entry(&conn, 1, 100.0, day);
        insert_entry(&conn, 2, 999.0, day);

        let got = transaction_history(PartyType::Wholesaler, 1, day, day, &conn).unwrap();

        assert_eq!(got.baskets.len(), 1);
        assert_eq!(got.summary.total_basket_value, 100.0);
    }
}
