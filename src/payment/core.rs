//! Defines the core data model and database queries for payments.

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{DatabaseId, PaymentId},
    party::PartyType,
};

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// Physical cash.
    Cash,
    /// A UPI transfer.
    Upi,
}

impl PaymentMode {
    /// The string stored in the `payment_mode` column.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Upi => "upi",
        }
    }
}

impl ToSql for PaymentMode {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PaymentMode {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "cash" => Ok(PaymentMode::Cash),
            "upi" => Ok(PaymentMode::Upi),
            other => Err(FromSqlError::Other(
                format!("unknown payment mode \"{other}\"").into(),
            )),
        }
    }
}

/// A cash event: money moved from a party to the business.
///
/// The sign convention is uniform for both party kinds: a positive
/// `amount` is money received by the business.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    /// The ID of the payment.
    pub id: PaymentId,
    /// Which kind of party made the payment.
    pub party_type: PartyType,
    /// The ID of the party that made the payment.
    ///
    /// Not enforced with a foreign key; validity is checked at write time.
    pub party_id: DatabaseId,
    /// The amount paid.
    pub amount: f64,
    /// The calendar date of the payment.
    pub date: Date,
    /// A free-form note.
    pub note: Option<String>,
    /// How the payment was made.
    pub payment_mode: PaymentMode,
    /// The receiving UPI account, populated for UPI payments.
    pub upi_account: Option<String>,
}

/// The data needed to record a new payment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    /// Which kind of party made the payment.
    pub party_type: PartyType,
    /// The ID of the party that made the payment.
    pub party_id: DatabaseId,
    /// The amount paid.
    pub amount: f64,
    /// The calendar date of the payment.
    pub date: Date,
    /// A free-form note.
    pub note: Option<String>,
    /// How the payment was made.
    pub payment_mode: PaymentMode,
    /// The receiving UPI account, populated for UPI payments.
    pub upi_account: Option<String>,
}

/// A payment row as returned by the listing, with the payer's name
/// resolved leniently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentListItem {
    /// The ID of the payment.
    pub id: PaymentId,
    /// Which kind of party made the payment.
    pub party_type: PartyType,
    /// The ID of the party that made the payment.
    pub party_id: DatabaseId,
    /// The payer's name, or "Unknown" for orphaned references.
    pub party_name: String,
    /// The amount paid.
    pub amount: f64,
    /// The calendar date of the payment.
    pub date: Date,
    /// A free-form note.
    pub note: Option<String>,
    /// How the payment was made.
    pub payment_mode: PaymentMode,
    /// The receiving UPI account, populated for UPI payments.
    pub upi_account: Option<String>,
}

/// Create the payment table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_payment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS payment (
                id INTEGER PRIMARY KEY,
                party_type TEXT NOT NULL,
                party_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                note TEXT,
                payment_mode TEXT NOT NULL,
                upi_account TEXT
                )",
        (),
    )?;

    // Composite index used by the ledger aggregation queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_payment_party ON payment(party_type, party_id)",
        (),
    )?;

    Ok(())
}

/// Record a new payment.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_payment(new_payment: NewPayment, connection: &Connection) -> Result<Payment, Error> {
    let payment = connection
        .prepare(
            "INSERT INTO payment
             (party_type, party_id, amount, date, note, payment_mode, upi_account)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, party_type, party_id, amount, date, note, payment_mode, upi_account",
        )?
        .query_one(
            (
                new_payment.party_type,
                new_payment.party_id,
                new_payment.amount,
                new_payment.date,
                new_payment.note,
                new_payment.payment_mode,
                new_payment.upi_account,
            ),
            map_payment_row,
        )?;

    Ok(payment)
}

/// Retrieve payments, newest first, optionally filtered by party.
///
/// Each row carries the payer's name; orphaned references resolve to
/// "Unknown" rather than failing.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn list_payments(
    party_type: Option<PartyType>,
    party_id: Option<DatabaseId>,
    connection: &Connection,
) -> Result<Vec<PaymentListItem>, Error> {
    connection
        .prepare(
            "SELECT p.id, p.party_type, p.party_id,
                    COALESCE(w.name, s.name, 'Unknown') AS party_name,
                    p.amount, p.date, p.note, p.payment_mode, p.upi_account
             FROM payment p
             LEFT JOIN wholesaler w ON p.party_type = 'wholesaler' AND w.id = p.party_id
             LEFT JOIN pan_shop s ON p.party_type = 'panshop' AND s.id = p.party_id
             WHERE (:party_type IS NULL OR p.party_type = :party_type)
               AND (:party_id IS NULL OR p.party_id = :party_id)
             ORDER BY p.date DESC, p.id DESC",
        )?
        .query_map(
            rusqlite::named_params! {
                ":party_type": party_type,
                ":party_id": party_id,
            },
            |row| {
                Ok(PaymentListItem {
                    id: row.get(0)?,
                    party_type: row.get(1)?,
                    party_id: row.get(2)?,
                    party_name: row.get(3)?,
                    amount: row.get(4)?,
                    date: row.get(5)?,
                    note: row.get(6)?,
                    payment_mode: row.get(7)?,
                    upi_account: row.get(8)?,
                })
            },
        )?
        .map(|maybe_payment| maybe_payment.map_err(Error::SqlError))
        .collect()
}

/// Map a database row to a [Payment].
pub(crate) fn map_payment_row(row: &Row) -> Result<Payment, rusqlite::Error> {
    Ok(Payment {
        id: row.get(0)?,
        party_type: row.get(1)?,
        party_id: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
        note: row.get(5)?,
        payment_mode: row.get(6)?,
        upi_account: row.get(7)?,
    })
}
