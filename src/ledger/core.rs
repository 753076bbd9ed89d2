//! Balance computation for single parties and whole party kinds.

use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    database_id::DatabaseId,
    party::{PartyType, party_name_or_unknown},
};

/// The two sums a party's balance is derived from.
///
/// Parties with no recorded activity have zeroed totals; "no rows" is not
/// an error anywhere in the aggregator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartyTotals {
    /// The summed value of the party's basket entries.
    pub total_basket_value: f64,
    /// The summed value of the party's payments.
    pub total_paid: f64,
}

impl PartyTotals {
    /// Basket value owed minus payments made.
    pub fn balance(&self) -> f64 {
        self.total_basket_value - self.total_paid
    }
}

/// A party's balance as served by the per-party balance endpoints.
///
/// The payment sum is keyed `total_paid` for wholesalers and
/// `total_received` for pan shops; only one of the two fields is ever
/// populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyBalance {
    /// Which kind of party the balance belongs to.
    pub party_type: PartyType,
    /// The ID of the party.
    pub party_id: DatabaseId,
    /// The party's name, or "Unknown" for orphaned references.
    pub party_name: String,
    /// The summed value of the party's basket entries.
    pub total_basket_value: f64,
    /// The summed payments, for wholesalers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_paid: Option<f64>,
    /// The summed payments, for pan shops.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_received: Option<f64>,
    /// Basket value minus payments.
    pub balance: f64,
}

/// One row of the per-kind balance summary listing.
///
/// Unlike [PartyBalance], the payment sum is keyed `total_paid` for both
/// party kinds here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSummary {
    /// The ID of the party.
    pub party_id: DatabaseId,
    /// Which kind of party the summary belongs to.
    pub party_type: PartyType,
    /// The party's name.
    pub party_name: String,
    /// The summed value of the party's basket entries.
    pub total_basket_value: f64,
    /// The summed value of the party's payments.
    pub total_paid: f64,
    /// Basket value minus payments.
    pub balance: f64,
}

/// Compute the all-time totals for one party.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn party_totals(
    party_type: PartyType,
    party_id: DatabaseId,
    connection: &Connection,
) -> Result<PartyTotals, Error> {
    let totals = connection
        .prepare(
            "SELECT
                COALESCE((SELECT SUM(total_price) FROM basket_entry
                          WHERE party_type = :party_type AND party_id = :party_id), 0),
                COALESCE((SELECT SUM(amount) FROM payment
                          WHERE party_type = :party_type AND party_id = :party_id), 0)",
        )?
        .query_one(
            rusqlite::named_params! {
                ":party_type": party_type,
                ":party_id": party_id,
            },
            |row| {
                Ok(PartyTotals {
                    total_basket_value: row.get(0)?,
                    total_paid: row.get(1)?,
                })
            },
        )?;

    Ok(totals)
}

/// Compute the totals for one party over an inclusive date range.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn party_totals_in_range(
    party_type: PartyType,
    party_id: DatabaseId,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<PartyTotals, Error> {
    let totals = connection
        .prepare(
            "SELECT
                COALESCE((SELECT SUM(total_price) FROM basket_entry
                          WHERE party_type = :party_type AND party_id = :party_id
                            AND date BETWEEN :start AND :end), 0),
                COALESCE((SELECT SUM(amount) FROM payment
                          WHERE party_type = :party_type AND party_id = :party_id
                            AND date BETWEEN :start AND :end), 0)",
        )?
        .query_one(
            rusqlite::named_params! {
                ":party_type": party_type,
                ":party_id": party_id,
                ":start": start,
                ":end": end,
            },
            |row| {
                Ok(PartyTotals {
                    total_basket_value: row.get(0)?,
                    total_paid: row.get(1)?,
                })
            },
        )?;

    Ok(totals)
}

/// Compute a party's balance for the per-party balance endpoints.
///
/// An unknown `party_id` yields zeroed totals with the name "Unknown"
/// rather than an error; the balance endpoints tolerate orphaned
/// references by design.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn balance_for_party(
    party_type: PartyType,
    party_id: DatabaseId,
    connection: &Connection,
) -> Result<PartyBalance, Error> {
    let party_name = party_name_or_unknown(party_type, party_id, connection)?;
    let totals = party_totals(party_type, party_id, connection)?;

    let (total_paid, total_received) = match party_type {
        PartyType::Wholesaler => (Some(totals.total_paid), None),
        PartyType::Panshop => (None, Some(totals.total_paid)),
    };

    Ok(PartyBalance {
        party_type,
        party_id,
        party_name,
        total_basket_value: totals.total_basket_value,
        total_paid,
        total_received,
        balance: totals.balance(),
    })
}

/// Compute a balance summary for every party of a kind in a single store
/// round trip.
///
/// Rows come back in registration order; parties without any recorded
/// activity appear with zeroed totals.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn summaries_for_kind(
    party_type: PartyType,
    connection: &Connection,
) -> Result<Vec<BalanceSummary>, Error> {
    let party_table = match party_type {
        PartyType::Wholesaler => "wholesaler",
        PartyType::Panshop => "pan_shop",
    };

    let query = format!(
        "SELECT party.id, party.name,
            COALESCE((SELECT SUM(total_price) FROM basket_entry
                      WHERE party_type = :party_type AND party_id = party.id), 0),
            COALESCE((SELECT SUM(amount) FROM payment
                      WHERE party_type = :party_type AND party_id = party.id), 0)
         FROM {party_table} AS party
         ORDER BY party.id ASC"
    );

    connection
        .prepare(&query)?
        .query_map(
            rusqlite::named_params! { ":party_type": party_type },
            |row| {
                let total_basket_value: f64 = row.get(2)?;
                let total_paid: f64 = row.get(3)?;

                Ok(BalanceSummary {
                    party_id: row.get(0)?,
                    party_type,
                    party_name: row.get(1)?,
                    total_basket_value,
                    total_paid,
                    balance: total_basket_value - total_paid,
                })
            },
        )?
        .map(|maybe_summary| maybe_summary.map_err(Error::SqlError))
        .collect()
}
