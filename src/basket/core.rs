//! Defines the core data model and database queries for basket entries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{DatabaseId, EntryId},
    party::PartyType,
};

/// A ledger event: a number of baskets traded with a party on a date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasketEntry {
    /// The ID of the basket entry.
    pub id: EntryId,
    /// Which kind of party the entry was recorded against.
    pub party_type: PartyType,
    /// The ID of the party the entry was recorded against.
    ///
    /// Not enforced with a foreign key; validity is checked at write time.
    pub party_id: DatabaseId,
    /// The calendar date of the transaction.
    pub date: Date,
    /// How many baskets changed hands.
    pub basket_count: i64,
    /// The price of a single basket.
    pub price_per_basket: f64,
    /// The value of the whole entry.
    ///
    /// Equal to `basket_count * price_per_basket` at creation time, but an
    /// update may override it independently.
    pub total_price: f64,
    /// The mark code of the bulk-import batch that produced this entry, if
    /// any. Used to re-parent a whole batch at once.
    pub mark: Option<String>,
}

/// The data needed to record a new basket entry.
///
/// `total_price` is always derived here; overriding it is only possible
/// through an update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBasketEntry {
    /// Which kind of party the entry is recorded against.
    pub party_type: PartyType,
    /// The ID of the party the entry is recorded against.
    pub party_id: DatabaseId,
    /// The calendar date of the transaction.
    pub date: Date,
    /// How many baskets changed hands.
    pub basket_count: i64,
    /// The price of a single basket.
    pub price_per_basket: f64,
    /// The mark code to group this entry under, if any.
    pub mark: Option<String>,
}

/// Filters for listing basket entries. `None` fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryFilter {
    /// Only match entries recorded against this kind of party.
    pub party_type: Option<PartyType>,
    /// Only match entries recorded against this party ID.
    pub party_id: Option<DatabaseId>,
    /// Only match entries dated exactly this date.
    pub date: Option<Date>,
}

/// Create the basket entry table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_basket_entry_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS basket_entry (
                id INTEGER PRIMARY KEY,
                party_type TEXT NOT NULL,
                party_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                basket_count INTEGER NOT NULL,
                price_per_basket REAL NOT NULL,
                total_price REAL NOT NULL,
                mark TEXT
                )",
        (),
    )?;

    // Composite index used by the ledger aggregation queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_basket_entry_party
         ON basket_entry(party_type, party_id)",
        (),
    )?;

    // Index used by the daily flow report.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_basket_entry_date ON basket_entry(date)",
        (),
    )?;

    Ok(())
}

/// Record a new basket entry.
///
/// The entry's `total_price` is computed as
/// `basket_count * price_per_basket`.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn create_basket_entry(
    new_entry: NewBasketEntry,
    connection: &Connection,
) -> Result<BasketEntry, Error> {
    let total_price = new_entry.basket_count as f64 * new_entry.price_per_basket;

    let entry = connection
        .prepare(
            "INSERT INTO basket_entry
             (party_type, party_id, date, basket_count, price_per_basket, total_price, mark)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, party_type, party_id, date, basket_count, price_per_basket,
                       total_price, mark",
        )?
        .query_one(
            (
                new_entry.party_type,
                new_entry.party_id,
                new_entry.date,
                new_entry.basket_count,
                new_entry.price_per_basket,
                total_price,
                new_entry.mark,
            ),
            map_entry_row,
        )?;

    Ok(entry)
}

/// Retrieve a basket entry from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid entry,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_basket_entry(id: EntryId, connection: &Connection) -> Result<BasketEntry, Error> {
    let entry = connection
        .prepare(
            "SELECT id, party_type, party_id, date, basket_count, price_per_basket,
                    total_price, mark
             FROM basket_entry WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_entry_row)?;

    Ok(entry)
}

/// Count the basket entries matching `filter`.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn count_basket_entries(filter: &EntryFilter, connection: &Connection) -> Result<u64, Error> {
    let count = connection
        .prepare(
            "SELECT COUNT(id) FROM basket_entry
             WHERE (:party_type IS NULL OR party_type = :party_type)
               AND (:party_id IS NULL OR party_id = :party_id)
               AND (:date IS NULL OR date = :date)",
        )?
        .query_one(
            rusqlite::named_params! {
                ":party_type": filter.party_type,
                ":party_id": filter.party_id,
                ":date": filter.date,
            },
            |row| Ok(row.get::<_, i64>(0)? as u64),
        )?;

    Ok(count)
}

/// Retrieve a page of basket entries matching `filter`, newest first
/// (date, then ID, descending).
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn list_basket_entries(
    filter: &EntryFilter,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<BasketEntry>, Error> {
    connection
        .prepare(
            "SELECT id, party_type, party_id, date, basket_count, price_per_basket,
                    total_price, mark
             FROM basket_entry
             WHERE (:party_type IS NULL OR party_type = :party_type)
               AND (:party_id IS NULL OR party_id = :party_id)
               AND (:date IS NULL OR date = :date)
             ORDER BY date DESC, id DESC
             LIMIT :limit OFFSET :offset",
        )?
        .query_map(
            rusqlite::named_params! {
                ":party_type": filter.party_type,
                ":party_id": filter.party_id,
                ":date": filter.date,
                ":limit": limit as i64,
                ":offset": offset as i64,
            },
            map_entry_row,
        )?
        .map(|maybe_entry| maybe_entry.map_err(Error::SqlError))
        .collect()
}

/// Map a database row to a [BasketEntry].
pub(crate) fn map_entry_row(row: &Row) -> Result<BasketEntry, rusqlite::Error> {
    Ok(BasketEntry {
        id: row.get(0)?,
        party_type: row.get(1)?,
        party_id: row.get(2)?,
        date: row.get(3)?,
        basket_count: row.get(4)?,
        price_per_basket: row.get(5)?,
        total_price: row.get(6)?,
        mark: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, db::initialize, party::PartyType};

    use super::{
        EntryFilter, NewBasketEntry, count_basket_entries, create_basket_entry, get_basket_entry,
        list_basket_entries,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_entry(party_type: PartyType, party_id: i64, date: time::Date) -> NewBasketEntry {
        NewBasketEntry {
            party_type,
            party_id,
            date,
            basket_count: 4,
            price_per_basket: 25.0,
            mark: None,
        }
    }

    #[test]
    fn create_computes_total_price() {
        let conn = get_test_connection();

        let entry = create_basket_entry(
            new_entry(PartyType::Wholesaler, 1, date!(2025 - 06 - 01)),
            &conn,
        )
        .expect("Could not create basket entry");

        assert_eq!(entry.total_price, 100.0);
        assert_eq!(entry.basket_count, 4);
        assert_eq!(entry.price_per_basket, 25.0);
    }

    #[test]
    fn get_returns_created_entry() {
        let conn = get_test_connection();
        let want = create_basket_entry(
            new_entry(PartyType::Panshop, 3, date!(2025 - 06 - 02)),
            &conn,
        )
        .unwrap();

        let got = get_basket_entry(want.id, &conn).unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn get_fails_on_invalid_id() {
        let conn = get_test_connection();

        let got = get_basket_entry(404, &conn);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn list_filters_by_party() {
        let conn = get_test_connection();
        create_basket_entry(
            new_entry(PartyType::Wholesaler, 1, date!(2025 - 06 - 01)),
            &conn,
        )
        .unwrap();
        create_basket_entry(
            new_entry(PartyType::Wholesaler, 2, date!(2025 - 06 - 02)),
            &conn,
        )
        .unwrap();
        create_basket_entry(
            new_entry(PartyType::Panshop, 1, date!(2025 - 06 - 03)),
            &conn,
        )
        .unwrap();

        let filter = EntryFilter {
            party_type: Some(PartyType::Wholesaler),
            party_id: Some(1),
            date: None,
        };
        let got = list_basket_entries(&filter, 10, 0, &conn).unwrap();

        assert_eq!(got.len(), 1, "want 1 entry, got {}", got.len());
        assert_eq!(got[0].party_id, 1);
        assert_eq!(count_basket_entries(&filter, &conn).unwrap(), 1);
    }

    #[test]
    fn list_orders_newest_first_and_paginates() {
        let conn = get_test_connection();
        for day in 1..=5 {
            create_basket_entry(
                new_entry(PartyType::Wholesaler, 1, date!(2025 - 06 - 01) + time::Duration::days(day)),
                &conn,
            )
            .unwrap();
        }

        let filter = EntryFilter::default();
        let first_page = list_basket_entries(&filter, 2, 0, &conn).unwrap();
        let second_page = list_basket_entries(&filter, 2, 2, &conn).unwrap();

        assert_eq!(first_page.len(), 2);
        assert_eq!(first_page[0].date, date!(2025 - 06 - 06));
        assert_eq!(first_page[1].date, date!(2025 - 06 - 05));
        assert_eq!(second_page[0].date, date!(2025 - 06 - 04));
    }

    #[test]
    fn same_day_entries_order_by_id_descending() {
        let conn = get_test_connection();
        let day = date!(2025 - 06 - 01);
        let first = create_basket_entry(new_entry(PartyType::Wholesaler, 1, day), &conn).unwrap();
        let second = create_basket_entry(new_entry(PartyType::Wholesaler, 1, day), &conn).unwrap();

        let got = list_basket_entries(&EntryFilter::default(), 10, 0, &conn).unwrap();

        assert_eq!(got[0].id, second.id);
        assert_eq!(got[1].id, first.id);
    }
}
