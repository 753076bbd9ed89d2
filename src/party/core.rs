//! Defines the party data models and database queries.
//!
//! A "party" is one of the two counterparty kinds a ledger event can be
//! recorded against. Basket entries and payments reference parties by
//! `(party_type, party_id)` without a foreign key constraint; validity is
//! enforced at write time via [ensure_party_exists].

use std::fmt::Display;

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId};

/// The two kinds of counterparty in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyType {
    /// A produce wholesaler the business buys baskets from.
    Wholesaler,
    /// A pan shop the business sells baskets to.
    Panshop,
}

impl PartyType {
    /// The string stored in the `party_type` columns.
    pub fn as_str(self) -> &'static str {
        match self {
            PartyType::Wholesaler => "wholesaler",
            PartyType::Panshop => "panshop",
        }
    }
}

impl Display for PartyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PartyType::Wholesaler => "Wholesaler",
            PartyType::Panshop => "Pan shop",
        };

        write!(f, "{label}")
    }
}

impl ToSql for PartyType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PartyType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "wholesaler" => Ok(PartyType::Wholesaler),
            "panshop" => Ok(PartyType::Panshop),
            other => Err(FromSqlError::Other(
                format!("unknown party type \"{other}\"").into(),
            )),
        }
    }
}

/// A produce wholesaler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wholesaler {
    /// The ID of the wholesaler.
    pub id: DatabaseId,
    /// The wholesaler's display name.
    pub name: String,
    /// Free-form contact details.
    pub contact_info: Option<String>,
    /// The short code used to match bulk-imported rows to this wholesaler.
    ///
    /// Marks are not unique; lookups resolve duplicates to the oldest
    /// matching wholesaler.
    pub mark: Option<String>,
}

/// A pan shop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanShop {
    /// The ID of the pan shop.
    pub id: DatabaseId,
    /// The pan shop's display name.
    pub name: String,
    /// Free-form contact details.
    pub contact_info: Option<String>,
}

/// The data needed to register a new wholesaler.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWholesaler {
    /// The wholesaler's display name.
    pub name: String,
    /// Free-form contact details.
    #[serde(default)]
    pub contact_info: Option<String>,
    /// The short code used to match bulk-imported rows to this wholesaler.
    #[serde(default)]
    pub mark: Option<String>,
}

/// The data needed to register a new pan shop.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPanShop {
    /// The pan shop's display name.
    pub name: String,
    /// Free-form contact details.
    #[serde(default)]
    pub contact_info: Option<String>,
}

/// Create the wholesaler table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_wholesaler_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS wholesaler (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                contact_info TEXT,
                mark TEXT
                )",
        (),
    )?;

    Ok(())
}

/// Create the pan shop table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_pan_shop_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS pan_shop (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                contact_info TEXT
                )",
        (),
    )?;

    Ok(())
}

/// Register a new wholesaler.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyPartyName] if `name` is empty or whitespace,
/// - or [Error::SqlError] if there is an SQL error.
pub fn create_wholesaler(
    new_wholesaler: NewWholesaler,
    connection: &Connection,
) -> Result<Wholesaler, Error> {
    if new_wholesaler.name.trim().is_empty() {
        return Err(Error::EmptyPartyName);
    }

    let wholesaler = connection
        .prepare(
            "INSERT INTO wholesaler (name, contact_info, mark)
             VALUES (?1, ?2, ?3)
             RETURNING id, name, contact_info, mark",
        )?
        .query_one(
            (
                &new_wholesaler.name,
                &new_wholesaler.contact_info,
                &new_wholesaler.mark,
            ),
            map_wholesaler_row,
        )?;

    Ok(wholesaler)
}

/// Register a new pan shop.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyPartyName] if `name` is empty or whitespace,
/// - or [Error::SqlError] if there is an SQL error.
pub fn create_pan_shop(new_pan_shop: NewPanShop, connection: &Connection) -> Result<PanShop, Error> {
    if new_pan_shop.name.trim().is_empty() {
        return Err(Error::EmptyPartyName);
    }

    let pan_shop = connection
        .prepare(
            "INSERT INTO pan_shop (name, contact_info)
             VALUES (?1, ?2)
             RETURNING id, name, contact_info",
        )?
        .query_one(
            (&new_pan_shop.name, &new_pan_shop.contact_info),
            map_pan_shop_row,
        )?;

    Ok(pan_shop)
}

/// Retrieve all wholesalers in registration order.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn list_wholesalers(connection: &Connection) -> Result<Vec<Wholesaler>, Error> {
    connection
        .prepare("SELECT id, name, contact_info, mark FROM wholesaler ORDER BY id ASC")?
        .query_map([], map_wholesaler_row)?
        .map(|maybe_wholesaler| maybe_wholesaler.map_err(Error::SqlError))
        .collect()
}

/// Retrieve all pan shops in registration order.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn list_pan_shops(connection: &Connection) -> Result<Vec<PanShop>, Error> {
    connection
        .prepare("SELECT id, name, contact_info FROM pan_shop ORDER BY id ASC")?
        .query_map([], map_pan_shop_row)?
        .map(|maybe_pan_shop| maybe_pan_shop.map_err(Error::SqlError))
        .collect()
}

/// Look up a wholesaler by its mark code.
///
/// Marks are not unique; the oldest matching wholesaler wins so that
/// repeated lookups are deterministic.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn find_wholesaler_by_mark(
    mark: &str,
    connection: &Connection,
) -> Result<Option<Wholesaler>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, name, contact_info, mark FROM wholesaler
         WHERE mark = :mark ORDER BY id ASC LIMIT 1",
    )?;

    let mut rows = statement.query_map(&[(":mark", &mark)], map_wholesaler_row)?;

    match rows.next() {
        Some(wholesaler) => Ok(Some(wholesaler?)),
        None => Ok(None),
    }
}

/// The name of the party with the given reference, if it exists.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn party_name(
    party_type: PartyType,
    party_id: DatabaseId,
    connection: &Connection,
) -> Result<Option<String>, Error> {
    let query = match party_type {
        PartyType::Wholesaler => "SELECT name FROM wholesaler WHERE id = :id",
        PartyType::Panshop => "SELECT name FROM pan_shop WHERE id = :id",
    };

    let mut statement = connection.prepare(query)?;
    let mut rows = statement.query_map(&[(":id", &party_id)], |row| row.get::<_, String>(0))?;

    match rows.next() {
        Some(name) => Ok(Some(name?)),
        None => Ok(None),
    }
}

/// The name of the party with the given reference, or "Unknown".
///
/// Orphaned references are tolerated on the read path, so this never
/// fails on a missing party.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn party_name_or_unknown(
    party_type: PartyType,
    party_id: DatabaseId,
    connection: &Connection,
) -> Result<String, Error> {
    Ok(party_name(party_type, party_id, connection)?.unwrap_or_else(|| "Unknown".to_owned()))
}

/// Check that the party with the given reference exists.
///
/// This is the write-time validity check for the `(party_type, party_id)`
/// references stored on basket entries and payments.
///
/// # Errors
/// This function will return a:
/// - [Error::PartyNotFound] if the party does not exist,
/// - or [Error::SqlError] if there is an SQL error.
pub fn ensure_party_exists(
    party_type: PartyType,
    party_id: DatabaseId,
    connection: &Connection,
) -> Result<(), Error> {
    match party_name(party_type, party_id, connection)? {
        Some(_) => Ok(()),
        None => Err(Error::PartyNotFound(party_type, party_id)),
    }
}

fn map_wholesaler_row(row: &Row) -> Result<Wholesaler, rusqlite::Error> {
    Ok(Wholesaler {
        id: row.get(0)?,
        name: row.get(1)?,
        contact_info: row.get(2)?,
        mark: row.get(3)?,
    })
}

fn map_pan_shop_row(row: &Row) -> Result<PanShop, rusqlite::Error> {
    Ok(PanShop {
        id: row.get(0)?,
        name: row.get(1)?,
        contact_info: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize, party::PartyType};

    use super::{
        NewPanShop, NewWholesaler, create_pan_shop, create_wholesaler, ensure_party_exists,
        find_wholesaler_by_mark, list_wholesalers, party_name_or_unknown,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_wholesaler_succeeds() {
        let conn = get_test_connection();

        let wholesaler = create_wholesaler(
            NewWholesaler {
                name: "Sharma Produce".to_owned(),
                contact_info: Some("98765 43210".to_owned()),
                mark: Some("SH".to_owned()),
            },
            &conn,
        )
        .expect("Could not create wholesaler");

        assert!(wholesaler.id > 0);
        assert_eq!(wholesaler.name, "Sharma Produce");
        assert_eq!(wholesaler.mark.as_deref(), Some("SH"));
    }

    #[test]
    fn create_wholesaler_rejects_empty_name() {
        let conn = get_test_connection();

        let result = create_wholesaler(
            NewWholesaler {
                name: "  ".to_owned(),
                contact_info: None,
                mark: None,
            },
            &conn,
        );

        assert_eq!(result, Err(Error::EmptyPartyName));
    }

    #[test]
    fn find_wholesaler_by_mark_prefers_oldest_on_duplicates() {
        let conn = get_test_connection();
        for name in ["First Produce", "Second Produce"] {
            create_wholesaler(
                NewWholesaler {
                    name: name.to_owned(),
                    contact_info: None,
                    mark: Some("DUP".to_owned()),
                },
                &conn,
            )
            .unwrap();
        }

        let got = find_wholesaler_by_mark("DUP", &conn)
            .unwrap()
            .expect("Should find a wholesaler");

        assert_eq!(got.name, "First Produce");
    }

    #[test]
    fn find_wholesaler_by_mark_returns_none_for_unknown_mark() {
        let conn = get_test_connection();

        let got = find_wholesaler_by_mark("NOPE", &conn).unwrap();

        assert_eq!(got, None);
    }

    #[test]
    fn ensure_party_exists_rejects_orphaned_reference() {
        let conn = get_test_connection();
        let pan_shop = create_pan_shop(
            NewPanShop {
                name: "Corner Pan".to_owned(),
                contact_info: None,
            },
            &conn,
        )
        .unwrap();

        assert_eq!(ensure_party_exists(PartyType::Panshop, pan_shop.id, &conn), Ok(()));
        assert_eq!(
            ensure_party_exists(PartyType::Wholesaler, pan_shop.id, &conn),
            Err(Error::PartyNotFound(PartyType::Wholesaler, pan_shop.id))
        );
    }

    #[test]
    fn party_name_falls_back_to_unknown() {
        let conn = get_test_connection();

        let got = party_name_or_unknown(PartyType::Wholesaler, 999, &conn).unwrap();

        assert_eq!(got, "Unknown");
    }

    #[test]
    fn list_wholesalers_in_registration_order() {
        let conn = get_test_connection();
        for name in ["A Produce", "B Produce"] {
            create_wholesaler(
                NewWholesaler {
                    name: name.to_owned(),
                    contact_info: None,
                    mark: None,
                },
                &conn,
            )
            .unwrap();
        }

        let got = list_wholesalers(&conn).unwrap();

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].name, "A Produce");
        assert_eq!(got[1].name, "B Produce");
    }

    #[test]
    fn party_type_round_trips_through_sql() {
        let conn = get_test_connection();
        conn.execute(
            "CREATE TABLE party_type_test (kind TEXT NOT NULL)",
            (),
        )
        .unwrap();

        for kind in [PartyType::Wholesaler, PartyType::Panshop] {
            conn.execute("INSERT INTO party_type_test (kind) VALUES (?1)", (kind,))
                .unwrap();
        }

        let got: Vec<PartyType> = conn
            .prepare("SELECT kind FROM party_type_test ORDER BY rowid")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(got, vec![PartyType::Wholesaler, PartyType::Panshop]);
    }
}
