//! Database schema initialization.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    basket::create_basket_entry_table,
    party::{create_pan_shop_table, create_wholesaler_table},
    payment::create_payment_table,
};

/// Create the application tables if they do not already exist.
///
/// All tables are created within a single exclusive transaction so that a
/// half-initialized schema is never visible to other connections.
///
/// # Errors
/// Returns an [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_wholesaler_table(&transaction)?;
    create_pan_shop_table(&transaction)?;
    create_basket_entry_table(&transaction)?;
    create_payment_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
