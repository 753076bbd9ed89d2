//! Basket entry management: the ledger events recording baskets bought
//! from wholesalers and sold to pan shops.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod update_endpoint;

pub use core::{
    BasketEntry, EntryFilter, NewBasketEntry, count_basket_entries, create_basket_entry,
    create_basket_entry_table, get_basket_entry, list_basket_entries,
};
pub use create_endpoint::create_basket_entry_endpoint;
pub use delete_endpoint::delete_basket_entry_endpoint;
pub use list_endpoint::list_basket_entries_endpoint;
pub use update_endpoint::update_basket_entry_endpoint;
