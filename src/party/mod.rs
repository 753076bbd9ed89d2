//! Party management: the wholesalers and pan shops that basket
//! transactions and payments are recorded against.

mod core;
mod create_endpoint;
mod list_endpoint;

pub use core::{
    NewPanShop, NewWholesaler, PanShop, PartyType, Wholesaler, create_pan_shop,
    create_pan_shop_table, create_wholesaler, create_wholesaler_table, ensure_party_exists,
    find_wholesaler_by_mark, list_pan_shops, list_wholesalers, party_name, party_name_or_unknown,
};
pub use create_endpoint::{create_pan_shop_endpoint, create_wholesaler_endpoint};
pub use list_endpoint::{list_pan_shops_endpoint, list_wholesalers_endpoint};
