//! Payment management: the cash events recorded against parties.

mod core;
mod create_endpoint;
mod list_endpoint;

pub use core::{
    NewPayment, Payment, PaymentListItem, PaymentMode, create_payment, create_payment_table,
    list_payments,
};
pub use create_endpoint::create_payment_endpoint;
pub use list_endpoint::list_payments_endpoint;
