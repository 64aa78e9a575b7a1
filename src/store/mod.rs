// Store module entry
// In-memory Accounts table with containment children

mod accounts;
mod types;

pub use accounts::AccountStore;
pub use types::{Account, PaymentInstrument, StoreError};
