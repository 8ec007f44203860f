mod core;
mod create_endpoint;
mod get_endpoint;
mod ledger;

pub use core::{Transaction, create_transaction_table};
pub use create_endpoint::{record_expense_endpoint, record_income_endpoint};
pub use get_endpoint::list_transactions_endpoint;
pub use ledger::{Movement, record_expense, record_income};
