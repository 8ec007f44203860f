mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoints;
mod summary;

pub use core::{Account, AccountId, create_account_table, get_account};
pub use create_endpoint::create_account_endpoint;
pub use delete_endpoint::delete_account_endpoint;
pub use edit_endpoint::{edit_account_endpoint, set_account_balance_endpoint};
pub use get_endpoints::{
    get_account_endpoint, get_account_usage_endpoint, list_accounts_endpoint,
    list_accounts_with_usage_endpoint,
};
pub use summary::{get_account_statistics_endpoint, get_account_summary_endpoint};
