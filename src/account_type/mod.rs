mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoints;

pub use core::{AccountTypeId, create_account_type_table};
pub use create_endpoint::create_account_type_endpoint;
pub use delete_endpoint::delete_account_type_endpoint;
pub use edit_endpoint::edit_account_type_endpoint;
pub use get_endpoints::{
    get_account_type_endpoint, get_account_type_usage_endpoint, list_account_types_endpoint,
};
