mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoints;

pub use core::{CategoryId, create_category_table, get_category};
pub use create_endpoint::create_category_endpoint;
pub use delete_endpoint::delete_category_endpoint;
pub use edit_endpoint::edit_category_endpoint;
pub use get_endpoints::{
    get_category_endpoint, get_category_statistics_endpoint, get_category_usage_endpoint,
    list_categories_by_kind_endpoint, list_categories_endpoint,
};
