//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, edit_account_endpoint,
        get_account_endpoint, get_account_statistics_endpoint, get_account_summary_endpoint,
        get_account_usage_endpoint, list_accounts_endpoint, list_accounts_with_usage_endpoint,
        set_account_balance_endpoint,
    },
    account_type::{
        create_account_type_endpoint, delete_account_type_endpoint, edit_account_type_endpoint,
        get_account_type_endpoint, get_account_type_usage_endpoint, list_account_types_endpoint,
    },
    auth::auth_guard,
    budget::{create_budget_endpoint, list_budgets_endpoint},
    category::{
        create_category_endpoint, delete_category_endpoint, edit_category_endpoint,
        get_category_endpoint, get_category_statistics_endpoint, get_category_usage_endpoint,
        list_categories_by_kind_endpoint, list_categories_endpoint,
    },
    endpoints,
    log_in::log_in_endpoint,
    register_user::register_user_endpoint,
    transaction::{list_transactions_endpoint, record_expense_endpoint, record_income_endpoint},
    user::{delete_current_user_endpoint, get_profile_endpoint},
};

/// Return a router with all the app's routes.
///
/// Every route except log in and registration requires a valid bearer token.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(endpoints::USERS, post(register_user_endpoint));

    let protected_routes = Router::new()
        .route(
            endpoints::CURRENT_USER,
            get(get_profile_endpoint).delete(delete_current_user_endpoint),
        )
        .route(
            endpoints::ACCOUNT_TYPES,
            get(list_account_types_endpoint).post(create_account_type_endpoint),
        )
        .route(
            endpoints::ACCOUNT_TYPE,
            get(get_account_type_endpoint)
                .put(edit_account_type_endpoint)
                .delete(delete_account_type_endpoint),
        )
        .route(
            endpoints::ACCOUNT_TYPE_USAGE,
            get(get_account_type_usage_endpoint),
        )
        .route(
            endpoints::ACCOUNTS,
            get(list_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNTS_USAGE,
            get(list_accounts_with_usage_endpoint),
        )
        .route(endpoints::ACCOUNTS_SUMMARY, get(get_account_summary_endpoint))
        .route(
            endpoints::ACCOUNTS_STATISTICS,
            get(get_account_statistics_endpoint),
        )
        .route(
            endpoints::ACCOUNT,
            get(get_account_endpoint)
                .put(edit_account_endpoint)
                .delete(delete_account_endpoint),
        )
        .route(endpoints::ACCOUNT_BALANCE, put(set_account_balance_endpoint))
        .route(endpoints::ACCOUNT_USAGE, get(get_account_usage_endpoint))
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORIES_STATISTICS,
            get(get_category_statistics_endpoint),
        )
        .route(
            endpoints::CATEGORIES_BY_KIND,
            get(list_categories_by_kind_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(edit_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(endpoints::CATEGORY_USAGE, get(get_category_usage_endpoint))
        .route(
            endpoints::BUDGETS,
            get(list_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(endpoints::TRANSACTIONS, get(list_transactions_endpoint))
        .route(endpoints::INCOME, post(record_income_endpoint))
        .route(endpoints::EXPENSE, post(record_expense_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"success": false, "error": "route not found"})),
    )
        .into_response()
}
