//! The API endpoint URIs.
//!
//! Path parameters use axum's `{name}` syntax.

/// The route for logging in a user.
pub const LOG_IN: &str = "/api/log_in";
/// The route for registering users.
pub const USERS: &str = "/api/users";
/// The route for the logged in user's own profile.
pub const CURRENT_USER: &str = "/api/users/me";

/// The route to list and create account types.
pub const ACCOUNT_TYPES: &str = "/api/account_types";
/// The route to get, update and delete a single account type.
pub const ACCOUNT_TYPE: &str = "/api/account_types/{account_type_id}";
/// The route to check whether an account type is in use.
pub const ACCOUNT_TYPE_USAGE: &str = "/api/account_types/{account_type_id}/usage";

/// The route to list and create accounts.
pub const ACCOUNTS: &str = "/api/accounts";
/// The route to list accounts with their transaction counts.
pub const ACCOUNTS_USAGE: &str = "/api/accounts/usage";
/// The route to get the account totals for every account type.
pub const ACCOUNTS_SUMMARY: &str = "/api/accounts/summary";
/// The route to get the overall and per type account totals.
pub const ACCOUNTS_STATISTICS: &str = "/api/accounts/statistics";
/// The route to get, update and delete a single account.
pub const ACCOUNT: &str = "/api/accounts/{account_id}";
/// The route to overwrite an account's balance.
pub const ACCOUNT_BALANCE: &str = "/api/accounts/{account_id}/balance";
/// The route to check whether an account is in use.
pub const ACCOUNT_USAGE: &str = "/api/accounts/{account_id}/usage";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to count categories by kind.
pub const CATEGORIES_STATISTICS: &str = "/api/categories/statistics";
/// The route to list the income or expense categories.
pub const CATEGORIES_BY_KIND: &str = "/api/categories/type/{kind}";
/// The route to get, update and delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to check whether a category is in use.
pub const CATEGORY_USAGE: &str = "/api/categories/{category_id}/usage";

/// The route to list and create budgets.
pub const BUDGETS: &str = "/api/budgets";

/// The route to list transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to record income.
pub const INCOME: &str = "/api/transactions/income";
/// The route to record an expense.
pub const EXPENSE: &str = "/api/transactions/expense";
