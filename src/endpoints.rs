//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/categories/{category_id}', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for listing a user's categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for listing a user's budgets.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for listing a user's savings goals.
pub const GOALS_VIEW: &str = "/goals";
/// The page for editing a transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for editing a category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The page for editing a budget.
pub const EDIT_BUDGET_VIEW: &str = "/budgets/{budget_id}/edit";
/// The page for editing a savings goal.
pub const EDIT_GOAL_VIEW: &str = "/goals/{goal_id}/edit";
/// The page for changing the user's profile.
pub const SETTINGS_VIEW: &str = "/settings";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route that logs the user out and sends them back to the log in page.
pub const LOG_OUT_VIEW: &str = "/log_out";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for creating an account.
pub const SIGN_UP_API: &str = "/api/auth/sign-up";
/// The route for logging in a user.
pub const SIGN_IN_API: &str = "/api/auth/sign-in";
/// The route for the client to log out the current user.
pub const SIGN_OUT_API: &str = "/api/auth/sign-out";
/// The route to list, create, update and delete transactions.
pub const TRANSACTIONS_API: &str = "/api/transaction";
/// The route for the income/expense summary.
pub const TRANSACTION_SUMMARY_API: &str = "/api/transaction/summary";
/// The route for transaction counts and totals grouped by category.
pub const TRANSACTION_CATEGORIES_API: &str = "/api/transaction/categories";
/// The route for downloading transactions as CSV.
pub const TRANSACTION_EXPORT_API: &str = "/api/transaction/export";
/// The route to list and create categories.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to update or delete a category.
pub const CATEGORY_API: &str = "/api/categories/{category_id}";
/// The route to list and create budgets.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to update or delete a budget.
pub const BUDGET_API: &str = "/api/budgets/{budget_id}";
/// The route to list and create savings goals.
pub const GOALS_API: &str = "/api/goals";
/// The route to update or delete a savings goal.
pub const GOAL_API: &str = "/api/goals/{goal_id}";
/// The route to add a contribution to a savings goal.
pub const GOAL_CONTRIBUTIONS_API: &str = "/api/goals/{goal_id}/contributions";
/// The route to read and update the user's profile.
pub const PROFILE_API: &str = "/api/user/profile";
/// The RPC route. The path parameter may contain slashes, e.g. "/rpc/transactions/getSummary".
pub const RPC: &str = "/rpc/{*procedure}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/goals/{goal_id}', '{goal_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    #[track_caller]
    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::BUDGETS_VIEW,
            endpoints::GOALS_VIEW,
            endpoints::SETTINGS_VIEW,
            endpoints::LOG_IN_VIEW,
            endpoints::LOG_OUT_VIEW,
            endpoints::STATIC,
            endpoints::SIGN_UP_API,
            endpoints::SIGN_IN_API,
            endpoints::SIGN_OUT_API,
            endpoints::TRANSACTIONS_API,
            endpoints::TRANSACTION_SUMMARY_API,
            endpoints::TRANSACTION_CATEGORIES_API,
            endpoints::TRANSACTION_EXPORT_API,
            endpoints::CATEGORIES_API,
            endpoints::BUDGETS_API,
            endpoints::GOALS_API,
            endpoints::PROFILE_API,
        ] {
            assert_endpoint_is_valid_uri(endpoint);
        }
    }

    #[test]
    fn parameterised_endpoints_format_to_valid_uris() {
        for endpoint in [
            endpoints::EDIT_TRANSACTION_VIEW,
            endpoints::EDIT_CATEGORY_VIEW,
            endpoints::EDIT_BUDGET_VIEW,
            endpoints::EDIT_GOAL_VIEW,
            endpoints::CATEGORY_API,
            endpoints::BUDGET_API,
            endpoints::GOAL_API,
            endpoints::GOAL_CONTRIBUTIONS_API,
        ] {
            assert_endpoint_is_valid_uri(&format_endpoint(endpoint, 7));
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/api/goals/{goal_id}/contributions", 3);

        assert_eq!(formatted_path, "/api/goals/3/contributions");
    }
}
