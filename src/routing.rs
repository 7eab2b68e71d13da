//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, get_log_in_page, get_log_out, page_guard, sign_in_endpoint,
        sign_out_endpoint, sign_up_endpoint,
    },
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budgets_page, get_edit_budget_page,
        list_budgets_endpoint, update_budget_endpoint,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_edit_category_page, list_categories_endpoint, update_category_endpoint,
    },
    dashboard::get_dashboard_page,
    endpoints,
    goal::{
        contribute_to_goal_endpoint, create_goal_endpoint, delete_goal_endpoint,
        get_edit_goal_page, get_goals_page, list_goals_endpoint, update_goal_endpoint,
    },
    not_found::get_404_not_found,
    rpc::rpc_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, export_transactions_endpoint,
        get_category_breakdown_endpoint, get_edit_transaction_page, get_summary_endpoint,
        get_transactions_page, list_transactions_endpoint, update_transaction_endpoint,
    },
    user::{get_profile_endpoint, get_settings_page, update_profile_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_OUT_VIEW, get(get_log_out))
        .route(endpoints::SIGN_UP_API, post(sign_up_endpoint))
        .route(endpoints::SIGN_IN_API, post(sign_in_endpoint))
        .route(endpoints::SIGN_OUT_API, post(sign_out_endpoint))
        // The RPC endpoint checks the session itself since `healthCheck` is public.
        .route(endpoints::RPC, post(rpc_endpoint));

    // `route_layer` so that unknown paths still reach the 404 fallback.
    let api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            get(list_transactions_endpoint)
                .post(create_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(endpoints::TRANSACTION_SUMMARY_API, get(get_summary_endpoint))
        .route(
            endpoints::TRANSACTION_CATEGORIES_API,
            get(get_category_breakdown_endpoint),
        )
        .route(
            endpoints::TRANSACTION_EXPORT_API,
            get(export_transactions_endpoint),
        )
        .route(
            endpoints::CATEGORIES_API,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY_API,
            put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(
            endpoints::BUDGETS_API,
            get(list_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(
            endpoints::BUDGET_API,
            put(update_budget_endpoint).delete(delete_budget_endpoint),
        )
        .route(
            endpoints::GOALS_API,
            get(list_goals_endpoint).post(create_goal_endpoint),
        )
        .route(
            endpoints::GOAL_API,
            put(update_goal_endpoint).delete(delete_goal_endpoint),
        )
        .route(
            endpoints::GOAL_CONTRIBUTIONS_API,
            post(contribute_to_goal_endpoint),
        )
        .route(
            endpoints::PROFILE_API,
            get(get_profile_endpoint).put(update_profile_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::GOALS_VIEW, get(get_goals_page))
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(endpoints::EDIT_BUDGET_VIEW, get(get_edit_budget_page))
        .route(endpoints::EDIT_GOAL_VIEW, get(get_edit_goal_page))
        .route(endpoints::SETTINGS_VIEW, get(get_settings_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), page_guard));

    page_routes
        .merge(api_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
