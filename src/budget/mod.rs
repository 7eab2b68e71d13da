//! Budgets that cap spending on a category label over a date range.

mod api;
mod budgets_page;
mod db;
mod domain;
mod edit_page;

pub use api::{
    BudgetResponse, BudgetState, BudgetsResponse, create_budget_endpoint, delete_budget_endpoint,
    list_budgets_endpoint, update_budget_endpoint,
};
pub use budgets_page::{budget_progress_bar, get_budgets_page};
pub use db::{
    create_budget, create_budget_table, delete_budget, get_budget, get_budgets, update_budget,
};
pub use domain::{
    Budget, BudgetInput, BudgetPeriod, BudgetUpdate, NewBudget, check_date_range,
};
pub use edit_page::get_edit_budget_page;
