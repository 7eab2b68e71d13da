//! Dashboard module
//!
//! Provides an overview page with summary totals, a chart of spending by
//! category, budget and goal progress, and the latest transactions.

mod aggregation;
mod cards;
mod charts;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;
