//! Savings goals and the contributions made towards them.

mod api;
mod db;
mod domain;
mod edit_page;
mod goals_page;

pub use api::{
    GoalResponse, GoalState, GoalsResponse, contribute_to_goal_endpoint, create_goal_endpoint,
    delete_goal_endpoint, list_goals_endpoint, update_goal_endpoint,
};
pub use db::{
    add_contribution, create_goal, create_goal_tables, delete_goal, get_goal, get_goals,
    update_goal,
};
pub use domain::{
    ContributionInput, DEFAULT_COLOR, Goal, GoalContribution, GoalInput, GoalUpdate,
    NewContribution, NewGoal,
};
pub use edit_page::get_edit_goal_page;
pub use goals_page::{get_goals_page, goal_progress_bar};
