//! The page that shows progress towards each savings goal.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    Error,
    date::format_date,
    endpoints::{self, format_endpoint},
    goal::{DEFAULT_COLOR, Goal, GoalState, get_goals},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, app_page, error_page, format_currency,
    },
    timezone::current_local_date,
    user::UserID,
};

/// Render a progress bar filled to the share of `goal` that has been saved.
pub fn goal_progress_bar(goal: &Goal) -> Markup {
    let percent = format!("{:.0}", goal.percent_complete());

    html! {
        div
            class="w-full bg-gray-200 rounded-full h-2.5 dark:bg-gray-700"
            role="progressbar"
            aria-valuemin="0"
            aria-valuemax="100"
            aria-valuenow=(percent)
        {
            div
                class="h-2.5 rounded-full"
                style={ "width: " (percent) "%; background-color: " (goal.color) }
            {}
        }
    }
}

/// Display the signed in user's savings goals and a form for adding one.
pub async fn get_goals_page(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match load_goals(&state, user_id) {
        Ok((goals, today)) => goals_view(&goals, today).into_response(),
        Err(error) => error_page(error),
    }
}

fn load_goals(state: &GoalState, user_id: UserID) -> Result<(Vec<Goal>, Date), Error> {
    let today = current_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    Ok((get_goals(user_id, &connection)?, today))
}

fn goals_view(goals: &[Goal], today: Date) -> Markup {
    let content = html! {
        (new_goal_form())

        div class="grid gap-4 md:grid-cols-2"
        {
            @for goal in goals {
                (goal_card(goal, today))
            }
        }

        @if goals.is_empty() {
            p class="text-center text-gray-500" { "No savings goals yet." }
        }
    };

    app_page("Savings Goals", endpoints::GOALS_VIEW, &content)
}

fn goal_card(goal: &Goal, today: Date) -> Markup {
    let overdue = goal.deadline < today && !goal.is_complete();
    let contribute_url = format_endpoint(endpoints::GOAL_CONTRIBUTIONS_API, goal.id);

    html! {
        div
            class="bg-white dark:bg-gray-800 rounded-lg shadow p-4 space-y-2"
            data-goal-id=(goal.id)
        {
            div class="flex justify-between items-center"
            {
                h2 class="font-semibold text-lg" { (goal.name) }
                span class="text-xs text-gray-500" { (goal.category) " (" (goal.icon) ")" }
            }

            p class="text-sm text-gray-500"
            {
                "Due " (format_date(goal.deadline))
                @if overdue {
                    span class="ml-2 text-red-600 dark:text-red-400" { "Overdue" }
                }
                @if goal.is_complete() {
                    span class="ml-2 text-green-600 dark:text-green-400" { "Reached" }
                }
            }

            (goal_progress_bar(goal))

            div class="flex justify-between text-sm"
            {
                span { (format_currency(goal.current_amount)) " of " (format_currency(goal.target_amount)) }
                @if goal.monthly_target.cents() > 0 {
                    span class="text-gray-500" { (format_currency(goal.monthly_target)) " / month" }
                }
            }

            form
                hx-post=(contribute_url)
                hx-ext="json-enc"
                hx-swap="none"
                hx-on--after-request="if (event.detail.successful) window.location.reload()"
                class="flex gap-2 items-end"
            {
                input type="number" name="amount" step="0.01" required placeholder="Amount"
                    aria-label="Contribution amount" class=(FORM_TEXT_INPUT_STYLE);
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Contribute" }
            }
            p class="form-error text-red-500 text-sm" {}

            a
                href=(format_endpoint(endpoints::EDIT_GOAL_VIEW, goal.id))
                class={ (LINK_STYLE) " mr-4" }
            {
                "Edit"
            }
            button
                class=(BUTTON_DELETE_STYLE)
                hx-delete=(format_endpoint(endpoints::GOAL_API, goal.id))
                hx-confirm="Delete this goal and its contributions?"
                hx-target="closest div[data-goal-id]"
                hx-swap="delete"
            {
                "Delete"
            }
        }
    }
}

fn new_goal_form() -> Markup {
    html! {
        details class="bg-white dark:bg-gray-800 rounded-lg shadow p-4"
        {
            summary class="cursor-pointer font-semibold" { "Add goal" }

            form
                hx-post=(endpoints::GOALS_API)
                hx-ext="json-enc"
                hx-swap="none"
                hx-on--after-request="if (event.detail.successful) window.location.reload()"
                class="grid gap-4 md:grid-cols-3 mt-4"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }
                    input type="text" name="name" id="name" maxlength="100" required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="targetAmount" class=(FORM_LABEL_STYLE) { "Target" }
                    input type="number" name="targetAmount" id="targetAmount" step="0.01"
                        min="0.01" required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="deadline" class=(FORM_LABEL_STYLE) { "Deadline" }
                    input type="date" name="deadline" id="deadline" required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                    input type="text" name="category" id="category" maxlength="100"
                        placeholder="Other" class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="monthlyTarget" class=(FORM_LABEL_STYLE) { "Monthly target" }
                    input type="number" name="monthlyTarget" id="monthlyTarget" step="0.01"
                        min="0" class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="color" class=(FORM_LABEL_STYLE) { "Color" }
                    input type="color" name="color" id="color" value=(DEFAULT_COLOR)
                        class="block w-full h-10 rounded";
                }

                div class="md:col-span-3"
                {
                    p class="form-error text-red-500 text-sm" {}
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                }
            }
        }
    }
}
