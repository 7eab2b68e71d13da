//! The page that shows how much of each budget has been spent.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    Error,
    budget::{Budget, BudgetState, get_budgets},
    date::format_date,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, app_page, error_page, format_currency,
    },
    timezone::current_local_date,
    user::UserID,
};

/// Render a progress bar for `budget`, red once it is overspent.
pub fn budget_progress_bar(budget: &Budget) -> Markup {
    let percent = budget.percent_spent();
    let bar_color = if percent > 100.0 {
        "bg-red-600"
    } else {
        "bg-blue-600"
    };

    html! {
        div
            class="w-full bg-gray-200 rounded-full h-2.5 dark:bg-gray-700"
            role="progressbar"
            aria-valuemin="0"
            aria-valuemax="100"
            aria-valuenow=(format!("{:.0}", percent.min(100.0)))
        {
            div
                class={ "h-2.5 rounded-full " (bar_color) }
                style={ "width: " (format!("{:.0}", percent.min(100.0))) "%" }
            {}
        }
    }
}

/// Display the signed in user's budgets and a form for adding one.
pub async fn get_budgets_page(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match load_budgets(&state, user_id) {
        Ok((budgets, today)) => budgets_view(&budgets, today).into_response(),
        Err(error) => error_page(error),
    }
}

fn load_budgets(state: &BudgetState, user_id: UserID) -> Result<(Vec<Budget>, Date), Error> {
    let today = current_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    Ok((get_budgets(user_id, &connection)?, today))
}

fn budgets_view(budgets: &[Budget], today: Date) -> Markup {
    let content = html! {
        (new_budget_form(today))

        div class="grid gap-4 md:grid-cols-2"
        {
            @for budget in budgets {
                (budget_card(budget))
            }
        }

        @if budgets.is_empty() {
            p class="text-center text-gray-500" { "No budgets yet." }
        }
    };

    app_page("Budgets", endpoints::BUDGETS_VIEW, &content)
}

fn budget_card(budget: &Budget) -> Markup {
    let remaining = budget.remaining();

    html! {
        div
            class="bg-white dark:bg-gray-800 rounded-lg shadow p-4 space-y-2 border-l-4"
            style={ "border-color: " (budget.color) }
            data-budget-id=(budget.id)
        {
            div class="flex justify-between items-center"
            {
                h2 class="font-semibold text-lg" { (budget.category) }
                span class="text-xs uppercase text-gray-500" { (budget.period.as_str()) }
            }

            p class="text-sm text-gray-500"
            {
                (format_date(budget.start_date)) " to " (format_date(budget.end_date))
            }

            (budget_progress_bar(budget))

            div class="flex justify-between text-sm"
            {
                span { (format_currency(budget.spent_amount)) " of " (format_currency(budget.budget_amount)) }
                @if remaining.is_negative() {
                    span class="text-red-600 dark:text-red-400" { (format_currency(remaining.abs())) " over" }
                } @else {
                    span class="text-green-600 dark:text-green-400" { (format_currency(remaining)) " left" }
                }
            }

            a
                href=(format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id))
                class={ (LINK_STYLE) " mr-4" }
            {
                "Edit"
            }
            button
                class=(BUTTON_DELETE_STYLE)
                hx-delete=(format_endpoint(endpoints::BUDGET_API, budget.id))
                hx-confirm="Delete this budget?"
                hx-target="closest div[data-budget-id]"
                hx-swap="delete"
            {
                "Delete"
            }
        }
    }
}

fn new_budget_form(today: Date) -> Markup {
    html! {
        details class="bg-white dark:bg-gray-800 rounded-lg shadow p-4"
        {
            summary class="cursor-pointer font-semibold" { "Add budget" }

            form
                hx-post=(endpoints::BUDGETS_API)
                hx-ext="json-enc"
                hx-swap="none"
                hx-on--after-request="if (event.detail.successful) window.location.reload()"
                class="grid gap-4 md:grid-cols-3 mt-4"
            {
                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                    input type="text" name="category" id="category" maxlength="100" required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="budgetAmount" class=(FORM_LABEL_STYLE) { "Amount" }
                    input type="number" name="budgetAmount" id="budgetAmount" step="0.01"
                        min="0.01" required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="period" class=(FORM_LABEL_STYLE) { "Period" }
                    select name="period" id="period" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="weekly" { "Weekly" }
                        option value="monthly" selected { "Monthly" }
                        option value="yearly" { "Yearly" }
                    }
                }

                div
                {
                    label for="startDate" class=(FORM_LABEL_STYLE) { "Start date" }
                    input type="date" name="startDate" id="startDate" value=(format_date(today))
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="color" class=(FORM_LABEL_STYLE) { "Color" }
                    input type="color" name="color" id="color" value="#3b82f6" required
                        class="block w-full h-10 rounded";
                }

                div class="flex flex-col justify-end"
                {
                    p class="form-error text-red-500 text-sm" {}
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                }
            }
        }
    }
}
