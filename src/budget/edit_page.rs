//! The page for changing a budget's limit or date range.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    budget::{Budget, BudgetPeriod, BudgetState, get_budget},
    date::format_date,
    endpoints::{self, format_endpoint},
    extract::parse_id,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, app_page, error_page, go_to_on_success,
    },
    user::UserID,
};

/// Display a form prefilled with the stored budget.
pub async fn get_edit_budget_page(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<String>,
) -> Response {
    match load_budget(&state, user_id, &budget_id) {
        Ok(budget) => edit_budget_view(&budget).into_response(),
        Err(error) => error_page(error),
    }
}

fn load_budget(state: &BudgetState, user_id: UserID, raw_id: &str) -> Result<Budget, Error> {
    let id = parse_id(raw_id, "budget")?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_budget(user_id, id, &connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingBudget,
        error => error,
    })
}

fn edit_budget_view(budget: &Budget) -> Markup {
    let periods = [
        (BudgetPeriod::Weekly, "Weekly"),
        (BudgetPeriod::Monthly, "Monthly"),
        (BudgetPeriod::Yearly, "Yearly"),
    ];

    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(format_endpoint(endpoints::BUDGET_API, budget.id))
                hx-ext="json-enc"
                hx-swap="none"
                hx-on--after-request=(go_to_on_success(endpoints::BUDGETS_VIEW))
                class="grid gap-4 md:grid-cols-2"
            {
                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                    input type="text" name="category" id="category" maxlength="100"
                        value=(budget.category) required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="budgetAmount" class=(FORM_LABEL_STYLE) { "Amount" }
                    input type="number" name="budgetAmount" id="budgetAmount" step="0.01"
                        min="0.01" value=(budget.budget_amount.to_string()) required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="period" class=(FORM_LABEL_STYLE) { "Period" }
                    select name="period" id="period" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for (period, label) in periods {
                            option value=(period.as_str()) selected[period == budget.period] { (label) }
                        }
                    }
                }

                div
                {
                    label for="color" class=(FORM_LABEL_STYLE) { "Color" }
                    input type="color" name="color" id="color" value=(budget.color) required
                        class="block w-full h-10 rounded";
                }

                div
                {
                    label for="startDate" class=(FORM_LABEL_STYLE) { "Start date" }
                    input type="date" name="startDate" id="startDate"
                        value=(format_date(budget.start_date)) required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="endDate" class=(FORM_LABEL_STYLE) { "End date" }
                    input type="date" name="endDate" id="endDate"
                        value=(format_date(budget.end_date)) required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="md:col-span-2 space-y-2"
                {
                    p class="form-error text-red-500 text-sm" {}
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save changes" }
                    a href=(endpoints::BUDGETS_VIEW) class=(LINK_STYLE) { "Cancel" }
                }
            }
        }
    };

    app_page("Edit Budget", endpoints::BUDGETS_VIEW, &content)
}
