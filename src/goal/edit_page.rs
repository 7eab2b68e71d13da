//! The page for changing a savings goal.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    date::format_date,
    endpoints::{self, format_endpoint},
    extract::parse_id,
    goal::{Goal, GoalState, get_goal},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, app_page, error_page, format_currency, go_to_on_success,
    },
    user::UserID,
};

/// Display a form prefilled with the stored goal. Contributions are made on
/// the goals page, so the saved amount is shown but not editable.
pub async fn get_edit_goal_page(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    Path(goal_id): Path<String>,
) -> Response {
    match load_goal(&state, user_id, &goal_id) {
        Ok(goal) => edit_goal_view(&goal).into_response(),
        Err(error) => error_page(error),
    }
}

fn load_goal(state: &GoalState, user_id: UserID, raw_id: &str) -> Result<Goal, Error> {
    let id = parse_id(raw_id, "goal")?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_goal(user_id, id, &connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingGoal,
        error => error,
    })
}

fn edit_goal_view(goal: &Goal) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            p class="mb-4 text-sm text-gray-500"
            {
                "Saved so far: " (format_currency(goal.current_amount))
            }

            form
                hx-put=(format_endpoint(endpoints::GOAL_API, goal.id))
                hx-ext="json-enc"
                hx-swap="none"
                hx-on--after-request=(go_to_on_success(endpoints::GOALS_VIEW))
                class="grid gap-4 md:grid-cols-2"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }
                    input type="text" name="name" id="name" maxlength="100" value=(goal.name)
                        required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="targetAmount" class=(FORM_LABEL_STYLE) { "Target" }
                    input type="number" name="targetAmount" id="targetAmount" step="0.01"
                        min="0.01" value=(goal.target_amount.to_string()) required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="deadline" class=(FORM_LABEL_STYLE) { "Deadline" }
                    input type="date" name="deadline" id="deadline"
                        value=(format_date(goal.deadline)) required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="monthlyTarget" class=(FORM_LABEL_STYLE) { "Monthly target" }
                    input type="number" name="monthlyTarget" id="monthlyTarget" step="0.01"
                        min="0" value=(goal.monthly_target.to_string()) required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                    input type="text" name="category" id="category" maxlength="100"
                        value=(goal.category) required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="icon" class=(FORM_LABEL_STYLE) { "Icon" }
                    input type="text" name="icon" id="icon" maxlength="50" value=(goal.icon)
                        required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="color" class=(FORM_LABEL_STYLE) { "Color" }
                    input type="color" name="color" id="color" value=(goal.color) required
                        class="block w-full h-10 rounded";
                }

                div class="md:col-span-2 space-y-2"
                {
                    p class="form-error text-red-500 text-sm" {}
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save changes" }
                    a href=(endpoints::GOALS_VIEW) class=(LINK_STYLE) { "Cancel" }
                }
            }
        }
    };

    app_page("Edit Goal", endpoints::GOALS_VIEW, &content)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use scraper::{Html, Selector};
    use serde_json::json;
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        goal::{NewGoal, create_goal, get_goal},
        money::Amount,
        test_utils::{assert_valid_html, create_other_user, sign_in_test_server},
    };

    fn holiday() -> NewGoal {
        NewGoal {
            name: "Holiday".to_owned(),
            target_amount: Amount::from_cents(300_000),
            deadline: date!(2030 - 06 - 30),
            category: "Travel".to_owned(),
            icon: "plane".to_owned(),
            color: "#0ea5e9".to_owned(),
            monthly_target: Amount::from_cents(25_000),
        }
    }

    #[tokio::test]
    async fn form_is_prefilled_from_the_store() {
        let (server, state, user, cookie) = sign_in_test_server().await;
        let goal = {
            let connection = state.db_connection.lock().unwrap();
            create_goal(user.id, holiday(), &connection).unwrap()
        };

        let response = server
            .get(&format_endpoint(endpoints::EDIT_GOAL_VIEW, goal.id))
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        assert_valid_html(&document);
        let value_of = |name: &str| {
            let selector = Selector::parse(&format!("input[name={name}]")).unwrap();
            document
                .select(&selector)
                .next()
                .and_then(|input| input.value().attr("value"))
                .map(str::to_owned)
        };
        assert_eq!(value_of("name").as_deref(), Some("Holiday"));
        assert_eq!(value_of("targetAmount").as_deref(), Some("3000.00"));
        assert_eq!(value_of("monthlyTarget").as_deref(), Some("250.00"));
        assert_eq!(value_of("deadline").as_deref(), Some("2030-06-30"));
        assert_eq!(value_of("icon").as_deref(), Some("plane"));
    }

    #[tokio::test]
    async fn submitted_form_is_stored() {
        let (server, state, user, cookie) = sign_in_test_server().await;
        let goal = {
            let connection = state.db_connection.lock().unwrap();
            create_goal(user.id, holiday(), &connection).unwrap()
        };

        let response = server
            .put(&format_endpoint(endpoints::GOAL_API, goal.id))
            .add_cookie(cookie)
            .json(&json!({
                "name": "Japan trip",
                "targetAmount": "3500.00",
                "deadline": "2030-06-30",
                "monthlyTarget": "0",
                "category": "Travel",
                "icon": "plane",
                "color": "#0ea5e9",
            }))
            .await;

        response.assert_status_ok();
        let connection = state.db_connection.lock().unwrap();
        let stored = get_goal(user.id, goal.id, &connection).unwrap();
        assert_eq!(stored.name, "Japan trip");
        assert_eq!(stored.target_amount, Amount::from_cents(350_000));
        assert_eq!(stored.monthly_target, Amount::ZERO);
    }

    #[tokio::test]
    async fn other_users_goal_is_not_found() {
        let (server, state, _, cookie) = sign_in_test_server().await;
        let goal = {
            let connection = state.db_connection.lock().unwrap();
            let other = create_other_user(&connection, "other@example.com");
            create_goal(other.id, holiday(), &connection).unwrap()
        };

        let response = server
            .get(&format_endpoint(endpoints::EDIT_GOAL_VIEW, goal.id))
            .add_cookie(cookie)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("Goal not found"));
    }
}
