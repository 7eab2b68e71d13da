//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    budget::{Budget, get_budgets},
    dashboard::{
        aggregation::{CategoryExpense, expenses_by_category},
        cards::{budget_cards_view, goal_cards_view, summary_cards_view},
        charts::{
            DashboardChart, ECHARTS_SCRIPT, charts_script, charts_view,
            expenses_by_category_chart,
        },
        tables::recent_transactions_table,
    },
    endpoints,
    goal::{Goal, get_goals},
    html::{HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, base, error_page},
    navigation::NavBar,
    transaction::{
        Transaction, TransactionFilter, TransactionSummary, get_summary, list_transactions,
    },
    user::UserID,
};

/// The number of transactions listed under "Recent Transactions".
const RECENT_TRANSACTION_COUNT: u32 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the user's data.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Holds all the data needed to render the dashboard.
struct DashboardData {
    summary: TransactionSummary,
    expenses: Vec<CategoryExpense>,
    budgets: Vec<Budget>,
    goals: Vec<Goal>,
    recent_transactions: Vec<Transaction>,
}

/// Display a page with an overview of the signed in user's finances.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let data = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| build_dashboard_data(user_id, &connection));

    match data {
        Ok(data) => dashboard_view(&data).into_response(),
        Err(error) => error_page(error),
    }
}

/// Fetches everything the dashboard shows for `user_id`.
///
/// # Errors
/// Returns an error if any of the database queries fail.
fn build_dashboard_data(user_id: UserID, connection: &Connection) -> Result<DashboardData, Error> {
    let recent_filter = TransactionFilter {
        limit: RECENT_TRANSACTION_COUNT,
        ..TransactionFilter::default()
    };

    Ok(DashboardData {
        summary: get_summary(user_id, connection)?,
        expenses: expenses_by_category(user_id, connection)
            .inspect_err(|error| tracing::error!("could not sum expenses: {error}"))?,
        budgets: get_budgets(user_id, connection)?,
        goals: get_goals(user_id, connection)?,
        recent_transactions: list_transactions(user_id, &recent_filter, connection)?,
    })
}

/// Renders the dashboard page.
///
/// The expenses chart is only drawn once there is at least one expense.
fn dashboard_view(data: &DashboardData) -> Markup {
    let charts = if data.expenses.is_empty() {
        vec![]
    } else {
        vec![DashboardChart {
            id: "expenses-chart",
            options: expenses_by_category_chart(&data.expenses).to_string(),
        }]
    };

    let content = html!(
        (NavBar::new(endpoints::DASHBOARD_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-8 pb-24 lg:pb-8"
            {
                h1 class="text-2xl font-bold" { "Dashboard" }

                (summary_cards_view(&data.summary))

                @if charts.is_empty() {
                    (no_expenses_view())
                } @else {
                    (charts_view(&charts))
                }

                div class="grid grid-cols-1 xl:grid-cols-2 gap-8"
                {
                    (budget_cards_view(&data.budgets))
                    (goal_cards_view(&data.goals))
                }

                (recent_transactions_table(&data.recent_transactions))
            }
        }
    );

    let scripts = if charts.is_empty() {
        vec![]
    } else {
        vec![
            HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
            charts_script(&charts),
        ]
    };

    base("Dashboard", &scripts, &content)
}

fn no_expenses_view() -> Markup {
    html! {
        div class="text-center"
        {
            h2 class="text-xl font-bold" { "Nothing here yet..." }

            p
            {
                "A breakdown of your spending will show up here once you "
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "add some expenses" }
                "."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        budget::{BudgetPeriod, NewBudget, create_budget},
        endpoints,
        goal::{NewGoal, create_goal},
        money::Amount,
        test_utils::{assert_valid_html, sign_in_test_server},
        transaction::{NewTransaction, TransactionType, create_transaction},
    };

    #[tokio::test]
    async fn dashboard_shows_every_section() {
        let (server, state, user, cookie) = sign_in_test_server().await;
        {
            let connection = state.db_connection.lock().unwrap();
            for (description, cents, transaction_type) in [
                ("Salary", 50_000, TransactionType::Income),
                ("Groceries", 12_000, TransactionType::Expense),
            ] {
                create_transaction(
                    user.id,
                    NewTransaction {
                        description: description.to_owned(),
                        category: description.to_owned(),
                        amount: Amount::from_cents(cents),
                        date: date!(2025 - 03 - 10),
                        transaction_type,
                    },
                    &connection,
                )
                .unwrap();
            }
            create_budget(
                user.id,
                NewBudget {
                    category: "Groceries".to_owned(),
                    budget_amount: Amount::from_cents(40_000),
                    period: BudgetPeriod::Monthly,
                    color: "#10b981".to_owned(),
                    start_date: date!(2025 - 03 - 01),
                    end_date: date!(2025 - 03 - 31),
                },
                &connection,
            )
            .unwrap();
            create_goal(
                user.id,
                NewGoal {
                    name: "Holiday".to_owned(),
                    target_amount: Amount::from_cents(300_000),
                    deadline: date!(2030 - 12 - 01),
                    category: "Travel".to_owned(),
                    icon: "plane".to_owned(),
                    color: "#3b82f6".to_owned(),
                    monthly_target: Amount::ZERO,
                },
                &connection,
            )
            .unwrap();
        }

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        assert_valid_html(&document);
        for selector in [
            "#summary",
            "#expenses-chart",
            "#budgets div[data-budget-id] div[role=progressbar]",
            "#goals div[data-goal-id] div[role=progressbar]",
            "#recent-transactions tr[data-transaction-id]",
        ] {
            let parsed = Selector::parse(selector).unwrap();
            assert!(
                document.select(&parsed).next().is_some(),
                "could not find {selector}"
            );
        }
        let net = Selector::parse("div[data-summary='Net Balance']").unwrap();
        let net = document.select(&net).next().unwrap().text().collect::<String>();
        assert!(net.contains("$380.00"), "got {net}");
    }

    #[tokio::test]
    async fn dashboard_without_expenses_has_no_chart() {
        let (server, _, _, cookie) = sign_in_test_server().await;

        let response = server
            .get(endpoints::DASHBOARD_VIEW)
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        assert_valid_html(&document);
        let chart = Selector::parse("#expenses-chart").unwrap();
        assert!(document.select(&chart).next().is_none());
        assert!(response.text().contains("Nothing here yet..."));
    }

    #[tokio::test]
    async fn dashboard_requires_sign_in() {
        let (server, _, _, _) = sign_in_test_server().await;

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status_see_other();
    }
}
