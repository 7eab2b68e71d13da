//! Card components for the dashboard: the summary totals and the progress of
//! budgets and savings goals.

use maud::{Markup, html};

use crate::{
    budget::{Budget, budget_progress_bar},
    endpoints,
    goal::{Goal, goal_progress_bar},
    html::{LINK_STYLE, format_currency},
    transaction::TransactionSummary,
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";

/// Renders the four summary cards: income, expenses, net balance and transaction count.
pub(super) fn summary_cards_view(summary: &TransactionSummary) -> Markup {
    let net_style = if summary.net_balance.is_negative() {
        "text-red-600 dark:text-red-400"
    } else {
        "text-green-600 dark:text-green-400"
    };

    html! {
        section id="summary" class="grid grid-cols-2 lg:grid-cols-4 gap-4"
        {
            (summary_card("Total Income", &format_currency(summary.total_income),
                "text-green-600 dark:text-green-400"))
            (summary_card("Total Expenses", &format_currency(summary.total_expenses),
                "text-red-600 dark:text-red-400"))
            (summary_card("Net Balance", &format_currency(summary.net_balance), net_style))
            (summary_card("Transactions", &summary.transaction_count.to_string(), ""))
        }
    }
}

fn summary_card(label: &str, value: &str, value_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) data-summary=(label)
        {
            div class="text-sm text-gray-600 dark:text-gray-400" { (label) }
            div class={ "text-2xl font-bold " (value_style) } { (value) }
        }
    }
}

/// Renders a card per budget with how much of it has been spent.
pub(super) fn budget_cards_view(budgets: &[Budget]) -> Markup {
    html! {
        section id="budgets" class="space-y-4"
        {
            div class="flex justify-between items-baseline"
            {
                h2 class="text-xl font-semibold" { "Budgets" }
                a href=(endpoints::BUDGETS_VIEW) class=(LINK_STYLE) { "Manage" }
            }

            @if budgets.is_empty() {
                p class="text-gray-500" { "No budgets yet." }
            } @else {
                div class="grid grid-cols-1 md:grid-cols-2 gap-4"
                {
                    @for budget in budgets {
                        div class={ (CARD_STYLE) " space-y-2" } data-budget-id=(budget.id)
                        {
                            div class="flex justify-between"
                            {
                                span class="font-semibold" { (budget.category) }
                                span class="text-sm text-gray-500" { (budget.period.as_str()) }
                            }
                            (budget_progress_bar(budget))
                            div class="text-sm"
                            {
                                (format_currency(budget.spent_amount)) " of "
                                (format_currency(budget.budget_amount))
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders a card per savings goal with how close it is to its target.
pub(super) fn goal_cards_view(goals: &[Goal]) -> Markup {
    html! {
        section id="goals" class="space-y-4"
        {
            div class="flex justify-between items-baseline"
            {
                h2 class="text-xl font-semibold" { "Savings Goals" }
                a href=(endpoints::GOALS_VIEW) class=(LINK_STYLE) { "Manage" }
            }

            @if goals.is_empty() {
                p class="text-gray-500" { "No savings goals yet." }
            } @else {
                div class="grid grid-cols-1 md:grid-cols-2 gap-4"
                {
                    @for goal in goals {
                        div class={ (CARD_STYLE) " space-y-2" } data-goal-id=(goal.id)
                        {
                            div class="flex justify-between"
                            {
                                span class="font-semibold" { (goal.name) }
                                span class="text-sm text-gray-500"
                                {
                                    (format!("{:.0}%", goal.percent_complete()))
                                }
                            }
                            (goal_progress_bar(goal))
                            div class="text-sm"
                            {
                                (format_currency(goal.current_amount)) " of "
                                (format_currency(goal.target_amount))
                            }
                        }
                    }
                }
            }
        }
    }
}
