//! Defines the route handler for the page that displays transactions as a table.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    AppState, Error,
    date::format_date,
    endpoints::{self, format_endpoint},
    extract::Query,
    html::{
        BADGE_STYLE, BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        app_page, error_page, format_currency,
    },
    pagination::{
        MAX_PAGE_LINKS, create_pagination_indicators, offset_for_page, page_count,
        page_for_offset, pagination_html,
    },
    timezone::current_local_date,
    transaction::{
        Transaction, TransactionFilter, TransactionQuery, TransactionType, count_transactions,
        get_category_breakdown, list_transactions,
    },
    user::UserID,
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The timezone used for the default date of new transactions.
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string of a link to another page of the table.
#[derive(Serialize)]
struct PageLinkQuery<'a> {
    search: Option<&'a str>,
    category: Option<&'a str>,
    #[serde(rename = "type")]
    transaction_type: Option<&'a str>,
    limit: u32,
    offset: u64,
}

fn page_link(filter: &TransactionFilter, offset: u64) -> String {
    let query = PageLinkQuery {
        search: filter.search.as_deref(),
        category: filter.category.as_deref(),
        transaction_type: filter.transaction_type.map(TransactionType::as_str),
        limit: filter.limit,
        offset,
    };

    match serde_urlencoded::to_string(&query) {
        Ok(query_string) => format!("{}?{query_string}", endpoints::TRANSACTIONS_VIEW),
        Err(error) => {
            tracing::error!("Could not build page link: {error}");
            endpoints::TRANSACTIONS_VIEW.to_owned()
        }
    }
}

struct TransactionsPageData {
    transactions: Vec<Transaction>,
    total: u64,
    category_labels: Vec<String>,
    today: Date,
}

/// Display a page of the signed in user's transactions with a filter form and
/// a form for recording new transactions.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionQuery>,
) -> Response {
    let filter = match TransactionFilter::try_from(query) {
        Ok(filter) => filter,
        Err(error) => return error_page(error),
    };

    match load_page_data(&state, user_id, &filter) {
        Ok(data) => transactions_view(&filter, &data).into_response(),
        Err(error) => error_page(error),
    }
}

fn load_page_data(
    state: &TransactionsPageState,
    user_id: UserID,
    filter: &TransactionFilter,
) -> Result<TransactionsPageData, Error> {
    let today = current_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    Ok(TransactionsPageData {
        transactions: list_transactions(user_id, filter, &connection)?,
        total: count_transactions(user_id, filter, &connection)?,
        category_labels: get_category_breakdown(user_id, &connection)?
            .into_iter()
            .map(|breakdown| breakdown.category)
            .collect(),
        today,
    })
}

fn transactions_view(filter: &TransactionFilter, data: &TransactionsPageData) -> Markup {
    let limit = u64::from(filter.limit);
    let current_page = page_for_offset(u64::from(filter.offset), limit);
    let indicators =
        create_pagination_indicators(current_page, page_count(data.total, limit), MAX_PAGE_LINKS);

    let content = html! {
        div class="flex justify-between items-center"
        {
            p class="text-gray-600 dark:text-gray-400" { (data.total) " transactions" }
            a href=(endpoints::TRANSACTION_EXPORT_API) class=(LINK_STYLE) { "Export CSV" }
        }

        (new_transaction_form(data))
        (filter_form(filter, &data.category_labels))

        div class="relative overflow-x-auto shadow-md rounded-lg"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-4 text-right" { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                    }
                }

                tbody
                {
                    @for transaction in &data.transactions {
                        (transaction_row(transaction))
                    }

                    @if data.transactions.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="5" class="px-6 py-4 text-center" { "No transactions found." }
                        }
                    }
                }
            }
        }

        (pagination_html(&indicators, |page| page_link(filter, offset_for_page(page, limit))))
    };

    app_page("Transactions", endpoints::TRANSACTIONS_VIEW, &content)
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let amount_style = match transaction.transaction_type {
        TransactionType::Income => "px-6 py-4 text-right text-green-600 dark:text-green-400",
        TransactionType::Expense => "px-6 py-4 text-right text-red-600 dark:text-red-400",
    };
    let delete_url = format!("{}?id={}", endpoints::TRANSACTIONS_API, transaction.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE) { (format_date(transaction.date)) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE)
            {
                span class={ (BADGE_STYLE) " bg-blue-100 text-blue-800 dark:bg-blue-900 dark:text-blue-300" }
                {
                    (transaction.category)
                }
            }
            td class=(amount_style) { (format_currency(transaction.amount)) }
            td class="px-6 py-4 space-x-4 whitespace-nowrap"
            {
                a
                    href=(format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id))
                    class=(LINK_STYLE)
                {
                    "Edit"
                }
                button
                    class=(BUTTON_DELETE_STYLE)
                    hx-delete=(delete_url)
                    hx-confirm="Delete this transaction?"
                    hx-target="closest tr"
                    hx-swap="delete"
                {
                    "Delete"
                }
            }
        }
    }
}

fn filter_form(filter: &TransactionFilter, category_labels: &[String]) -> Markup {
    let selected_type = filter.transaction_type.map(TransactionType::as_str);

    html! {
        form method="get" action=(endpoints::TRANSACTIONS_VIEW) class="grid gap-4 md:grid-cols-4 items-end"
        {
            div
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    type="search"
                    name="search"
                    id="search"
                    value=[filter.search.as_deref()]
                    placeholder="Description"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category-filter" class=(FORM_LABEL_STYLE) { "Category" }
                select name="category" id="category-filter" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="All" { "All" }
                    @for label in category_labels {
                        option value=(label) selected[filter.category.as_deref() == Some(label.as_str())] { (label) }
                    }
                }
            }

            div
            {
                label for="type-filter" class=(FORM_LABEL_STYLE) { "Type" }
                select name="type" id="type-filter" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="all" { "All" }
                    option value="income" selected[selected_type == Some("income")] { "Income" }
                    option value="expense" selected[selected_type == Some("expense")] { "Expense" }
                }
            }

            input type="hidden" name="limit" value=(filter.limit);

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
        }
    }
}

fn new_transaction_form(data: &TransactionsPageData) -> Markup {
    html! {
        details class="bg-white dark:bg-gray-800 rounded-lg shadow p-4"
        {
            summary class="cursor-pointer font-semibold" { "Add transaction" }

            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-ext="json-enc"
                hx-swap="none"
                hx-on--after-request="if (event.detail.successful) window.location.reload()"
                class="grid gap-4 md:grid-cols-3 mt-4"
            {
                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                    input type="text" name="description" id="description" maxlength="255"
                        required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                    input type="text" name="category" id="category" list="category-labels"
                        maxlength="100" required class=(FORM_TEXT_INPUT_STYLE);
                    datalist id="category-labels"
                    {
                        @for label in &data.category_labels {
                            option value=(label) {}
                        }
                    }
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                    input type="number" name="amount" id="amount" step="0.01" min="0.01"
                        required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                    input type="date" name="date" id="date" value=(format_date(data.today))
                        required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="type" class=(FORM_LABEL_STYLE) { "Type" }
                    select name="type" id="type" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="expense" { "Expense" }
                        option value="income" { "Income" }
                    }
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
