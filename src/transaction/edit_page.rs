//! The page for changing a recorded transaction.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    date::format_date,
    endpoints,
    extract::parse_id,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, app_page, error_page, go_to_on_success,
    },
    transaction::{
        Transaction, TransactionType, get_transaction, transactions_page::TransactionsPageState,
    },
    user::UserID,
};

/// Display a form prefilled with the stored transaction. Saving sends the
/// form to the update endpoint and then returns to the transactions page.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<String>,
) -> Response {
    match load_transaction(&state, user_id, &transaction_id) {
        Ok(transaction) => edit_transaction_view(&transaction).into_response(),
        Err(error) => error_page(error),
    }
}

fn load_transaction(
    state: &TransactionsPageState,
    user_id: UserID,
    raw_id: &str,
) -> Result<Transaction, Error> {
    let id = parse_id(raw_id, "transaction")?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_transaction(user_id, id, &connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        error => error,
    })
}

fn edit_transaction_view(transaction: &Transaction) -> Markup {
    let is_income = transaction.transaction_type == TransactionType::Income;

    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(endpoints::TRANSACTIONS_API)
                hx-ext="json-enc"
                hx-swap="none"
                hx-on--after-request=(go_to_on_success(endpoints::TRANSACTIONS_VIEW))
                class="grid gap-4 md:grid-cols-2"
            {
                input type="hidden" name="id" value=(transaction.id);

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                    input type="text" name="description" id="description" maxlength="255"
                        value=(transaction.description) required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }
                    input type="text" name="category" id="category" maxlength="100"
                        value=(transaction.category) required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                    input type="number" name="amount" id="amount" step="0.01" min="0.01"
                        value=(transaction.amount.abs().to_string()) required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }
                    input type="date" name="date" id="date" value=(format_date(transaction.date))
                        required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="type" class=(FORM_LABEL_STYLE) { "Type" }
                    select name="type" id="type" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="expense" selected[!is_income] { "Expense" }
                        option value="income" selected[is_income] { "Income" }
                    }
                }

                div class="md:col-span-2 space-y-2"
                {
                    p class="form-error text-red-500 text-sm" {}
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save changes" }
                    a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Cancel" }
                }
            }
        }
    };

    app_page("Edit Transaction", endpoints::TRANSACTIONS_VIEW, &content)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use scraper::{Html, Selector};
    use serde_json::json;
    use time::macros::date;

    use crate::{
        endpoints::{self, format_endpoint},
        money::Amount,
        test_utils::{assert_valid_html, create_other_user, sign_in_test_server},
        transaction::{NewTransaction, TransactionType, create_transaction, get_transaction},
    };

    fn rent() -> NewTransaction {
        NewTransaction {
            description: "Rent".to_owned(),
            category: "Housing".to_owned(),
            amount: Amount::from_cents(120_050),
            date: date!(2025 - 02 - 01),
            transaction_type: TransactionType::Expense,
        }
    }

    fn field_value(document: &Html, name: &str) -> Option<String> {
        let selector = Selector::parse(&format!("input[name={name}]")).unwrap();
        document
            .select(&selector)
            .next()
            .and_then(|input| input.value().attr("value"))
            .map(str::to_owned)
    }

    #[tokio::test]
    async fn form_is_prefilled_from_the_store() {
        let (server, state, user, cookie) = sign_in_test_server().await;
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(user.id, rent(), &connection).unwrap()
        };

        let response = server
            .get(&format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id))
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        assert_valid_html(&document);
        let form = Selector::parse("form[hx-put]").unwrap();
        let form = document.select(&form).next().expect("no edit form");
        assert_eq!(form.value().attr("hx-put"), Some(endpoints::TRANSACTIONS_API));
        assert_eq!(field_value(&document, "id"), Some(transaction.id.to_string()));
        assert_eq!(field_value(&document, "description").as_deref(), Some("Rent"));
        assert_eq!(field_value(&document, "amount").as_deref(), Some("1200.50"));
        assert_eq!(field_value(&document, "date").as_deref(), Some("2025-02-01"));
        let selected = Selector::parse("select[name=type] option[selected]").unwrap();
        let selected: Vec<_> = document
            .select(&selected)
            .filter_map(|option| option.value().attr("value"))
            .collect();
        assert_eq!(selected, ["expense"]);
    }

    #[tokio::test]
    async fn submitted_form_is_stored() {
        let (server, state, user, cookie) = sign_in_test_server().await;
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(user.id, rent(), &connection).unwrap()
        };

        // json-enc sends every form value as a string.
        let response = server
            .put(endpoints::TRANSACTIONS_API)
            .add_cookie(cookie)
            .json(&json!({
                "id": transaction.id.to_string(),
                "description": "Rent (March)",
                "category": "Housing",
                "amount": "1250.00",
                "date": "2025-03-01",
                "type": "expense",
            }))
            .await;

        response.assert_status_ok();
        let connection = state.db_connection.lock().unwrap();
        let stored = get_transaction(user.id, transaction.id, &connection).unwrap();
        assert_eq!(stored.description, "Rent (March)");
        assert_eq!(stored.amount, Amount::from_cents(-125_000));
    }

    #[tokio::test]
    async fn other_users_transaction_is_not_found() {
        let (server, state, _, cookie) = sign_in_test_server().await;
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            let other = create_other_user(&connection, "other@example.com");
            create_transaction(other.id, rent(), &connection).unwrap()
        };

        let response = server
            .get(&format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id))
            .add_cookie(cookie)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("Transaction not found"));
    }

    #[tokio::test]
    async fn malformed_id_is_bad_request() {
        let (server, _, _, cookie) = sign_in_test_server().await;

        let response = server
            .get("/transactions/abc/edit")
            .add_cookie(cookie)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
