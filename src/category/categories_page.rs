//! The page that lists categories with their spending figures.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    category::{Category, CategoryState, get_categories},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, app_page, error_page,
        format_currency,
    },
    timezone::current_local_date,
    user::UserID,
};

/// Display the signed in user's categories and a form for adding one.
pub async fn get_categories_page(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match load_categories(&state, user_id) {
        Ok(categories) => categories_view(&categories).into_response(),
        Err(error) => error_page(error),
    }
}

fn load_categories(state: &CategoryState, user_id: UserID) -> Result<Vec<Category>, Error> {
    let today = current_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_categories(user_id, today, &connection)
}

fn categories_view(categories: &[Category]) -> Markup {
    let content = html! {
        (new_category_form())

        div class="relative overflow-x-auto shadow-md rounded-lg"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class="px-6 py-4 text-right" { "Transactions" }
                        th scope="col" class="px-6 py-4 text-right" { "Total Spent" }
                        th scope="col" class="px-6 py-4 text-right" { "Average" }
                        th scope="col" class="px-6 py-4 text-right" { "This Month" }
                        th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                    }
                }

                tbody
                {
                    @for category in categories {
                        (category_row(category))
                    }

                    @if categories.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="7" class="px-6 py-4 text-center"
                            {
                                "No categories yet. Add one to see where your money goes."
                            }
                        }
                    }
                }
            }
        }
    };

    app_page("Categories", endpoints::CATEGORIES_VIEW, &content)
}

fn trend_view(trend: f64) -> Markup {
    let style = if trend > 0.0 {
        "text-red-600 dark:text-red-400"
    } else if trend < 0.0 {
        "text-green-600 dark:text-green-400"
    } else {
        "text-gray-500"
    };

    html! {
        span class=(style) { (format!("{trend:+.2}%")) }
    }
}

fn category_row(category: &Category) -> Markup {
    html! {
        tr class=(TABLE_ROW_STYLE) data-category-id=(category.id)
        {
            th scope="row" class="px-6 py-4 font-medium text-gray-900 dark:text-white"
            {
                span class="inline-flex items-center gap-2"
                {
                    span
                        class="inline-block w-3 h-3 rounded-full"
                        style={ "background-color: " (category.color) }
                    {}
                    (category.name)
                    span class="text-xs text-gray-400" { "(" (category.icon) ")" }
                }
            }
            td class=(TABLE_CELL_STYLE) { (category.description.as_deref().unwrap_or("")) }
            td class="px-6 py-4 text-right" { (category.transaction_count) }
            td class="px-6 py-4 text-right" { (format_currency(category.total_spent)) }
            td class="px-6 py-4 text-right" { (format_currency(category.avg_transaction)) }
            td class="px-6 py-4 text-right" { (trend_view(category.monthly_trend)) }
            td class="px-6 py-4 space-x-4 whitespace-nowrap"
            {
                a
                    href=(format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id))
                    class=(LINK_STYLE)
                {
                    "Edit"
                }
                button
                    class=(BUTTON_DELETE_STYLE)
                    hx-delete=(format_endpoint(endpoints::CATEGORY_API, category.id))
                    hx-confirm={ "Delete the category '" (category.name) "'? Its transactions keep their label." }
                    hx-target="closest tr"
                    hx-swap="delete"
                {
                    "Delete"
                }
            }
        }
    }
}

fn new_category_form() -> Markup {
    html! {
        details class="bg-white dark:bg-gray-800 rounded-lg shadow p-4"
        {
            summary class="cursor-pointer font-semibold" { "Add category" }

            form
                hx-post=(endpoints::CATEGORIES_API)
                hx-ext="json-enc"
                hx-swap="none"
                hx-on--after-request="if (event.detail.successful) window.location.reload()"
                class="grid gap-4 md:grid-cols-4 mt-4"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }
                    input type="text" name="name" id="name" maxlength="100" required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="color" class=(FORM_LABEL_STYLE) { "Color" }
                    input type="color" name="color" id="color" value="#3b82f6" required
                        class="block w-full h-10 rounded";
                }

                div
                {
                    label for="icon" class=(FORM_LABEL_STYLE) { "Icon" }
                    input type="text" name="icon" id="icon" maxlength="50" placeholder="cart"
                        required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                    input type="text" name="description" id="description" maxlength="500"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="md:col-span-4"
                {
                    p class="form-error text-red-500 text-sm" {}
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        category::{NewCategory, create_category},
        endpoints::{self, format_endpoint},
        test_utils::{assert_valid_html, sign_in_test_server},
    };

    #[tokio::test]
    async fn lists_categories_by_name() {
        let (server, state, user, cookie) = sign_in_test_server().await;
        {
            let connection = state.db_connection.lock().unwrap();
            for name in ["Travel", "Bills"] {
                create_category(
                    user.id,
                    NewCategory {
                        name: name.to_owned(),
                        color: "#123456".to_owned(),
                        icon: "tag".to_owned(),
                        description: None,
                    },
                    date!(2025 - 01 - 01),
                    &connection,
                )
                .unwrap();
            }
        }

        let response = server
            .get(endpoints::CATEGORIES_VIEW)
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        assert_valid_html(&document);
        let rows = Selector::parse("tr[data-category-id] th").unwrap();
        let names: Vec<String> = document
            .select(&rows)
            .map(|cell| cell.text().collect::<String>())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names[0].contains("Bills"), "got {names:?}");
        assert!(names[1].contains("Travel"), "got {names:?}");
    }

    #[tokio::test]
    async fn shows_empty_state() {
        let (server, _, _, cookie) = sign_in_test_server().await;

        let response = server
            .get(endpoints::CATEGORIES_VIEW)
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("No categories yet"));
    }

    #[tokio::test]
    async fn rows_link_to_edit_page() {
        let (server, state, user, cookie) = sign_in_test_server().await;
        let category = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                user.id,
                NewCategory {
                    name: "Rent".to_owned(),
                    color: "#123456".to_owned(),
                    icon: "home".to_owned(),
                    description: None,
                },
                date!(2025 - 01 - 01),
                &connection,
            )
            .unwrap()
        };

        let response = server
            .get(endpoints::CATEGORIES_VIEW)
            .add_cookie(cookie)
            .await;

        let document = Html::parse_document(&response.text());
        let links = Selector::parse("tr[data-category-id] a").unwrap();
        let hrefs: Vec<_> = document
            .select(&links)
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(
            hrefs,
            [format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id)]
        );
    }
}
