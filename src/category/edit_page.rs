//! The page for renaming or restyling a category.

use axum::{
    Extension,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    category::{Category, CategoryState, get_category},
    endpoints::{self, format_endpoint},
    extract::parse_id,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, app_page, error_page, go_to_on_success,
    },
    timezone::current_local_date,
    user::UserID,
};

/// Display a form prefilled with the stored category.
pub async fn get_edit_category_page(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<String>,
) -> Response {
    match load_category(&state, user_id, &category_id) {
        Ok(category) => edit_category_view(&category).into_response(),
        Err(error) => error_page(error),
    }
}

fn load_category(state: &CategoryState, user_id: UserID, raw_id: &str) -> Result<Category, Error> {
    let id = parse_id(raw_id, "category")?;
    let today = current_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_category(user_id, id, today, &connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingCategory,
        error => error,
    })
}

fn edit_category_view(category: &Category) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(format_endpoint(endpoints::CATEGORY_API, category.id))
                hx-ext="json-enc"
                hx-swap="none"
                hx-on--after-request=(go_to_on_success(endpoints::CATEGORIES_VIEW))
                class="grid gap-4 md:grid-cols-2"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }
                    input type="text" name="name" id="name" maxlength="100" value=(category.name)
                        required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="icon" class=(FORM_LABEL_STYLE) { "Icon" }
                    input type="text" name="icon" id="icon" maxlength="50" value=(category.icon)
                        required class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="color" class=(FORM_LABEL_STYLE) { "Color" }
                    input type="color" name="color" id="color" value=(category.color) required
                        class="block w-full h-10 rounded";
                }

                div
                {
                    // Leaving this blank clears the description.
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                    input type="text" name="description" id="description" maxlength="500"
                        value=(category.description.as_deref().unwrap_or(""))
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="md:col-span-2 space-y-2"
                {
                    p class="form-error text-red-500 text-sm" {}
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save changes" }
                    a href=(endpoints::CATEGORIES_VIEW) class=(LINK_STYLE) { "Cancel" }
                }
            }
        }
    };

    app_page("Edit Category", endpoints::CATEGORIES_VIEW, &content)
}
