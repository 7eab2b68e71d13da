//! The settings page where users change how their name is shown.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    date::format_date,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        app_page, error_page, go_to_on_success,
    },
    user::{User, UserID, get_profile, profile::ProfileState},
};

/// Display the signed in user's profile in a form that saves through the
/// profile endpoint and then reloads the page from the store.
pub async fn get_settings_page(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    match load_user(&state, user_id) {
        Ok(user) => settings_view(&user).into_response(),
        Err(error) => error_page(error),
    }
}

fn load_user(state: &ProfileState, user_id: UserID) -> Result<User, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_profile(user_id, &connection)
}

fn settings_view(user: &User) -> Markup {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-lg font-semibold mb-4" { "Profile" }

            dl class="mb-6 text-sm space-y-1"
            {
                div class="flex gap-2"
                {
                    dt class="text-gray-500" { "Email" }
                    dd data-field="email" { (user.email) }
                }
                div class="flex gap-2"
                {
                    dt class="text-gray-500" { "Member since" }
                    dd { (format_date(user.created_at.date())) }
                }
            }

            form
                hx-put=(endpoints::PROFILE_API)
                hx-ext="json-enc"
                hx-swap="none"
                hx-on--after-request=(go_to_on_success(endpoints::SETTINGS_VIEW))
                class="grid gap-4 md:grid-cols-2"
            {
                div
                {
                    label for="firstName" class=(FORM_LABEL_STYLE) { "First name" }
                    input type="text" name="firstName" id="firstName" maxlength="255"
                        value=(user.first_name.as_deref().unwrap_or(""))
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="lastName" class=(FORM_LABEL_STYLE) { "Last name" }
                    input type="text" name="lastName" id="lastName" maxlength="255"
                        value=(user.last_name.as_deref().unwrap_or(""))
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div class="md:col-span-2"
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Display name" }
                    input type="text" name="name" id="name" maxlength="255" value=(user.name)
                        class=(FORM_TEXT_INPUT_STYLE);
                    p class="mt-1 text-xs text-gray-500"
                    {
                        "Leave blank to use your first and last name."
                    }
                }

                div class="md:col-span-2"
                {
                    p class="form-error text-red-500 text-sm" {}
                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save profile" }
                }
            }
        }
    };

    app_page("Settings", endpoints::SETTINGS_VIEW, &content)
}
