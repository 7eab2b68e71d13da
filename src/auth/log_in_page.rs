//! The log-in page, which also lets new users create an account.

use axum::response::{IntoResponse, Response};
use maud::{Markup, PreEscaped, html};
use serde::Deserialize;

use crate::{
    endpoints,
    extract::Query,
    html::{
        BUTTON_PRIMARY_STYLE, HeadElement, SHOW_ERROR_SCRIPT, base, labelled_input, log_in_card,
    },
};

use super::sign_in::safe_redirect_url;

/// The query string for the log-in page.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    /// The page to return to after logging in.
    pub redirect_url: Option<String>,
}

fn log_in_form(redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::SIGN_IN_API)
            hx-ext="json-enc"
            hx-swap="none"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirectUrl" value=(redirect_url);
            }

            (labelled_input("email", "email", "Email", "name@example.com"))
            (labelled_input("password", "password", "Password", "••••••••"))

            div class="flex items-center gap-x-3"
            {
                input type="checkbox" name="rememberMe" id="rememberMe" class="rounded-xs";
                label for="rememberMe" class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            p class="form-error text-red-500 text-base" {}

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log in" }
        }
    }
}

fn sign_up_form() -> Markup {
    html! {
        details
        {
            summary class="text-sm font-light text-gray-500 dark:text-gray-400 cursor-pointer"
            {
                "Don't have an account? Create one"
            }

            form
                hx-post=(endpoints::SIGN_UP_API)
                hx-ext="json-enc"
                hx-swap="none"
                hx-on--after-request="if (event.detail.successful) window.location.assign('/dashboard')"
                class="space-y-4 md:space-y-6 mt-4"
            {
                (labelled_input("text", "name", "Name", "Jane Doe"))
                (labelled_input("email", "email", "Email", "name@example.com"))
                (labelled_input("password", "password", "Password", "••••••••"))

                p class="form-error text-red-500 text-base" {}

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create account" }
            }
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = safe_redirect_url(query.redirect_url.as_deref());
    let content = html! {
        (log_in_form(redirect_url.as_deref()))
        (sign_up_form())
    };
    let content = log_in_card("Log in to your account", &content);
    let head = [HeadElement::ScriptSource(PreEscaped(SHOW_ERROR_SCRIPT.to_owned()))];

    base("Log In", &head, &content).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::Response};
    use scraper::Selector;

    use crate::{
        endpoints,
        extract::Query,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{RedirectQuery, get_log_in_page};

    async fn render(redirect_url: Option<&str>) -> Response {
        get_log_in_page(Query(RedirectQuery {
            redirect_url: redirect_url.map(str::to_owned),
        }))
        .await
    }

    #[tokio::test]
    async fn renders_log_in_form() {
        let response = render(None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let selector = Selector::parse("form").unwrap();
        let forms: Vec<_> = document.select(&selector).collect();
        assert_eq!(forms.len(), 2, "want log-in and sign-up forms");
        assert_eq!(forms[0].value().attr("hx-post"), Some(endpoints::SIGN_IN_API));
        assert_eq!(forms[1].value().attr("hx-post"), Some(endpoints::SIGN_UP_API));
    }

    #[tokio::test]
    async fn keeps_safe_redirect_url() {
        let document = parse_html_document(render(Some("/goals")).await).await;

        let selector = Selector::parse("input[name=redirectUrl]").unwrap();
        let input = document.select(&selector).next().expect("no redirect input");
        assert_eq!(input.value().attr("value"), Some("/goals"));
    }

    #[tokio::test]
    async fn drops_offsite_redirect_url() {
        let document = parse_html_document(render(Some("https://evil.example")).await).await;

        let selector = Selector::parse("input[name=redirectUrl]").unwrap();
        assert!(document.select(&selector).next().is_none());
    }
}
