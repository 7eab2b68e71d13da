#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use db::{
    TEST_PASSWORD, create_other_user, create_test_user, get_test_app_state, get_test_connection,
    sign_in_test_server,
};
pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use http::{assert_content_type, get_header, parse_json_body};
