//! The JSON route handlers for categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    category::{
        Category, CategoryInput, create_category, delete_category, get_categories, update_category,
    },
    extract::{Json, MessageResponse, parse_id},
    timezone::current_local_date,
    user::UserID,
};

/// The state needed by the category API.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The timezone that decides which month is the current one.
    pub local_timezone: String,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The response to listing categories.
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    /// The user's categories ordered by name.
    pub categories: Vec<Category>,
    /// A human readable status message.
    pub message: &'static str,
}

/// The response to creating or updating a category.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    /// The category as stored.
    pub category: Category,
    /// A human readable status message.
    pub message: &'static str,
}

/// A route handler for listing the signed in user's categories.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<CategoriesResponse>, Error> {
    let today = current_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    Ok(Json(CategoriesResponse {
        categories: get_categories(user_id, today, &connection)?,
        message: "Categories retrieved successfully",
    }))
}

/// A route handler for creating a category. Responds with 201 and the stored category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Json(input): Json<CategoryInput>,
) -> Result<Response, Error> {
    let new_category = input.validate()?;
    let today = current_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let category = create_category(user_id, new_category, today, &connection)?;
    tracing::debug!("User {user_id} created category {}", category.id);

    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            category,
            message: "Category created successfully",
        }),
    )
        .into_response())
}

/// A route handler for changing some of the fields of a category.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<String>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<CategoryResponse>, Error> {
    let category_id = parse_id(&category_id, "category")?;
    let update = input.validate_update()?;
    let today = current_local_date(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    Ok(Json(CategoryResponse {
        category: update_category(user_id, category_id, update, today, &connection)?,
        message: "Category updated successfully",
    }))
}

/// A route handler for deleting a category.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<String>,
) -> Result<Json<MessageResponse>, Error> {
    let category_id = parse_id(&category_id, "category")?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_category(user_id, category_id, &connection)?;
    tracing::debug!("User {user_id} deleted category {category_id}");

    Ok(Json(MessageResponse {
        message: "Category deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::{
        category::{CategoryInput, create_category},
        endpoints::{self, format_endpoint},
        test_utils::{create_other_user, sign_in_test_server},
    };

    fn groceries() -> Value {
        json!({ "name": "Groceries", "color": "#22c55e", "icon": "cart" })
    }

    #[tokio::test]
    async fn create_then_list() {
        let (server, _, _, cookie) = sign_in_test_server().await;

        let response = server
            .post(endpoints::CATEGORIES_API)
            .add_cookie(cookie.clone())
            .json(&groceries())
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["message"], "Category created successfully");
        assert_eq!(body["category"]["name"], "Groceries");
        assert_eq!(body["category"]["totalSpent"], "0.00");
        assert_eq!(body["category"]["description"], Value::Null);

        let response = server
            .get(endpoints::CATEGORIES_API)
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Categories retrieved successfully");
        assert_eq!(body["categories"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_without_icon_is_bad_request() {
        let (server, _, _, cookie) = sign_in_test_server().await;

        let response = server
            .post(endpoints::CATEGORIES_API)
            .add_cookie(cookie)
            .json(&json!({ "name": "Groceries", "color": "#22c55e" }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let (server, _, _, cookie) = sign_in_test_server().await;
        let created: Value = server
            .post(endpoints::CATEGORIES_API)
            .add_cookie(cookie.clone())
            .json(&groceries())
            .await
            .json();
        let id = created["category"]["id"].as_i64().unwrap();

        let response = server
            .put(&format_endpoint(endpoints::CATEGORY_API, id))
            .add_cookie(cookie)
            .json(&json!({ "name": "Food" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Category updated successfully");
        assert_eq!(body["category"]["name"], "Food");
        assert_eq!(body["category"]["icon"], "cart");
    }

    #[tokio::test]
    async fn non_integer_id_is_bad_request() {
        let (server, _, _, cookie) = sign_in_test_server().await;

        let response = server
            .delete("/api/categories/abc")
            .add_cookie(cookie)
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid category ID");
    }

    #[tokio::test]
    async fn deleting_another_users_category_is_not_found() {
        let (server, state, _, cookie) = sign_in_test_server().await;
        let others_category = {
            let connection = state.db_connection.lock().unwrap();
            let other = create_other_user(&connection, "other@example.com");
            let input: CategoryInput = serde_json::from_value(groceries()).unwrap();
            create_category(other.id, input.validate().unwrap(), date!(2025 - 01 - 01), &connection)
                .unwrap()
        };

        let response = server
            .delete(&format_endpoint(endpoints::CATEGORY_API, others_category.id))
            .add_cookie(cookie)
            .await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["error"], "Category not found");
    }

    #[tokio::test]
    async fn delete_reports_success() {
        let (server, _, _, cookie) = sign_in_test_server().await;
        let created: Value = server
            .post(endpoints::CATEGORIES_API)
            .add_cookie(cookie.clone())
            .json(&groceries())
            .await
            .json();
        let id = created["category"]["id"].as_i64().unwrap();

        let response = server
            .delete(&format_endpoint(endpoints::CATEGORY_API, id))
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body, json!({ "message": "Category deleted successfully" }));
    }

    #[tokio::test]
    async fn requires_session() {
        let (server, _, _, _) = sign_in_test_server().await;

        let response = server.get(endpoints::CATEGORIES_API).await;

        response.assert_status_unauthorized();
    }
}
