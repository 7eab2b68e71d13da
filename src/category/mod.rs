//! Categories for organizing transactions, with spending figures computed from
//! the transactions that carry each category's name.

mod api;
mod categories_page;
mod db;
mod domain;
mod edit_page;

pub use api::{
    CategoriesResponse, CategoryResponse, CategoryState, create_category_endpoint,
    delete_category_endpoint, list_categories_endpoint, update_category_endpoint,
};
pub use categories_page::get_categories_page;
pub use db::{
    create_category, create_category_table, delete_category, get_categories, get_category,
    update_category,
};
pub use domain::{Category, CategoryInput, CategoryUpdate, NewCategory};
pub use edit_page::get_edit_category_page;
