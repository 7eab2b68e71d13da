//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validation of client input
//! - Database functions for storing, searching, summarizing and exporting transactions
//! - The JSON route handlers and the transactions page

mod api;
mod core;
mod export;
mod input;
mod query;
mod summary;
mod edit_page;
mod transactions_page;

pub use api::{
    DeleteResponse, create_transaction_endpoint, delete_transaction_endpoint,
    export_transactions_endpoint, get_category_breakdown_endpoint, get_summary_endpoint,
    list_transactions_endpoint, update_transaction_endpoint,
};
pub use core::{
    NewTransaction, Transaction, TransactionType, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, update_transaction,
};
pub use edit_page::get_edit_transaction_page;
pub use export::{export_file_name, get_export_rows, write_csv};
pub use input::TransactionInput;
pub use query::{TransactionFilter, TransactionQuery, count_transactions, list_transactions};
pub use summary::{CategoryBreakdown, TransactionSummary, get_category_breakdown, get_summary};
pub use transactions_page::get_transactions_page;
