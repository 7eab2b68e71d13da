//! Table views for dashboard data display.

use maud::{Markup, html};

use crate::{
    date::format_date,
    endpoints,
    html::{
        LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency,
    },
    transaction::Transaction,
};

const TABLE_CELL_GREEN_STYLE: &str = "text-green-600 dark:text-green-400";
const TABLE_CELL_RED_STYLE: &str = "text-red-600 dark:text-red-400";

/// Renders the most recent transactions, newest first.
pub(super) fn recent_transactions_table(transactions: &[Transaction]) -> Markup {
    html! {
        section id="recent-transactions" class="space-y-4"
        {
            div class="flex justify-between items-baseline"
            {
                h2 class="text-xl font-semibold" { "Recent Transactions" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            div class="overflow-x-auto rounded-lg shadow"
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
                            th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions {
                            tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
                            {
                                td class=(TABLE_CELL_STYLE) { (format_date(transaction.date)) }
                                td class=(TABLE_CELL_STYLE) { (transaction.description) }
                                td class=(TABLE_CELL_STYLE) { (transaction.category) }
                                td class={
                                    (TABLE_CELL_STYLE) " text-right "
                                    (amount_color_class(transaction))
                                }
                                {
                                    (format_currency(transaction.amount))
                                }
                            }
                        }

                        @if transactions.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td colspan="4" class={ (TABLE_CELL_STYLE) " text-center" }
                                {
                                    "No transactions yet."
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn amount_color_class(transaction: &Transaction) -> &'static str {
    if transaction.amount.is_negative() {
        TABLE_CELL_RED_STYLE
    } else {
        TABLE_CELL_GREEN_STYLE
    }
}
