//! Page links for tables that are paged with a limit and an offset.

use maud::{Markup, html};

/// The maximum number of numbered page links to show at once.
pub const MAX_PAGE_LINKS: u64 = 5;

/// One element of the row of page links under a table.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    /// A link to another page.
    Page(u64),
    /// The page being shown.
    CurrPage(u64),
    /// A gap in the page numbers.
    Ellipsis,
    /// A link to the page after the current one.
    NextButton(u64),
    /// A link to the page before the current one.
    BackButton(u64),
}

/// The 1-based page that starts at `offset` for pages of `limit` rows.
pub fn page_for_offset(offset: u64, limit: u64) -> u64 {
    offset / limit.max(1) + 1
}

/// The offset of the first row on the 1-based `page`.
pub fn offset_for_page(page: u64, limit: u64) -> u64 {
    page.saturating_sub(1) * limit
}

/// The number of pages needed for `total` rows. There is always at least one page.
pub fn page_count(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit.max(1)).max(1)
}

/// Choose which page links to show for `curr_page` out of `page_count` pages.
///
/// At most `max_pages` numbered links are shown around the current page. The
/// first and last pages are always reachable.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let half = max_pages / 2;
    let (first, last) = if page_count <= max_pages {
        (1, page_count)
    } else if curr_page <= half {
        (1, max_pages)
    } else if curr_page > page_count - half {
        (page_count - max_pages + 1, page_count)
    } else {
        (curr_page - half, curr_page + half)
    };

    let mut indicators = Vec::new();

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if first > 1 {
        indicators.push(PaginationIndicator::Page(1));
        indicators.push(PaginationIndicator::Ellipsis);
    }

    indicators.extend((first..=last).map(|page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    }));

    if last < page_count {
        indicators.push(PaginationIndicator::Ellipsis);
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Render `indicators` as a row of links, where `href` gives the URL of a page.
pub fn pagination_html(indicators: &[PaginationIndicator], href: impl Fn(u64) -> String) -> Markup {
    const LINK: &str = "px-3 py-1 rounded text-blue-600 hover:bg-gray-100 \
        dark:text-blue-400 dark:hover:bg-gray-700";
    const CURRENT: &str = "px-3 py-1 rounded bg-blue-600 text-white";

    html! {
        nav aria-label="Pagination" class="flex justify-center mt-4"
        {
            ul class="inline-flex items-center gap-1 text-sm"
            {
                @for indicator in indicators {
                    li {
                        @match indicator {
                            PaginationIndicator::Page(page) => {
                                a href=(href(*page)) class=(LINK) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span aria-current="page" class=(CURRENT) { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="px-2 text-gray-500" { "…" }
                            }
                            PaginationIndicator::BackButton(page) => {
                                a href=(href(*page)) class=(LINK) { "Back" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(href(*page)) class=(LINK) { "Next" }
                            }
                        }
                    }
                }
            }
        }
    }
}
