//! In-memory list pipeline: free-text search, field filters, pagination.
//!
//! Every entity list view runs the same loop: fetch the whole list, filter it
//! in memory, slice out one page, and re-run from scratch after any mutation
//! or filter change. [`ListQuery`] captures that contract once; entities
//! plug in via [`Searchable`] and per-view predicates.
//!
//! Page indexes are 0-based everywhere.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{PerformanceMetric, Stock, TransactionLog, Vendor, Zone};

/// An entity the free-text search can run over.
///
/// # Contract
///
/// [`search_fields`](Searchable::search_fields) returns the fixed set of
/// stringified fields the search matches against (names, categories, numeric
/// ids coerced to strings). A record is retained if ANY field contains the
/// needle, case-insensitively.
pub trait Searchable {
    /// The stringified fields free-text search runs over.
    fn search_fields(&self) -> Vec<String>;
}

impl Searchable for Zone {
    fn search_fields(&self) -> Vec<String> {
        vec![self.zone_name.clone(), self.zone_id.to_string()]
    }
}

impl Searchable for Vendor {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.vendor_name.clone(),
            self.vendor_id.to_string(),
            self.contact_info.to_string(),
            self.vendor_email.clone(),
        ]
    }
}

impl Searchable for Stock {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.stock_name.clone(),
            self.stock_category.clone(),
            self.zone_id.to_string(),
            self.vendor_id.to_string(),
        ]
    }
}

impl Searchable for TransactionLog {
    fn search_fields(&self) -> Vec<String> {
        vec![self.transaction_type.clone()]
    }
}

impl Searchable for PerformanceMetric {
    fn search_fields(&self) -> Vec<String> {
        vec![self.metric_type.clone()]
    }
}

/// One display page plus the pagination totals the view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The records on the current page, in original relative order.
    pub items: Vec<T>,
    /// Size of the filtered set before slicing.
    pub total: usize,
    /// The (possibly clamped) 0-based page index actually shown.
    pub page_index: usize,
    /// `ceil(total / page_size)`; 0 when the filtered set is empty.
    pub total_pages: usize,
}

/// Reusable search-and-paginate state for one list view.
///
/// The query owns the current search string, page size and page index;
/// [`run`](ListQuery::run) applies them to a freshly fetched list. Running is
/// the only place the page index gets clamped, so the displayed page is
/// always consistent with the latest inputs.
#[derive(Debug, Clone)]
pub struct ListQuery {
    search: String,
    page_size: usize,
    page_index: usize,
}

impl ListQuery {
    /// A query with no search text, starting on the first page.
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            page_size: page_size.max(1),
            page_index: 0,
        }
    }

    /// The current search needle.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// The current 0-based page index.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Replace the search text. A new search always resets to the first
    /// page; a page change alone never touches the search.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page_index = 0;
    }

    /// Jump to a page. Out-of-range values are clamped on the next run.
    pub fn set_page(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    /// Change the page size (minimum 1), keeping the current page to be
    /// re-clamped on the next run.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    /// Run the full pipeline: search, slice, clamp.
    pub fn run<T: Searchable + Clone>(&mut self, items: &[T]) -> Page<T> {
        self.run_where(items, |_| true)
    }

    /// Run the pipeline with an extra per-view predicate (equality filters,
    /// usage bands, date ranges). The predicate ANDs with the search.
    pub fn run_where<T, F>(&mut self, items: &[T], keep: F) -> Page<T>
    where
        T: Searchable + Clone,
        F: Fn(&T) -> bool,
    {
        let needle = self.search.trim().to_lowercase();
        let filtered: Vec<&T> = items
            .iter()
            .filter(|item| {
                if !keep(item) {
                    return false;
                }
                if needle.is_empty() {
                    return true;
                }
                item.search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect();

        let total = filtered.len();
        let total_pages = total.div_ceil(self.page_size);

        // Clamp into the valid range so a shrinking filter never leaves the
        // view on a page past the end.
        if total_pages == 0 {
            self.page_index = 0;
        } else if self.page_index >= total_pages {
            self.page_index = total_pages - 1;
        }

        let start = self.page_index * self.page_size;
        let items = filtered
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();

        Page {
            items,
            total,
            page_index: self.page_index,
            total_pages,
        }
    }
}

/// Equality filter helper: a selection of 0 means "no filter".
pub fn id_matches(selected: i64, actual: i64) -> bool {
    selected == 0 || selected == actual
}

/// Range filter helper: `None` bounds mean "no filter" on that side.
pub fn price_in_range(price: f64, min: Option<f64>, max: Option<f64>) -> bool {
    if let Some(min) = min
        && price < min
    {
        return false;
    }
    if let Some(max) = max
        && price > max
    {
        return false;
    }
    true
}

/// Inclusive calendar-day range over record timestamps.
///
/// A `start` bound admits instants from that day's midnight UTC; an `end`
/// bound admits instants through the end of that day. Unset bounds admit
/// everything on their side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let day = instant.date_naive();
        if let Some(start) = self.start
            && day < start
        {
            return false;
        }
        if let Some(end) = self.end
            && day > end
        {
            return false;
        }
        true
    }
}

/// Timeline ordering: a copy of the list sorted newest first.
pub fn latest_first(items: &[TransactionLog]) -> Vec<TransactionLog> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}
