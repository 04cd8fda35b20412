//! Pure view derivation over the event collection.
//!
//! # Responsibility
//! - Filter by category, paginate and count pages for list display.
//! - Decide which calendar days the picker disables.
//!
//! # Invariants
//! - Functions never mutate input and never fail; out-of-range input yields
//!   empty output.
//! - Pages `1..=total_pages` partition the filtered list in order.

use crate::model::event::{Category, EventRecord};
use chrono::{Local, NaiveDate};

/// Number of events shown per list page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Filter label that matches every category.
pub const FILTER_ALL: &str = "All";

/// Category filter selected in the list view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
    /// A label outside the known set; matches nothing.
    Unmatched(String),
}

impl CategoryFilter {
    /// Parses a filter label such as `All` or `Work`.
    pub fn parse(value: &str) -> Self {
        if value == FILTER_ALL {
            return Self::All;
        }
        match Category::parse(value) {
            Some(category) => Self::Only(category),
            None => Self::Unmatched(value.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => FILTER_ALL,
            Self::Only(category) => category.as_str(),
            Self::Unmatched(label) => label.as_str(),
        }
    }

    pub fn matches(&self, event: &EventRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => event.category == *category,
            Self::Unmatched(_) => false,
        }
    }
}

/// Returns events matching `filter`, in collection order.
pub fn filter_by_category<'a>(
    events: &'a [EventRecord],
    filter: &CategoryFilter,
) -> Vec<&'a EventRecord> {
    events.iter().filter(|event| filter.matches(event)).collect()
}

/// Returns the 1-based `page` of `items`.
///
/// Page 0, pages past the end and a zero page size all yield an empty slice.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let Some(start) = (page - 1).checked_mul(page_size) else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `count` items; 0 for an empty list.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// Whether `date` lies strictly before `today` and is disabled for picking.
pub fn is_past_date(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

/// Current local calendar day, read from the wall clock on every call.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// One rendered page of the event list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<'a> {
    pub items: Vec<&'a EventRecord>,
    pub page: usize,
    pub total_pages: usize,
    /// Size of the filtered list across all pages.
    pub filtered_count: usize,
}

/// Filters, counts and slices in one step.
pub fn list_view<'a>(
    events: &'a [EventRecord],
    filter: &CategoryFilter,
    page: usize,
    page_size: usize,
) -> ListView<'a> {
    let filtered = filter_by_category(events, filter);
    ListView {
        items: paginate(&filtered, page, page_size).to_vec(),
        page,
        total_pages: total_pages(filtered.len(), page_size),
        filtered_count: filtered.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::{is_past_date, paginate, total_pages, CategoryFilter};
    use crate::model::event::Category;
    use chrono::NaiveDate;

    #[test]
    fn paginate_handles_out_of_range_pages() {
        let items = [1, 2, 3, 4, 5, 6];
        assert_eq!(paginate(&items, 1, 5), &[1, 2, 3, 4, 5]);
        assert_eq!(paginate(&items, 2, 5), &[6]);
        assert!(paginate(&items, 3, 5).is_empty());
        assert!(paginate(&items, 0, 5).is_empty());
        assert!(paginate(&items, 1, 0).is_empty());
        assert!(paginate(&items, usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(6, 0), 0);
    }

    #[test]
    fn filter_parse_maps_labels() {
        assert_eq!(CategoryFilter::parse("All"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("Personal"),
            CategoryFilter::Only(Category::Personal)
        );
        assert_eq!(
            CategoryFilter::parse("Travel"),
            CategoryFilter::Unmatched("Travel".to_string())
        );
    }

    #[test]
    fn past_dates_are_strictly_before_today() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert!(is_past_date(today.pred_opt().unwrap(), today));
        assert!(!is_past_date(today, today));
        assert!(!is_past_date(today.succ_opt().unwrap(), today));
    }
}
