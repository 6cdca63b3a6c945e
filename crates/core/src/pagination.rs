//! Offset/limit pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Pagination parameters.
///
/// `page` is 1-based. A `limit` of zero means "no limit": everything is one page.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub direction: SortDirection,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            direction: SortDirection::Asc,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit),
            direction: SortDirection::Asc,
        }
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn is_unlimited(&self) -> bool {
        self.limit == 0
    }

    pub fn offset(&self) -> u64 {
        if self.is_unlimited() {
            return 0;
        }
        u64::from(self.page.max(1) - 1) * u64::from(self.limit)
    }

    /// Slice an already filtered and sorted collection.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        if self.is_unlimited() {
            return items;
        }
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(self.limit as usize).collect()
    }
}

/// Number of pages for `total_data` rows at `limit` rows per page.
pub fn total_page(total_data: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 1;
    }
    total_data.div_ceil(u64::from(limit))
}

/// One page of results plus the totals computed alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_data: u64,
    pub total_page: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_data: u64, pagination: &Pagination) -> Self {
        Self {
            items,
            page: pagination.page,
            limit: pagination.limit,
            total_data,
            total_page: total_page(total_data, pagination.limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_data: self.total_data,
            total_page: self.total_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ninety_five_rows_at_ten_per_page_is_ten_pages() {
        assert_eq!(total_page(95, 10), 10);
    }

    #[test]
    fn unlimited_is_a_single_page() {
        assert_eq!(total_page(95, 0), 1);
        assert_eq!(total_page(0, 0), 1);
    }

    #[test]
    fn offset_is_zero_based() {
        let p = Pagination::new(Some(3), Some(10), 10);
        assert_eq!(p.offset(), 20);
        let first = Pagination::new(None, Some(10), 10);
        assert_eq!(first.offset(), 0);
    }

    #[test]
    fn page_zero_is_clamped_to_first_page() {
        let p = Pagination::new(Some(0), Some(5), 10);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn apply_slices_the_requested_window() {
        let p = Pagination::new(Some(2), Some(3), 10);
        assert_eq!(p.apply((1..=8).collect()), vec![4, 5, 6]);
        let unlimited = Pagination::new(Some(4), Some(0), 10);
        assert_eq!(unlimited.apply((1..=4).collect()), vec![1, 2, 3, 4]);
    }

    proptest! {
        #[test]
        fn total_page_covers_every_row(total in 0u64..100_000, limit in 1u32..500) {
            let pages = total_page(total, limit);
            prop_assert!(pages * u64::from(limit) >= total);
            if pages > 0 {
                prop_assert!((pages - 1) * u64::from(limit) < total);
            }
        }
    }
}
