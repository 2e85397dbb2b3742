//! Page arithmetic shared by every list endpoint.

use std::num::IntErrorKind;

use serde::Serialize;

/// Page size used when the caller omits or mangles `page_size`.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A normalized, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request from raw query values.
    ///
    /// A page below 1 becomes 1 and a page beyond `u32::MAX` saturates, so
    /// it still lands past the end. A page size outside `[1, MAX_PAGE_SIZE]`
    /// falls back to [`DEFAULT_PAGE_SIZE`].
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page
            .filter(|p| *p >= 1)
            .map_or(1, |p| u32::try_from(p).unwrap_or(u32::MAX));
        let page_size = page_size
            .filter(|s| (1..=i64::from(MAX_PAGE_SIZE)).contains(s))
            .and_then(|s| u32::try_from(s).ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, page_size }
    }

    /// Parse `page` and `page_size` query strings, ignoring anything that is
    /// not an integer. Integers too large for `i64` saturate.
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> Self {
        Self::new(page.and_then(parse_saturating), page_size.and_then(parse_saturating))
    }

    pub const fn page(&self) -> u32 {
        self.page
    }

    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// SQL `LIMIT` value.
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// SQL `OFFSET` value.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    /// Pagination metadata for a result set of `total` rows.
    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            total,
            page: self.page,
            page_size: self.page_size,
            total_pages: total_pages(total, self.page_size),
        }
    }
}

/// Pagination fields flattened into every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
}

fn parse_saturating(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(v) => Some(v),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

/// `ceil(total / page_size)`, zero for an empty set.
pub fn total_pages(total: i64, page_size: u32) -> i64 {
    if total <= 0 || page_size == 0 {
        return 0;
    }
    let size = i64::from(page_size);
    (total + size - 1) / size
}
