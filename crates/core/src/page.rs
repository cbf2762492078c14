//! Pagination primitives shared by list endpoints.

use serde::{Deserialize, Serialize};

const DEFAULT_PER_PAGE: u64 = 25;
const MAX_PER_PAGE: u64 = 100;

/// Caller-supplied pagination parameters.
///
/// Both fields are 1-based; out-of-range values are clamped rather than
/// rejected so that list endpoints never fail on pagination input alone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    DEFAULT_PER_PAGE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Normalize to a valid window: page >= 1, 1 <= per_page <= MAX_PER_PAGE.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> u64 {
        let normalized = self.clamped();
        (normalized.page - 1) * normalized.per_page
    }
}

/// One page of results plus the pagination metadata the response envelope
/// requires (all fields integers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
}

impl<T> Page<T> {
    /// Build a page from an already-windowed slice of results.
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        let request = request.clamped();
        let last_page = if total == 0 {
            1
        } else {
            total.div_ceil(request.per_page)
        };
        Self {
            data,
            page: request.page,
            per_page: request.per_page,
            total,
            last_page,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
