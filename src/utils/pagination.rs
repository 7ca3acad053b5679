// utils/pagination.rs
use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
}

impl Pagination {
    /// Query strings arrive untyped; anything that is not a positive integer
    /// falls back to the default so it can never reach LIMIT/OFFSET.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Pagination {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    pub fn limit(&self) -> i64 {
        self.limit as i64
    }
}

pub fn total_pages(total: i64, limit: u32) -> i64 {
    if total <= 0 || limit == 0 {
        return 0;
    }
    let limit = limit as i64;
    (total + limit - 1) / limit
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Paginated {
            data,
            total,
            page: pagination.page,
            total_pages: total_pages(total, pagination.limit),
        }
    }
}
