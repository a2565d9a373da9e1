//! Data models shared across database access and API handlers.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for paginated endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct PaginationQuery {
    /// 1-based page number (default: 1).
    #[serde(default = "default_page")]
    pub page: i64,
    /// Records per page (default: 20, max: 100).
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

impl PaginationQuery {
    /// Returns a clamped page value (>= 1).
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Returns a clamped per-page value (1..=100).
    pub fn per_page(&self) -> i64 {
        self.per_page.clamp(1, 100)
    }

    /// Number of records to skip for the current page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// Wrapper for paginated API responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    /// Total number of records matching the query.
    pub total: i64,
    pub total_pages: i64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            data,
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

pub mod attendance;
pub mod post;
pub mod session;
pub mod unit;
pub mod user;
