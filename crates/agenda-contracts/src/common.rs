// Common DTOs for public API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response wrapper for list endpoints
/// All list endpoints return items wrapped in a `data` field plus paging info
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PagedResponse<T> {
    pub data: Vec<T>,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    /// Total matching rows across all pages
    pub total: i64,
}

impl<T> PagedResponse<T> {
    pub fn new(data: Vec<T>, page: u32, page_size: u32, total: i64) -> Self {
        Self {
            data,
            page,
            page_size,
            total,
        }
    }
}
