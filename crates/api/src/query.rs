//! Query parameter types shared by several handler modules.

use becs_core::types::{Date, DbId};
use serde::Deserialize;

/// `?user_id=&from=&to=` on attendance listings and summaries.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeParams {
    pub user_id: Option<DbId>,
    pub from: Option<Date>,
    pub to: Option<Date>,
}

impl DateRangeParams {
    pub fn validate(&self) -> Result<(), becs_core::error::CoreError> {
        becs_core::project::validate_date_range(self.from, self.to, "Range")
    }
}

/// `?limit=&offset=` on task listings. Clamped in the handler.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn limit(&self) -> i64 {
        becs_core::pagination::clamp_limit(
            self.limit,
            becs_core::pagination::DEFAULT_LIMIT,
            becs_core::pagination::MAX_LIMIT,
        )
    }

    pub fn offset(&self) -> i64 {
        becs_core::pagination::clamp_offset(self.offset)
    }
}
