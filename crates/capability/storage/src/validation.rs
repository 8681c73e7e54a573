//! 过滤输入验证
//!
//! 查询过滤条件在触达存储后端之前完成验证：
//! - 日期范围上限 90 天
//! - 分页参数边界（page >= 1，limit ∈ [1, 100]）

/// 查询日期范围上限（天）。
pub const MAX_DATE_RANGE_DAYS: i64 = 90;

/// 分页单页条数上限。
pub const MAX_PAGE_LIMIT: u64 = 100;

const MS_PER_DAY: i64 = 86_400_000;

/// 过滤/分页输入错误。
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// 日期范围超出上限
    #[error("date range of {days} days exceeds the maximum of {max} days")]
    DateRangeTooWide { days: i64, max: i64 },

    /// 日期解析失败
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// 分页参数越界
    #[error("invalid pagination: {0}")]
    InvalidPagination(String),
}

/// 校验毫秒时间戳区间不超过 90 天。
pub fn ensure_date_range(from_ms: Option<i64>, to_ms: Option<i64>) -> Result<(), ValidationError> {
    if let (Some(from), Some(to)) = (from_ms, to_ms) {
        let days = (to - from) / MS_PER_DAY;
        if days > MAX_DATE_RANGE_DAYS {
            return Err(ValidationError::DateRangeTooWide {
                days,
                max: MAX_DATE_RANGE_DAYS,
            });
        }
    }
    Ok(())
}

/// 校验分页参数边界。
pub fn ensure_page_bounds(page: u64, limit: u64) -> Result<(), ValidationError> {
    if page < 1 {
        return Err(ValidationError::InvalidPagination(
            "page must be at least 1".to_string(),
        ));
    }
    if limit < 1 || limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::InvalidPagination(format!(
            "limit must be within 1..={}",
            MAX_PAGE_LIMIT
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_within_limit_passes() {
        let from = 0;
        let to = MAX_DATE_RANGE_DAYS * MS_PER_DAY;
        assert!(ensure_date_range(Some(from), Some(to)).is_ok());
        // 单边区间不受限
        assert!(ensure_date_range(Some(from), None).is_ok());
        assert!(ensure_date_range(None, None).is_ok());
    }

    #[test]
    fn date_range_over_limit_is_rejected() {
        let from = 0;
        let to = (MAX_DATE_RANGE_DAYS + 1) * MS_PER_DAY;
        let err = ensure_date_range(Some(from), Some(to)).expect_err("too wide");
        assert!(matches!(err, ValidationError::DateRangeTooWide { days: 91, .. }));
    }

    #[test]
    fn page_bounds_enforced() {
        assert!(ensure_page_bounds(1, 1).is_ok());
        assert!(ensure_page_bounds(7, 100).is_ok());
        assert!(ensure_page_bounds(0, 10).is_err());
        assert!(ensure_page_bounds(1, 0).is_err());
        assert!(ensure_page_bounds(1, 101).is_err());
    }
}
