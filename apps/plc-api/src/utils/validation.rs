//! 请求字段归一化与日期解析
//!
//! 原始 API 约定里"空"字段（空字符串、零值端口/单元号）视为未提供：
//! - 必填字段为空 -> 400
//! - 可选字段为空 -> 丢弃，不参与部分更新
//!
//! 日期查询参数接受 RFC 3339（含时区）或 `YYYY-MM-DD`（按 UTC 零点）。

use crate::utils::response::bad_request_error;
use axum::response::Response;
use chrono::{DateTime, NaiveDate};
use plc_storage::ValidationError;

/// 必填字符串字段：去除首尾空白，空值返回 400。
pub fn normalize_required(value: String, field: &str) -> Result<String, Response> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(bad_request_error(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// 可选字符串字段：空值归一化为"未提供"。
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 可选数值字段：零值归一化为"未提供"。
pub fn nonzero_u16(value: Option<u16>) -> Option<u16> {
    value.filter(|value| *value != 0)
}

/// 可选数值字段：零值归一化为"未提供"。
pub fn nonzero_u8(value: Option<u8>) -> Option<u8> {
    value.filter(|value| *value != 0)
}

/// 解析日期查询参数为 Unix 毫秒。
pub fn parse_date_ms(value: &str) -> Result<i64, ValidationError> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();
        return Ok(midnight.timestamp_millis());
    }
    Err(ValidationError::InvalidDate(value.to_string()))
}

/// 解析可选日期查询参数。
pub fn parse_optional_date_ms(value: &Option<String>) -> Result<Option<i64>, ValidationError> {
    match value {
        Some(value) if !value.trim().is_empty() => parse_date_ms(value.trim()).map(Some),
        _ => Ok(None),
    }
}
