//! HTTP 响应辅助函数和 DTO 转换
//!
//! 提供统一的错误响应构造函数和 DTO 转换函数：
//! - 错误响应：bad_request_error, not_found_error, conflict_error,
//!   storage_error, validation_error
//! - DTO 转换：plc_to_dto, reading_to_dto, message_to_dto
//!
//! 设计原则：
//! - 所有响应都是统一的 `{message, data}` 封装
//! - HTTP 状态码与错误类别对应（404 客户端寻址错误、409 唯一键冲突、
//!   400 输入错误、500 后端故障）

use api_contract::{ApiResponse, MessageDto, PlcDto, ReadingDto};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use plc_storage::{IotMessageRecord, PlcRecord, ReadingRecord, StorageError, ValidationError};

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::message(message)),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error(message: impl Into<String>) -> Response {
    (StatusCode::NOT_FOUND, Json(ApiResponse::message(message))).into_response()
}

/// 唯一键冲突响应
pub fn conflict_error(message: impl Into<String>) -> Response {
    (StatusCode::CONFLICT, Json(ApiResponse::message(message))).into_response()
}

/// 存储错误响应
pub fn storage_error(err: StorageError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::message(err.to_string())),
    )
        .into_response()
}

/// 过滤/分页输入错误响应
pub fn validation_error(err: ValidationError) -> Response {
    bad_request_error(err.to_string())
}

/// PlcRecord 转 PlcDto
pub fn plc_to_dto(record: PlcRecord) -> PlcDto {
    PlcDto {
        plc_id: record.plc_id,
        ip_address: record.ip_address,
        port: record.port,
        unit_id: record.unit_id,
        status: record.status,
        created_at_ms: record.created_at_ms,
    }
}

/// ReadingRecord 转 ReadingDto
pub fn reading_to_dto(record: ReadingRecord) -> ReadingDto {
    ReadingDto {
        reading_id: record.reading_id,
        plc_id: record.plc_id,
        ts_ms: record.ts_ms,
        values: record.values,
        processed: record.processed,
    }
}

/// IotMessageRecord 转 MessageDto
pub fn message_to_dto(record: IotMessageRecord) -> MessageDto {
    MessageDto {
        message_id: record.message_id,
        device_id: record.device_id,
        message: record.message,
        ts_ms: record.ts_ms,
    }
}
