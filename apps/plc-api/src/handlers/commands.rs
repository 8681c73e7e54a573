//! 命令下发 handler
//!
//! - POST /send-command
//!
//! 下发结果映射：
//! - 设备确认写入 -> 200 `Write successful`
//! - 未注册的 plc_id -> 404（客户端错误）
//! - 连接/协议失败 -> 400，携带下发器的失败详情
//! - 注册表故障 -> 500

use crate::utils::normalize_required;
use crate::utils::response::{bad_request_error, not_found_error};
use crate::AppState;
use api_contract::{ApiResponse, SendCommandRequest};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use plc_control::ControlError;

pub async fn send_command(
    State(state): State<AppState>,
    Json(req): Json<SendCommandRequest>,
) -> Response {
    let plc_id = match normalize_required(req.plc_id, "plc_id") {
        Ok(value) => value,
        Err(response) => return response,
    };
    match state
        .command_service
        .send_command(&plc_id, req.register_address, req.value)
        .await
    {
        Ok(outcome) if outcome.success => (
            StatusCode::OK,
            Json(ApiResponse::<()>::message(outcome.message)),
        )
            .into_response(),
        Ok(outcome) => bad_request_error(outcome.message),
        Err(ControlError::NotFound(_)) => not_found_error("PLC record not found"),
        Err(ControlError::Storage(detail)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::message(detail)),
        )
            .into_response(),
    }
}
