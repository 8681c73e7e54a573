//! 稳定的 DTO 与 API 响应契约。
//!
//! 响应封装沿用 `{message, data}` 形状：`message` 总是存在，
//! `data` 仅在有载荷时序列化。字段名保持 snake_case。

use domain::DeviceStatus;
use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// 仅携带消息的响应（错误或无载荷的成功）。
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

/// 设备注册请求体。
#[derive(Debug, Deserialize)]
pub struct PlcCreateRequest {
    pub plc_id: String,
    pub ip_address: String,
    pub port: u16,
    #[serde(default)]
    pub unit_id: Option<u8>,
    #[serde(default)]
    pub status: Option<DeviceStatus>,
}

/// 设备部分更新请求体。
#[derive(Debug, Default, Deserialize)]
pub struct PlcUpdateRequest {
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub unit_id: Option<u8>,
    #[serde(default)]
    pub status: Option<DeviceStatus>,
}

/// 设备返回结构。
#[derive(Debug, Serialize)]
pub struct PlcDto {
    pub plc_id: String,
    pub ip_address: String,
    pub port: u16,
    pub unit_id: u8,
    pub status: DeviceStatus,
    pub created_at_ms: i64,
}

/// 命令下发请求体。
///
/// `register_address` 兼容旧字段名 `command`。
#[derive(Debug, Deserialize)]
pub struct SendCommandRequest {
    pub plc_id: String,
    #[serde(alias = "command")]
    pub register_address: u16,
    pub value: u16,
}

/// 读数返回结构。
#[derive(Debug, Serialize)]
pub struct ReadingDto {
    pub reading_id: String,
    pub plc_id: String,
    pub ts_ms: i64,
    pub values: Vec<u16>,
    pub processed: bool,
}

/// 消息返回结构。
#[derive(Debug, Serialize)]
pub struct MessageDto {
    pub message_id: String,
    pub device_id: String,
    pub message: String,
    pub ts_ms: i64,
}

/// 指标快照返回结构。
#[derive(Debug, Serialize)]
pub struct MetricsSnapshotDto {
    pub sweeps_completed: u64,
    pub polls_succeeded: u64,
    pub polls_failed: u64,
    pub readings_written: u64,
    pub reading_write_failure: u64,
    pub sweep_latency_ms_total: u64,
    pub sweep_latency_ms_count: u64,
    pub commands_issued: u64,
    pub command_write_success: u64,
    pub command_write_failure: u64,
    pub messages_received: u64,
    pub messages_relayed: u64,
}
