//! 数据模型
//!
//! 定义所有存储相关的数据模型和更新结构：
//! - 设备模型：PlcRecord, PlcUpdate（注册记录、部分更新）
//! - 读数模型：ReadingRecord（采集扫描写入的只追加日志）
//! - 消息模型：IotMessageRecord, LastMessageRecord

use domain::{DeviceEndpoint, DeviceStatus};
use serde::Serialize;

/// 设备注册记录。
///
/// `plc_id` 在注册表内唯一；记录只由注册/更新接口变更，
/// 采集扫描对其只读。
#[derive(Debug, Clone, Serialize)]
pub struct PlcRecord {
    pub plc_id: String,
    pub ip_address: String,
    pub port: u16,
    pub unit_id: u8,
    pub status: DeviceStatus,
    pub created_at_ms: i64,
}

impl PlcRecord {
    /// 该设备的协议端点。
    pub fn endpoint(&self) -> DeviceEndpoint {
        DeviceEndpoint::new(self.ip_address.clone(), self.port, self.unit_id)
    }
}

/// 设备部分更新输入。
///
/// 只有 `Some` 字段会覆盖现有值；空输入由 HTTP 层拒绝。
#[derive(Debug, Clone, Default)]
pub struct PlcUpdate {
    pub ip_address: Option<String>,
    pub port: Option<u16>,
    pub unit_id: Option<u8>,
    pub status: Option<DeviceStatus>,
}

impl PlcUpdate {
    pub fn is_empty(&self) -> bool {
        self.ip_address.is_none()
            && self.port.is_none()
            && self.unit_id.is_none()
            && self.status.is_none()
    }
}

/// 采集读数记录。
///
/// 只由采集扫描创建（`processed = true`），写入后不再变更。
#[derive(Debug, Clone, Serialize)]
pub struct ReadingRecord {
    pub reading_id: String,
    pub plc_id: String,
    pub ts_ms: i64,
    pub values: Vec<u16>,
    pub processed: bool,
}

/// IoT 设备消息记录。
#[derive(Debug, Clone, Serialize)]
pub struct IotMessageRecord {
    pub message_id: String,
    pub device_id: String,
    pub message: String,
    pub ts_ms: i64,
}

/// 设备最近一条消息（消息中继按设备 upsert）。
#[derive(Debug, Clone, Serialize)]
pub struct LastMessageRecord {
    pub device_id: String,
    pub message: String,
    pub ts_ms: i64,
}
