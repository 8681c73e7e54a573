//! 核心领域类型：设备状态、设备端点与时间工具。

use serde::{Deserialize, Serialize};

/// 设备状态。
///
/// 仅 `Active` 状态的设备参与周期采集扫描。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    Inactive,
}

impl DeviceStatus {
    /// 存储层使用的字符串表示。
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "active",
            DeviceStatus::Inactive => "inactive",
        }
    }

    /// 从存储层字符串解析；未知值视为 `Inactive`。
    pub fn parse(value: &str) -> Self {
        match value {
            "active" => DeviceStatus::Active,
            _ => DeviceStatus::Inactive,
        }
    }
}

impl Default for DeviceStatus {
    fn default() -> Self {
        DeviceStatus::Active
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 设备协议端点：TCP 地址 + 从站单元 ID。
///
/// 一个端点对应一条设备连接；同一端点的并发访问方必须各自持有
/// 独立的客户端实例。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEndpoint {
    /// 设备 IP 地址
    pub ip_address: String,
    /// 设备端口（Modbus TCP 默认 502）
    pub port: u16,
    /// 从站单元 ID
    pub unit_id: u8,
}

impl DeviceEndpoint {
    pub fn new(ip_address: impl Into<String>, port: u16, unit_id: u8) -> Self {
        Self {
            ip_address: ip_address.into(),
            port,
            unit_id,
        }
    }

    /// `host:port` 形式的套接字地址字符串。
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.ip_address, self.port)
    }
}

impl std::fmt::Display for DeviceEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}/{}", self.ip_address, self.port, self.unit_id)
    }
}

/// 当前 Unix 时间（毫秒）。
pub fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}
