//! 查询过滤条件
//!
//! 每种记录一个过滤结构，供分页引擎和列表查询共用。
//! 过滤结构同时承担三个职责：
//! - 后端查询条件（内存实现用 `matches`，Postgres 实现用参数绑定）
//! - 自身验证（`validate` 在任何存储访问之前执行）
//! - 分页 URL 的过滤条件快照（`query_params`）

use crate::models::{IotMessageRecord, PlcRecord, ReadingRecord};
use crate::validation::{ensure_date_range, ValidationError};
use domain::DeviceStatus;

/// 设备列表过滤条件。
#[derive(Debug, Clone, Default)]
pub struct PlcFilter {
    /// plc_id 子串匹配（大小写不敏感）
    pub search: Option<String>,
    pub status: Option<DeviceStatus>,
    /// created_at_ms 下界（含）
    pub from_ms: Option<i64>,
    /// created_at_ms 上界（含）
    pub to_ms: Option<i64>,
}

impl PlcFilter {
    /// 仅活跃设备的过滤条件（采集扫描快照用）。
    pub fn active() -> Self {
        Self {
            status: Some(DeviceStatus::Active),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_date_range(self.from_ms, self.to_ms)
    }

    pub fn matches(&self, record: &PlcRecord) -> bool {
        if let Some(search) = &self.search {
            if !record
                .plc_id
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(from) = self.from_ms {
            if record.created_at_ms < from {
                return false;
            }
        }
        if let Some(to) = self.to_ms {
            if record.created_at_ms > to {
                return false;
            }
        }
        true
    }

    /// 分页 URL 重建所需的过滤条件快照。
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(search) = &self.search {
            params.push(("search".to_string(), search.clone()));
        }
        if let Some(status) = self.status {
            params.push(("status".to_string(), status.as_str().to_string()));
        }
        params
    }
}

/// 读数列表过滤条件。
#[derive(Debug, Clone, Default)]
pub struct ReadingFilter {
    pub plc_id: Option<String>,
    /// ts_ms 下界（含）
    pub from_ms: Option<i64>,
    /// ts_ms 上界（含）
    pub to_ms: Option<i64>,
}

impl ReadingFilter {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_date_range(self.from_ms, self.to_ms)
    }

    pub fn matches(&self, record: &ReadingRecord) -> bool {
        if let Some(plc_id) = &self.plc_id {
            if &record.plc_id != plc_id {
                return false;
            }
        }
        if let Some(from) = self.from_ms {
            if record.ts_ms < from {
                return false;
            }
        }
        if let Some(to) = self.to_ms {
            if record.ts_ms > to {
                return false;
            }
        }
        true
    }

    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(plc_id) = &self.plc_id {
            params.push(("plc_id".to_string(), plc_id.clone()));
        }
        params
    }
}

/// 消息列表过滤条件。
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub device_id: Option<String>,
    /// 消息正文子串匹配（大小写不敏感）
    pub search: Option<String>,
}

impl MessageFilter {
    pub fn matches(&self, record: &IotMessageRecord) -> bool {
        if let Some(device_id) = &self.device_id {
            if &record.device_id != device_id {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !record
                .message
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        true
    }

    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(device_id) = &self.device_id {
            params.push(("device_id".to_string(), device_id.clone()));
        }
        if let Some(search) = &self.search {
            params.push(("search".to_string(), search.clone()));
        }
        params
    }
}
