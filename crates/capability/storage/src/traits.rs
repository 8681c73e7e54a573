//! 存储接口 Trait 定义
//!
//! 定义所有资源存储的异步接口：
//! - PlcStore：设备注册表
//! - ReadingStore：采集读数（只追加）
//! - MessageStore：IoT 消息与设备最近消息
//!
//! 设计原则：
//! - 记录缺失以 `Ok(None)` / `Ok(false)` 表达，错误只用于后端故障
//! - 每个接口同时是可分页集合（PagedCollection 超 trait）
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::filter::{MessageFilter, PlcFilter, ReadingFilter};
use crate::models::{
    IotMessageRecord, LastMessageRecord, PlcRecord, PlcUpdate, ReadingRecord,
};
use crate::pagination::PagedCollection;
use async_trait::async_trait;

/// 设备注册表接口。
///
/// `plc_id` 为唯一键：重复创建返回 `StorageError::Duplicate`。
#[async_trait]
pub trait PlcStore: PagedCollection<PlcFilter, PlcRecord> {
    /// 注册新设备。
    async fn create_plc(&self, record: PlcRecord) -> Result<PlcRecord, StorageError>;

    /// 按 plc_id 查找设备。
    async fn find_plc(&self, plc_id: &str) -> Result<Option<PlcRecord>, StorageError>;

    /// 部分更新设备：只覆盖 `Some` 字段，返回更新后的记录。
    async fn update_plc(
        &self,
        plc_id: &str,
        update: PlcUpdate,
    ) -> Result<Option<PlcRecord>, StorageError>;

    /// 删除设备。
    async fn delete_plc(&self, plc_id: &str) -> Result<bool, StorageError>;

    /// 活跃设备的即时快照（采集扫描入口）。
    async fn list_active_plcs(&self) -> Result<Vec<PlcRecord>, StorageError>;

    /// 不分页的过滤列表。
    async fn list_plcs(&self, filter: &PlcFilter) -> Result<Vec<PlcRecord>, StorageError>;
}

/// 采集读数存储接口（只追加日志）。
#[async_trait]
pub trait ReadingStore: PagedCollection<ReadingFilter, ReadingRecord> {
    /// 追加一条读数。
    async fn insert_reading(&self, record: ReadingRecord) -> Result<(), StorageError>;
}

/// IoT 消息存储接口。
#[async_trait]
pub trait MessageStore: PagedCollection<MessageFilter, IotMessageRecord> {
    /// 追加一条设备消息。
    async fn insert_message(&self, record: IotMessageRecord) -> Result<(), StorageError>;

    /// 设备最新一条消息。
    async fn find_latest_message(
        &self,
        device_id: &str,
    ) -> Result<Option<IotMessageRecord>, StorageError>;

    /// upsert 设备最近消息记录（消息中继写入）。
    async fn upsert_last_message(&self, record: LastMessageRecord)
        -> Result<(), StorageError>;

    /// 设备最近消息记录。
    async fn find_last_message(
        &self,
        device_id: &str,
    ) -> Result<Option<LastMessageRecord>, StorageError>;
}
