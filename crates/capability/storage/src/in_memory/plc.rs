//! 设备注册表内存实现
//!
//! 仅用于本地演示和测试。
//!
//! 功能：
//! - 设备 CRUD 操作（plc_id 唯一键）
//! - 过滤、计数与取页（创建时间倒序）

use crate::error::StorageError;
use crate::filter::PlcFilter;
use crate::models::{PlcRecord, PlcUpdate};
use crate::pagination::PagedCollection;
use crate::traits::PlcStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// 设备注册表内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
#[derive(Default)]
pub struct InMemoryPlcStore {
    plcs: RwLock<HashMap<String, PlcRecord>>,
}

impl InMemoryPlcStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按创建时间倒序（同刻按 plc_id 升序）的匹配列表。
    fn sorted_matches(&self, filter: &PlcFilter) -> Vec<PlcRecord> {
        let mut items: Vec<PlcRecord> = self
            .plcs
            .read()
            .map(|map| {
                map.values()
                    .filter(|record| filter.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        items.sort_by(|a, b| {
            b.created_at_ms
                .cmp(&a.created_at_ms)
                .then_with(|| a.plc_id.cmp(&b.plc_id))
        });
        items
    }
}

#[async_trait::async_trait]
impl PlcStore for InMemoryPlcStore {
    async fn create_plc(&self, record: PlcRecord) -> Result<PlcRecord, StorageError> {
        let mut map = self
            .plcs
            .write()
            .map_err(|_| StorageError::backend("lock failed"))?;
        if map.contains_key(&record.plc_id) {
            return Err(StorageError::Duplicate("plc_id".to_string()));
        }
        map.insert(record.plc_id.clone(), record.clone());
        Ok(record)
    }

    async fn find_plc(&self, plc_id: &str) -> Result<Option<PlcRecord>, StorageError> {
        let item = self
            .plcs
            .read()
            .ok()
            .and_then(|map| map.get(plc_id).cloned());
        Ok(item)
    }

    async fn update_plc(
        &self,
        plc_id: &str,
        update: PlcUpdate,
    ) -> Result<Option<PlcRecord>, StorageError> {
        let mut map = self
            .plcs
            .write()
            .map_err(|_| StorageError::backend("lock failed"))?;
        let record = match map.get_mut(plc_id) {
            Some(record) => record,
            None => return Ok(None),
        };
        if let Some(ip_address) = update.ip_address {
            record.ip_address = ip_address;
        }
        if let Some(port) = update.port {
            record.port = port;
        }
        if let Some(unit_id) = update.unit_id {
            record.unit_id = unit_id;
        }
        if let Some(status) = update.status {
            record.status = status;
        }
        Ok(Some(record.clone()))
    }

    async fn delete_plc(&self, plc_id: &str) -> Result<bool, StorageError> {
        let mut map = self
            .plcs
            .write()
            .map_err(|_| StorageError::backend("lock failed"))?;
        Ok(map.remove(plc_id).is_some())
    }

    async fn list_active_plcs(&self) -> Result<Vec<PlcRecord>, StorageError> {
        Ok(self.sorted_matches(&PlcFilter::active()))
    }

    async fn list_plcs(&self, filter: &PlcFilter) -> Result<Vec<PlcRecord>, StorageError> {
        Ok(self.sorted_matches(filter))
    }
}

#[async_trait::async_trait]
impl PagedCollection<PlcFilter, PlcRecord> for InMemoryPlcStore {
    async fn count_items(&self, filter: &PlcFilter) -> Result<u64, StorageError> {
        let count = self
            .plcs
            .read()
            .map(|map| map.values().filter(|record| filter.matches(record)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn fetch_page(
        &self,
        filter: &PlcFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<PlcRecord>, StorageError> {
        let items = self
            .sorted_matches(filter)
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect();
        Ok(items)
    }
}
