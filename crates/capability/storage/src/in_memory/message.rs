//! IoT 消息内存实现

use crate::error::StorageError;
use crate::filter::MessageFilter;
use crate::models::{IotMessageRecord, LastMessageRecord};
use crate::pagination::PagedCollection;
use crate::traits::MessageStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// 消息内存存储：消息日志 + 按设备的最近消息。
#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<IotMessageRecord>>,
    last_messages: RwLock<HashMap<String, LastMessageRecord>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按接收时间倒序（同刻按 message_id 升序）的匹配列表。
    fn sorted_matches(&self, filter: &MessageFilter) -> Vec<IotMessageRecord> {
        let mut items: Vec<IotMessageRecord> = self
            .messages
            .read()
            .map(|list| {
                list.iter()
                    .filter(|record| filter.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        items.sort_by(|a, b| {
            b.ts_ms
                .cmp(&a.ts_ms)
                .then_with(|| a.message_id.cmp(&b.message_id))
        });
        items
    }
}

#[async_trait::async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn insert_message(&self, record: IotMessageRecord) -> Result<(), StorageError> {
        let mut list = self
            .messages
            .write()
            .map_err(|_| StorageError::backend("lock failed"))?;
        list.push(record);
        Ok(())
    }

    async fn find_latest_message(
        &self,
        device_id: &str,
    ) -> Result<Option<IotMessageRecord>, StorageError> {
        let latest = self
            .messages
            .read()
            .map(|list| {
                list.iter()
                    .filter(|record| record.device_id == device_id)
                    .max_by_key(|record| record.ts_ms)
                    .cloned()
            })
            .unwrap_or(None);
        Ok(latest)
    }

    async fn upsert_last_message(
        &self,
        record: LastMessageRecord,
    ) -> Result<(), StorageError> {
        let mut map = self
            .last_messages
            .write()
            .map_err(|_| StorageError::backend("lock failed"))?;
        map.insert(record.device_id.clone(), record);
        Ok(())
    }

    async fn find_last_message(
        &self,
        device_id: &str,
    ) -> Result<Option<LastMessageRecord>, StorageError> {
        let item = self
            .last_messages
            .read()
            .ok()
            .and_then(|map| map.get(device_id).cloned());
        Ok(item)
    }
}

#[async_trait::async_trait]
impl PagedCollection<MessageFilter, IotMessageRecord> for InMemoryMessageStore {
    async fn count_items(&self, filter: &MessageFilter) -> Result<u64, StorageError> {
        let count = self
            .messages
            .read()
            .map(|list| list.iter().filter(|record| filter.matches(record)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn fetch_page(
        &self,
        filter: &MessageFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<IotMessageRecord>, StorageError> {
        let items = self
            .sorted_matches(filter)
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect();
        Ok(items)
    }
}
