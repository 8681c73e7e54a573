//! 采集读数内存实现

use crate::error::StorageError;
use crate::filter::ReadingFilter;
use crate::models::ReadingRecord;
use crate::pagination::PagedCollection;
use crate::traits::ReadingStore;
use std::sync::RwLock;

/// 读数内存存储（只追加 Vec）。
#[derive(Default)]
pub struct InMemoryReadingStore {
    readings: RwLock<Vec<ReadingRecord>>,
}

impl InMemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按采集时间倒序（同刻按 reading_id 升序）的匹配列表。
    fn sorted_matches(&self, filter: &ReadingFilter) -> Vec<ReadingRecord> {
        let mut items: Vec<ReadingRecord> = self
            .readings
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
                .then_with(|| a.reading_id.cmp(&b.reading_id))
        });
        items
    }
}

#[async_trait::async_trait]
impl ReadingStore for InMemoryReadingStore {
    async fn insert_reading(&self, record: ReadingRecord) -> Result<(), StorageError> {
        let mut list = self
            .readings
            .write()
            .map_err(|_| StorageError::backend("lock failed"))?;
        list.push(record);
        Ok(())
    }
}

#[async_trait::async_trait]
impl PagedCollection<ReadingFilter, ReadingRecord> for InMemoryReadingStore {
    async fn count_items(&self, filter: &ReadingFilter) -> Result<u64, StorageError> {
        let count = self
            .readings
            .read()
            .map(|list| list.iter().filter(|record| filter.matches(record)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn fetch_page(
        &self,
        filter: &ReadingFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<ReadingRecord>, StorageError> {
        let items = self
            .sorted_matches(filter)
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect();
        Ok(items)
    }
}
