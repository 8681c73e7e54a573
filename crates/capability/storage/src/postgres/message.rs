//! Postgres IoT 消息实现

use crate::error::StorageError;
use crate::filter::MessageFilter;
use crate::models::{IotMessageRecord, LastMessageRecord};
use crate::pagination::PagedCollection;
use crate::traits::MessageStore;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgMessageStore {
    pub pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

fn message_from_row(row: &PgRow) -> Result<IotMessageRecord, StorageError> {
    Ok(IotMessageRecord {
        message_id: row.try_get("message_id")?,
        device_id: row.try_get("device_id")?,
        message: row.try_get("message")?,
        ts_ms: row.try_get("ts_ms")?,
    })
}

const MESSAGE_FILTER_WHERE: &str = "($1::text is null or device_id = $1) \
     and ($2::text is null or message ilike '%' || $2 || '%')";

#[async_trait::async_trait]
impl MessageStore for PgMessageStore {
    async fn insert_message(&self, record: IotMessageRecord) -> Result<(), StorageError> {
        sqlx::query(
            "insert into plc_message (message_id, device_id, message, ts_ms) \
             values ($1, $2, $3, $4)",
        )
        .bind(&record.message_id)
        .bind(&record.device_id)
        .bind(&record.message)
        .bind(record.ts_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_latest_message(
        &self,
        device_id: &str,
    ) -> Result<Option<IotMessageRecord>, StorageError> {
        let row = sqlx::query(
            "select message_id, device_id, message, ts_ms \
             from plc_message where device_id = $1 \
             order by ts_ms desc, message_id asc limit 1",
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(message_from_row(&row)?))
    }

    async fn upsert_last_message(
        &self,
        record: LastMessageRecord,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "insert into plc_last_message (device_id, message, ts_ms) \
             values ($1, $2, $3) \
             on conflict (device_id) do update \
             set message = excluded.message, ts_ms = excluded.ts_ms",
        )
        .bind(&record.device_id)
        .bind(&record.message)
        .bind(record.ts_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_last_message(
        &self,
        device_id: &str,
    ) -> Result<Option<LastMessageRecord>, StorageError> {
        let row = sqlx::query(
            "select device_id, message, ts_ms from plc_last_message where device_id = $1",
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(LastMessageRecord {
            device_id: row.try_get("device_id")?,
            message: row.try_get("message")?,
            ts_ms: row.try_get("ts_ms")?,
        }))
    }
}

#[async_trait::async_trait]
impl PagedCollection<MessageFilter, IotMessageRecord> for PgMessageStore {
    async fn count_items(&self, filter: &MessageFilter) -> Result<u64, StorageError> {
        let sql = format!("select count(*) as total from plc_message where {MESSAGE_FILTER_WHERE}");
        let row = sqlx::query(&sql)
            .bind(&filter.device_id)
            .bind(&filter.search)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(total as u64)
    }

    async fn fetch_page(
        &self,
        filter: &MessageFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<IotMessageRecord>, StorageError> {
        let sql = format!(
            "select message_id, device_id, message, ts_ms \
             from plc_message where {MESSAGE_FILTER_WHERE} \
             order by ts_ms desc, message_id asc \
             offset $3 limit $4"
        );
        let rows = sqlx::query(&sql)
            .bind(&filter.device_id)
            .bind(&filter.search)
            .bind(skip as i64)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(message_from_row(&row)?);
        }
        Ok(items)
    }
}
