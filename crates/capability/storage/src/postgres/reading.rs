//! Postgres 采集读数实现
//!
//! 读数是只追加日志；寄存器序列以 JSON 文本列存储。

use crate::error::StorageError;
use crate::filter::ReadingFilter;
use crate::models::ReadingRecord;
use crate::pagination::PagedCollection;
use crate::traits::ReadingStore;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgReadingStore {
    pub pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

fn reading_from_row(row: &PgRow) -> Result<ReadingRecord, StorageError> {
    let registers: String = row.try_get("registers")?;
    let values: Vec<u16> = serde_json::from_str(&registers)
        .map_err(|err| StorageError::backend(format!("bad register payload: {}", err)))?;
    Ok(ReadingRecord {
        reading_id: row.try_get("reading_id")?,
        plc_id: row.try_get("plc_id")?,
        ts_ms: row.try_get("ts_ms")?,
        values,
        processed: row.try_get("processed")?,
    })
}

const READING_FILTER_WHERE: &str = "($1::text is null or plc_id = $1) \
     and ($2::bigint is null or ts_ms >= $2) \
     and ($3::bigint is null or ts_ms <= $3)";

#[async_trait::async_trait]
impl ReadingStore for PgReadingStore {
    async fn insert_reading(&self, record: ReadingRecord) -> Result<(), StorageError> {
        let registers = serde_json::to_string(&record.values)
            .map_err(|err| StorageError::backend(format!("bad register payload: {}", err)))?;
        sqlx::query(
            "insert into plc_reading (reading_id, plc_id, ts_ms, registers, processed) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(&record.reading_id)
        .bind(&record.plc_id)
        .bind(record.ts_ms)
        .bind(registers)
        .bind(record.processed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PagedCollection<ReadingFilter, ReadingRecord> for PgReadingStore {
    async fn count_items(&self, filter: &ReadingFilter) -> Result<u64, StorageError> {
        let sql = format!("select count(*) as total from plc_reading where {READING_FILTER_WHERE}");
        let row = sqlx::query(&sql)
            .bind(&filter.plc_id)
            .bind(filter.from_ms)
            .bind(filter.to_ms)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(total as u64)
    }

    async fn fetch_page(
        &self,
        filter: &ReadingFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<ReadingRecord>, StorageError> {
        let sql = format!(
            "select reading_id, plc_id, ts_ms, registers, processed \
             from plc_reading where {READING_FILTER_WHERE} \
             order by ts_ms desc, reading_id asc \
             offset $4 limit $5"
        );
        let rows = sqlx::query(&sql)
            .bind(&filter.plc_id)
            .bind(filter.from_ms)
            .bind(filter.to_ms)
            .bind(skip as i64)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(reading_from_row(&row)?);
        }
        Ok(items)
    }
}
