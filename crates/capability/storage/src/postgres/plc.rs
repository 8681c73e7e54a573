//! Postgres 设备注册表实现
//!
//! 通过 SQL 查询实现设备 CRUD 操作。
//!
//! 设计要点：
//! - 使用参数化 SQL 防止注入
//! - plc_id 主键承担唯一约束；重复注册通过
//!   `on conflict do nothing` + rows_affected 检测，单次往返

use crate::error::StorageError;
use crate::filter::PlcFilter;
use crate::models::{PlcRecord, PlcUpdate};
use crate::pagination::PagedCollection;
use crate::traits::PlcStore;
use domain::DeviceStatus;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgPlcStore {
    pub pool: PgPool,
}

impl PgPlcStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

fn plc_from_row(row: &PgRow) -> Result<PlcRecord, StorageError> {
    let port: i32 = row.try_get("port")?;
    let unit_id: i32 = row.try_get("unit_id")?;
    let status: String = row.try_get("status")?;
    Ok(PlcRecord {
        plc_id: row.try_get("plc_id")?,
        ip_address: row.try_get("ip_address")?,
        port: port as u16,
        unit_id: unit_id as u8,
        status: DeviceStatus::parse(&status),
        created_at_ms: row.try_get("created_at_ms")?,
    })
}

const PLC_COLUMNS: &str = "plc_id, ip_address, port, unit_id, status, created_at_ms";

/// 过滤条件对应的 where 子句（与绑定顺序 $1..$4 对应）。
const PLC_FILTER_WHERE: &str = "($1::text is null or plc_id ilike '%' || $1 || '%') \
     and ($2::text is null or status = $2) \
     and ($3::bigint is null or created_at_ms >= $3) \
     and ($4::bigint is null or created_at_ms <= $4)";

fn status_param(filter: &PlcFilter) -> Option<&'static str> {
    filter.status.map(|status| status.as_str())
}

#[async_trait::async_trait]
impl PlcStore for PgPlcStore {
    async fn create_plc(&self, record: PlcRecord) -> Result<PlcRecord, StorageError> {
        let result = sqlx::query(
            "insert into plc_device (plc_id, ip_address, port, unit_id, status, created_at_ms) \
             values ($1, $2, $3, $4, $5, $6) \
             on conflict (plc_id) do nothing",
        )
        .bind(&record.plc_id)
        .bind(&record.ip_address)
        .bind(record.port as i32)
        .bind(record.unit_id as i32)
        .bind(record.status.as_str())
        .bind(record.created_at_ms)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::Duplicate("plc_id".to_string()));
        }
        Ok(record)
    }

    async fn find_plc(&self, plc_id: &str) -> Result<Option<PlcRecord>, StorageError> {
        let row = sqlx::query(
            "select plc_id, ip_address, port, unit_id, status, created_at_ms \
             from plc_device where plc_id = $1",
        )
        .bind(plc_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(plc_from_row(&row)?))
    }

    async fn update_plc(
        &self,
        plc_id: &str,
        update: PlcUpdate,
    ) -> Result<Option<PlcRecord>, StorageError> {
        let row = sqlx::query(
            "update plc_device set \
             ip_address = coalesce($1, ip_address), \
             port = coalesce($2, port), \
             unit_id = coalesce($3, unit_id), \
             status = coalesce($4, status) \
             where plc_id = $5 \
             returning plc_id, ip_address, port, unit_id, status, created_at_ms",
        )
        .bind(update.ip_address)
        .bind(update.port.map(|port| port as i32))
        .bind(update.unit_id.map(|unit_id| unit_id as i32))
        .bind(update.status.map(|status| status.as_str()))
        .bind(plc_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(plc_from_row(&row)?))
    }

    async fn delete_plc(&self, plc_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from plc_device where plc_id = $1")
            .bind(plc_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_active_plcs(&self) -> Result<Vec<PlcRecord>, StorageError> {
        let rows = sqlx::query(
            "select plc_id, ip_address, port, unit_id, status, created_at_ms \
             from plc_device where status = 'active' \
             order by created_at_ms desc, plc_id asc",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(plc_from_row(&row)?);
        }
        Ok(items)
    }

    async fn list_plcs(&self, filter: &PlcFilter) -> Result<Vec<PlcRecord>, StorageError> {
        let sql = format!(
            "select {PLC_COLUMNS} from plc_device where {PLC_FILTER_WHERE} \
             order by created_at_ms desc, plc_id asc"
        );
        let rows = sqlx::query(&sql)
            .bind(&filter.search)
            .bind(status_param(filter))
            .bind(filter.from_ms)
            .bind(filter.to_ms)
            .fetch_all(&self.pool)
            .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(plc_from_row(&row)?);
        }
        Ok(items)
    }
}

#[async_trait::async_trait]
impl PagedCollection<PlcFilter, PlcRecord> for PgPlcStore {
    async fn count_items(&self, filter: &PlcFilter) -> Result<u64, StorageError> {
        let sql = format!("select count(*) as total from plc_device where {PLC_FILTER_WHERE}");
        let row = sqlx::query(&sql)
            .bind(&filter.search)
            .bind(status_param(filter))
            .bind(filter.from_ms)
            .bind(filter.to_ms)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(total as u64)
    }

    async fn fetch_page(
        &self,
        filter: &PlcFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<PlcRecord>, StorageError> {
        let sql = format!(
            "select {PLC_COLUMNS} from plc_device where {PLC_FILTER_WHERE} \
             order by created_at_ms desc, plc_id asc \
             offset $5 limit $6"
        );
        let rows = sqlx::query(&sql)
            .bind(&filter.search)
            .bind(status_param(filter))
            .bind(filter.from_ms)
            .bind(filter.to_ms)
            .bind(skip as i64)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(plc_from_row(&row)?);
        }
        Ok(items)
    }
}
