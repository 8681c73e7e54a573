//! PostgreSQL 存储实现
//!
//! 生产环境使用。所有 SQL 使用参数绑定，防止注入且支持查询计划缓存。
//!
//! 依赖的表结构：
//!
//! ```sql
//! create table plc_device (
//!     plc_id        text primary key,
//!     ip_address    text not null,
//!     port          integer not null,
//!     unit_id       integer not null,
//!     status        text not null,
//!     created_at_ms bigint not null
//! );
//!
//! create table plc_reading (
//!     reading_id text primary key,
//!     plc_id     text not null,
//!     ts_ms      bigint not null,
//!     registers  text not null,
//!     processed  boolean not null
//! );
//! create index plc_reading_plc_ts on plc_reading (plc_id, ts_ms desc);
//!
//! create table plc_message (
//!     message_id text primary key,
//!     device_id  text not null,
//!     message    text not null,
//!     ts_ms      bigint not null
//! );
//! create index plc_message_device_ts on plc_message (device_id, ts_ms desc);
//!
//! create table plc_last_message (
//!     device_id text primary key,
//!     message   text not null,
//!     ts_ms     bigint not null
//! );
//! ```

pub mod message;
pub mod plc;
pub mod reading;

pub use message::PgMessageStore;
pub use plc::PgPlcStore;
pub use reading::PgReadingStore;
