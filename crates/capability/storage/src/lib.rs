//! # PLC Storage 模块
//!
//! 本模块提供统一的数据存储抽象层，支持多种存储后端实现。
//!
//! ## 架构设计
//!
//! 该模块采用分层架构，遵循以下原则：
//!
//! 1. **接口抽象层** (`traits.rs`)：定义所有资源存储的异步 Trait 接口
//! 2. **数据模型层** (`models.rs`)：定义存储相关的数据结构
//! 3. **过滤与验证层** (`filter.rs` / `validation.rs`)：查询条件及其
//!    前置验证（日期范围上限、分页边界）
//! 4. **分页引擎** (`pagination.rs`)：与记录类型无关的 offset 分页器
//! 5. **错误处理层** (`error.rs`)：统一的存储错误类型
//! 6. **连接管理层** (`connection.rs`)：数据库连接池管理
//! 7. **实现层**：
//!    - `in_memory/`：内存存储实现（用于测试和演示）
//!    - `postgres/`：PostgreSQL 存储实现（生产环境使用）
//!
//! ## 核心特性
//!
//! - **唯一键约束**：设备注册表以 `plc_id` 为唯一键，重复注册返回
//!   `StorageError::Duplicate`
//! - **只追加日志**：采集读数写入后不再变更，删除由外部运维操作负责
//! - **统一分页**：每种记录存储同时实现 `PagedCollection`，分页引擎
//!   对设备、读数、消息三类集合复用同一套页边界逻辑
//! - **前置验证**：日期范围（上限 90 天）与分页参数在任何后端访问
//!   之前被拒绝
//! - **异步支持**：基于 Tokio 的异步 I/O，通过 Trait 接口支持多后端
//!
//! ## 一致性约定
//!
//! 分页的计数与取页是两次独立读取，没有事务快照；并发写入下
//! `total_items` 可能偏旧。注册表与读数/消息存储的所有写入都是
//! 单条 upsert/insert，不需要跨记录事务。

// 模块导出：将子模块的内容导出到 crate 根目录
pub mod connection;
pub mod error;
pub mod filter;
pub mod in_memory;
pub mod models;
pub mod pagination;
pub mod postgres;
pub mod traits;
pub mod validation;

// 导出常用类型到 crate 根目录，方便外部引用
pub use connection::*;
pub use error::*;
pub use filter::*;
pub use models::*;
pub use pagination::*;
pub use traits::*;
pub use validation::*;

// 导出内存存储实现类型
pub use in_memory::{InMemoryMessageStore, InMemoryPlcStore, InMemoryReadingStore};

// 导出 PostgreSQL 存储实现类型
pub use postgres::{PgMessageStore, PgPlcStore, PgReadingStore};
