//! 存储层错误类型
//!
//! 统一封装底层错误：
//! - Duplicate：唯一键冲突（如重复注册 plc_id）
//! - Backend：后端访问错误（SQL 执行、连接、序列化）
//!
//! 记录缺失不是错误：查找类接口以 `Ok(None)` / `Ok(false)` 表达。

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 唯一键冲突
    #[error("duplicate key on {0}")]
    Duplicate(String),

    /// 后端访问错误
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn backend(message: impl Into<String>) -> Self {
        StorageError::Backend(message.into())
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}
