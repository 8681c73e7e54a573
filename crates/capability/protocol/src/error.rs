//! 协议错误类型定义

/// 协议通信错误
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// 连接错误（端点不可达、握手失败、传输中断）
    #[error("connection error: {0}")]
    Connection(String),

    /// 协议错误（设备返回异常码或响应不完整）
    #[error("protocol error: {0}")]
    Protocol(String),

    /// 超时错误（连接或单次操作超出时限）
    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// 非法请求（调用方参数错误）
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ProtocolError {
    /// 传输层故障：连接句柄不再可用，需要重新建连。
    pub fn is_transport(&self) -> bool {
        matches!(self, ProtocolError::Connection(_) | ProtocolError::Timeout(_))
    }
}
