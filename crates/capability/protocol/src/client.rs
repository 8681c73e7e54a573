//! 寄存器客户端实现
//!
//! 管理单台设备的连接生命周期，提供寄存器读写操作。
//!
//! ## 连接状态
//!
//! 客户端在 `Disconnected` 与 `Connected` 之间迁移：
//! - `open()` 成功后进入 `Connected`
//! - `close()` 或不可恢复的传输故障（连接中断、超时）回到 `Disconnected`
//!
//! 读写操作在 `Disconnected` 状态下自动建连；协议层异常（设备返回
//! 错误码）不改变连接状态。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut client = RegisterClient::new(connector, endpoint);
//! let values = client.read_registers(0, 2).await?;
//! client.close().await;
//! ```

use crate::error::ProtocolError;
use async_trait::async_trait;
use domain::DeviceEndpoint;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 建连抽象：为端点打开一条寄存器连接。
#[async_trait]
pub trait RegisterConnector: Send + Sync {
    async fn connect(
        &self,
        endpoint: &DeviceEndpoint,
    ) -> Result<Box<dyn RegisterConnection>, ProtocolError>;
}

/// 单条设备连接上的寄存器操作。
///
/// 实现不要求内部可重入；同一连接同一时刻只有一个在途操作。
#[async_trait]
pub trait RegisterConnection: Send {
    async fn read_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError>;

    async fn write_register(&mut self, address: u16, value: u16) -> Result<(), ProtocolError>;

    /// 尽力而为地关闭连接；从不失败。
    async fn shutdown(&mut self);
}

/// 客户端超时配置。
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// 建连超时
    pub connect_timeout: Duration,
    /// 单次读写操作超时
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(5000),
            request_timeout: Duration::from_millis(3000),
        }
    }
}

/// 寄存器客户端：恰好对应一台设备的一条连接。
///
/// 客户端独占连接句柄，不做内部加锁；需要并发访问同一设备的调用方
/// 必须串行化，或各自构造独立的客户端实例（代价是对该设备的重复连接）。
pub struct RegisterClient {
    endpoint: DeviceEndpoint,
    options: ClientOptions,
    connector: Arc<dyn RegisterConnector>,
    connection: Option<Box<dyn RegisterConnection>>,
}

impl RegisterClient {
    /// 以默认超时构造客户端。
    pub fn new(connector: Arc<dyn RegisterConnector>, endpoint: DeviceEndpoint) -> Self {
        Self::with_options(connector, endpoint, ClientOptions::default())
    }

    /// 以显式超时构造客户端。
    pub fn with_options(
        connector: Arc<dyn RegisterConnector>,
        endpoint: DeviceEndpoint,
        options: ClientOptions,
    ) -> Self {
        Self {
            endpoint,
            options,
            connector,
            connection: None,
        }
    }

    pub fn endpoint(&self) -> &DeviceEndpoint {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// 打开连接。幂等：已连接时为 no-op。
    ///
    /// 端点不可达或握手失败返回 `ProtocolError::Connection`；不做内部重试。
    pub async fn open(&mut self) -> Result<(), ProtocolError> {
        if self.connection.is_some() {
            return Ok(());
        }
        let connect = self.connector.connect(&self.endpoint);
        let connection = match tokio::time::timeout(self.options.connect_timeout, connect).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ProtocolError::Timeout(
                    self.options.connect_timeout.as_millis() as u64,
                ));
            }
        };
        debug!(endpoint = %self.endpoint, "register connection opened");
        self.connection = Some(connection);
        Ok(())
    }

    /// 读取 `count` 个连续寄存器（`count >= 1`）。
    ///
    /// 未连接时自动建连。成功时返回的序列长度恒等于 `count`，从不返回
    /// 部分数据。设备返回异常码 -> `Protocol`（连接保留）；传输故障 ->
    /// `Connection`/`Timeout`（连接句柄作废，回到 `Disconnected`）。
    pub async fn read_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        if count == 0 {
            return Err(ProtocolError::InvalidRequest(
                "register count must be at least 1".to_string(),
            ));
        }
        self.open().await?;
        let Some(connection) = self.connection.as_mut() else {
            return Err(ProtocolError::Connection("not connected".to_string()));
        };
        let request = connection.read_registers(address, count);
        let result = match tokio::time::timeout(self.options.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => {
                self.connection = None;
                return Err(ProtocolError::Timeout(
                    self.options.request_timeout.as_millis() as u64,
                ));
            }
        };
        match result {
            Ok(values) => {
                if values.len() != count as usize {
                    return Err(ProtocolError::Protocol(format!(
                        "short response: expected {} registers, got {}",
                        count,
                        values.len()
                    )));
                }
                Ok(values)
            }
            Err(err) => {
                if err.is_transport() {
                    self.connection = None;
                }
                Err(err)
            }
        }
    }

    /// 写入单个寄存器。
    ///
    /// 自动建连与错误语义同 [`read_registers`](Self::read_registers)。
    /// 成功表示设备已确认写入；客户端不做回读校验。
    pub async fn write_register(
        &mut self,
        address: u16,
        value: u16,
    ) -> Result<(), ProtocolError> {
        self.open().await?;
        let Some(connection) = self.connection.as_mut() else {
            return Err(ProtocolError::Connection("not connected".to_string()));
        };
        let request = connection.write_register(address, value);
        let result = match tokio::time::timeout(self.options.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => {
                self.connection = None;
                return Err(ProtocolError::Timeout(
                    self.options.request_timeout.as_millis() as u64,
                ));
            }
        };
        match result {
            Ok(()) => Ok(()),
            Err(err) => {
                if err.is_transport() {
                    self.connection = None;
                }
                Err(err)
            }
        }
    }

    /// 关闭连接并释放句柄。幂等，任何状态下调用都安全，从不失败。
    pub async fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.shutdown().await;
            debug!(endpoint = %self.endpoint, "register connection closed");
        }
    }
}
