//! 命令下发能力模块
//!
//! 按需的单次命令路径：由 API 边界同步调用，向指定设备的寄存器写入
//! 一个值。每次下发都：
//! 1. 按 plc_id 在注册表查找设备（缺失 -> `ControlError::NotFound`，
//!    这是客户端错误而非服务端故障）
//! 2. 为设备存储的端点新建一个专属客户端，恰好发出一次写入
//! 3. 无论成败都无条件关闭连接
//!
//! 连接/协议层失败不会越过本边界向上抛：统一转换为结构化的
//! [`CommandOutcome`]，由调用方决定 HTTP 状态映射。

use plc_protocol::{ClientOptions, RegisterClient, RegisterConnector};
use plc_storage::PlcStore;
use plc_telemetry::{
    record_command_issued, record_command_write_failure, record_command_write_success,
};
use std::sync::Arc;
use tracing::{info, warn};

/// 控制链路错误。
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// 注册表中不存在该设备
    #[error("unknown plc: {0}")]
    NotFound(String),

    /// 注册表读取失败
    #[error("storage error: {0}")]
    Storage(String),
}

/// 一次命令下发的结构化结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    pub message: String,
}

impl CommandOutcome {
    fn acknowledged() -> Self {
        Self {
            success: true,
            message: "Write successful".to_string(),
        }
    }

    fn failed(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            message: detail.into(),
        }
    }
}

/// 命令服务。
pub struct CommandService {
    plc_store: Arc<dyn PlcStore>,
    connector: Arc<dyn RegisterConnector>,
    client_options: ClientOptions,
}

impl CommandService {
    pub fn new(plc_store: Arc<dyn PlcStore>, connector: Arc<dyn RegisterConnector>) -> Self {
        Self::with_options(plc_store, connector, ClientOptions::default())
    }

    pub fn with_options(
        plc_store: Arc<dyn PlcStore>,
        connector: Arc<dyn RegisterConnector>,
        client_options: ClientOptions,
    ) -> Self {
        Self {
            plc_store,
            connector,
            client_options,
        }
    }

    /// 向设备寄存器写入一个值。
    ///
    /// 成功的含义是设备已确认写入；客户端不做回读校验。
    pub async fn send_command(
        &self,
        plc_id: &str,
        register_address: u16,
        value: u16,
    ) -> Result<CommandOutcome, ControlError> {
        record_command_issued();
        let device = self
            .plc_store
            .find_plc(plc_id)
            .await
            .map_err(|err| ControlError::Storage(err.to_string()))?
            .ok_or_else(|| ControlError::NotFound(plc_id.to_string()))?;

        let mut client = RegisterClient::with_options(
            Arc::clone(&self.connector),
            device.endpoint(),
            self.client_options.clone(),
        );
        let result = client.write_register(register_address, value).await;
        client.close().await;

        match result {
            Ok(()) => {
                record_command_write_success();
                info!(
                    plc_id = %plc_id,
                    register = register_address,
                    value = value,
                    "command write acknowledged"
                );
                Ok(CommandOutcome::acknowledged())
            }
            Err(err) => {
                record_command_write_failure();
                warn!(
                    plc_id = %plc_id,
                    register = register_address,
                    error = %err,
                    "command write failed"
                );
                Ok(CommandOutcome::failed(err.to_string()))
            }
        }
    }
}
