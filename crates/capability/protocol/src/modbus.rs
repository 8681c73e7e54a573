//! Modbus TCP 建连实现
//!
//! 通过 tokio-modbus 连接设备端点，按保持寄存器读写。
//! 线缆编码由 tokio-modbus 负责，本模块只做错误归一化：
//! - 传输层错误 -> `ProtocolError::Connection`
//! - 设备异常码 -> `ProtocolError::Protocol`

use crate::client::{RegisterConnection, RegisterConnector};
use crate::error::ProtocolError;
use async_trait::async_trait;
use domain::DeviceEndpoint;
use std::net::SocketAddr;
use tokio_modbus::client::{tcp, Context};
use tokio_modbus::prelude::*;

/// Modbus TCP 建连器。
///
/// 无状态；每次 `connect` 返回一条新的独立连接。
#[derive(Debug, Default)]
pub struct ModbusTcpConnector;

impl ModbusTcpConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RegisterConnector for ModbusTcpConnector {
    async fn connect(
        &self,
        endpoint: &DeviceEndpoint,
    ) -> Result<Box<dyn RegisterConnection>, ProtocolError> {
        let addr: SocketAddr = endpoint
            .socket_addr()
            .parse()
            .map_err(|e| ProtocolError::Connection(format!("invalid address: {}", e)))?;
        let ctx = tcp::connect_slave(addr, Slave(endpoint.unit_id))
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?;
        Ok(Box::new(ModbusTcpConnection { ctx }))
    }
}

/// 单条 Modbus TCP 连接。
struct ModbusTcpConnection {
    ctx: Context,
}

#[async_trait]
impl RegisterConnection for ModbusTcpConnection {
    async fn read_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        let registers = self
            .ctx
            .read_holding_registers(address, count)
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?
            .map_err(|e| ProtocolError::Protocol(format!("exception: {:?}", e)))?;
        Ok(registers)
    }

    async fn write_register(&mut self, address: u16, value: u16) -> Result<(), ProtocolError> {
        self.ctx
            .write_single_register(address, value)
            .await
            .map_err(|e| ProtocolError::Connection(e.to_string()))?
            .map_err(|e| ProtocolError::Protocol(format!("exception: {:?}", e)))?;
        Ok(())
    }

    async fn shutdown(&mut self) {
        let _ = self.ctx.disconnect().await;
    }
}
