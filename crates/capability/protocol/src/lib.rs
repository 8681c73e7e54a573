//! # 寄存器协议能力模块
//!
//! 管理 PLC 设备连接生命周期并提供寄存器读写：
//!
//! - [`client`]：寄存器客户端（一台设备一条连接、懒建连、显式关闭）
//! - [`modbus`]：Modbus TCP 建连实现（tokio-modbus）
//! - [`simulated`]：进程内模拟设备（测试与演示）
//! - [`error`]：协议错误类型
//!
//! 客户端不做内部重试；恢复策略由调用方（采集扫描的下一轮、命令
//! 下发的上层）决定。

pub mod client;
pub mod error;
pub mod modbus;
pub mod simulated;

pub use client::{ClientOptions, RegisterClient, RegisterConnection, RegisterConnector};
pub use error::ProtocolError;
pub use modbus::ModbusTcpConnector;
pub use simulated::{SimulatedConnector, SimulatedRegisterDevice};
