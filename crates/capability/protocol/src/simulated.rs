//! 模拟寄存器设备
//!
//! 进程内的寄存器组实现，用于本地演示和测试：
//! - 支持写后回读
//! - 可标记端点不可达（建连失败）或卡死（触发操作超时）
//! - 越界访问返回设备异常（协议错误，连接保留）
//! - 记录在途连接数，用于校验释放纪律

use crate::client::{RegisterConnection, RegisterConnector};
use crate::error::ProtocolError;
use async_trait::async_trait;
use domain::DeviceEndpoint;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 模拟设备的寄存器组。克隆共享同一份寄存器。
#[derive(Debug, Clone)]
pub struct SimulatedRegisterDevice {
    registers: Arc<Mutex<Vec<u16>>>,
}

impl SimulatedRegisterDevice {
    /// 创建 `size` 个全零寄存器的设备。
    pub fn new(size: usize) -> Self {
        Self::with_registers(vec![0; size])
    }

    /// 以给定初值创建设备。
    pub fn with_registers(registers: Vec<u16>) -> Self {
        Self {
            registers: Arc::new(Mutex::new(registers)),
        }
    }

    fn read(&self, address: u16, count: u16) -> Result<Vec<u16>, ProtocolError> {
        let registers = self
            .registers
            .lock()
            .map_err(|_| ProtocolError::Protocol("register bank poisoned".to_string()))?;
        let start = address as usize;
        let end = start + count as usize;
        if end > registers.len() {
            return Err(ProtocolError::Protocol(format!(
                "exception: illegal data address {}..{}",
                start, end
            )));
        }
        Ok(registers[start..end].to_vec())
    }

    fn write(&self, address: u16, value: u16) -> Result<(), ProtocolError> {
        let mut registers = self
            .registers
            .lock()
            .map_err(|_| ProtocolError::Protocol("register bank poisoned".to_string()))?;
        let slot = address as usize;
        if slot >= registers.len() {
            return Err(ProtocolError::Protocol(format!(
                "exception: illegal data address {}",
                slot
            )));
        }
        registers[slot] = value;
        Ok(())
    }

    /// 当前寄存器快照（测试断言用）。
    pub fn snapshot(&self) -> Vec<u16> {
        self.registers.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

/// 模拟建连器：按端点套接字地址路由到模拟设备。
#[derive(Default)]
pub struct SimulatedConnector {
    devices: Mutex<HashMap<String, SimulatedRegisterDevice>>,
    unreachable: Mutex<HashSet<String>>,
    stalled: Mutex<HashSet<String>>,
    open_connections: Arc<AtomicUsize>,
}

impl SimulatedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一台模拟设备。
    pub fn register_device(&self, endpoint: &DeviceEndpoint, device: SimulatedRegisterDevice) {
        if let Ok(mut devices) = self.devices.lock() {
            devices.insert(endpoint.socket_addr(), device);
        }
    }

    /// 获取端点对应的设备句柄（共享寄存器组）。
    pub fn device(&self, endpoint: &DeviceEndpoint) -> Option<SimulatedRegisterDevice> {
        self.devices
            .lock()
            .ok()
            .and_then(|devices| devices.get(&endpoint.socket_addr()).cloned())
    }

    /// 标记端点不可达：后续建连返回连接错误。
    pub fn set_unreachable(&self, endpoint: &DeviceEndpoint) {
        if let Ok(mut unreachable) = self.unreachable.lock() {
            unreachable.insert(endpoint.socket_addr());
        }
    }

    /// 恢复端点可达。
    pub fn set_reachable(&self, endpoint: &DeviceEndpoint) {
        if let Ok(mut unreachable) = self.unreachable.lock() {
            unreachable.remove(&endpoint.socket_addr());
        }
    }

    /// 标记端点卡死：建连成功但任何读写都不再返回。
    pub fn set_stalled(&self, endpoint: &DeviceEndpoint) {
        if let Ok(mut stalled) = self.stalled.lock() {
            stalled.insert(endpoint.socket_addr());
        }
    }

    /// 当前在途连接数。
    pub fn open_connections(&self) -> usize {
        self.open_connections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegisterConnector for SimulatedConnector {
    async fn connect(
        &self,
        endpoint: &DeviceEndpoint,
    ) -> Result<Box<dyn RegisterConnection>, ProtocolError> {
        let key = endpoint.socket_addr();
        let unreachable = self
            .unreachable
            .lock()
            .map(|set| set.contains(&key))
            .unwrap_or(false);
        if unreachable {
            return Err(ProtocolError::Connection(format!(
                "connection refused: {}",
                key
            )));
        }
        let device = self
            .devices
            .lock()
            .ok()
            .and_then(|devices| devices.get(&key).cloned())
            .ok_or_else(|| ProtocolError::Connection(format!("no route to {}", key)))?;
        let stalled = self
            .stalled
            .lock()
            .map(|set| set.contains(&key))
            .unwrap_or(false);
        self.open_connections.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimulatedConnection {
            device,
            stalled,
            open_connections: Arc::clone(&self.open_connections),
            released: false,
        }))
    }
}

/// 一条模拟连接。释放计数在 shutdown 或 drop 时归还。
struct SimulatedConnection {
    device: SimulatedRegisterDevice,
    stalled: bool,
    open_connections: Arc<AtomicUsize>,
    released: bool,
}

impl SimulatedConnection {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.open_connections.fetch_sub(1, Ordering::SeqCst);
        }
    }

    async fn stall() {
        // 足够长，调用方的操作超时先触发
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }
}

#[async_trait]
impl RegisterConnection for SimulatedConnection {
    async fn read_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ProtocolError> {
        if self.stalled {
            Self::stall().await;
        }
        self.device.read(address, count)
    }

    async fn write_register(&mut self, address: u16, value: u16) -> Result<(), ProtocolError> {
        if self.stalled {
            Self::stall().await;
        }
        self.device.write(address, value)
    }

    async fn shutdown(&mut self) {
        self.release();
    }
}

impl Drop for SimulatedConnection {
    fn drop(&mut self) {
        self.release();
    }
}
