//! 周期采集能力模块
//!
//! 对注册表中的活跃设备做一轮轮询扫描（sweep）：
//! 1. 取活跃设备的即时快照（扫描中途的注册/注销不追溯生效）
//! 2. 按设备独立轮询：新建客户端、读寄存器、成功则落一条读数
//! 3. 单台设备失败只记日志并计数，既不中断整轮扫描也不在本轮重试，
//!    恢复依靠下一轮扫描自然重试
//! 4. 每台设备的连接在任何退出路径上都先释放再结束
//!
//! 扫描之间不传递任何状态，节拍由 [`AcquisitionService::run`] 的固定
//! 间隔驱动；轮询通过有界工作池并发展开（信号量限流），同一设备的
//! 客户端实例不会被并发共享。

use plc_protocol::{ClientOptions, RegisterClient, RegisterConnector};
use plc_storage::{PlcRecord, PlcStore, ReadingRecord, ReadingStore, StorageError};
use plc_telemetry::{
    record_poll_failure, record_poll_success, record_reading_write_failure,
    record_reading_written, record_sweep_completed, record_sweep_latency_ms,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// 采集错误。
///
/// 只有扫描入口的注册表读取会以错误终止一轮扫描；
/// 单台设备的轮询/落库失败都被隔离进 [`SweepSummary`]。
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for AcquisitionError {
    fn from(err: StorageError) -> Self {
        AcquisitionError::Storage(err.to_string())
    }
}

/// 采集配置。
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// 轮询读取的起始寄存器地址
    pub register_address: u16,
    /// 轮询读取的寄存器数量
    pub register_count: u16,
    /// 同时在途的设备轮询上限
    pub max_concurrent_polls: usize,
    /// 扫描间隔
    pub poll_interval: Duration,
    /// 设备客户端超时配置
    pub client_options: ClientOptions,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            register_address: 0,
            register_count: 2,
            max_concurrent_polls: 8,
            poll_interval: Duration::from_secs(1),
            client_options: ClientOptions::default(),
        }
    }
}

/// 一轮扫描的汇总结果：这是扫描对外的唯一聚合信号。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// 采集服务。
pub struct AcquisitionService {
    plc_store: Arc<dyn PlcStore>,
    reading_store: Arc<dyn ReadingStore>,
    connector: Arc<dyn RegisterConnector>,
    config: AcquisitionConfig,
}

impl AcquisitionService {
    pub fn new(
        plc_store: Arc<dyn PlcStore>,
        reading_store: Arc<dyn ReadingStore>,
        connector: Arc<dyn RegisterConnector>,
        config: AcquisitionConfig,
    ) -> Self {
        Self {
            plc_store,
            reading_store,
            connector,
            config,
        }
    }

    /// 执行一轮扫描并返回汇总。
    pub async fn run_sweep(&self) -> Result<SweepSummary, AcquisitionError> {
        let started_at = Instant::now();
        let devices = self.plc_store.list_active_plcs().await?;
        let device_count = devices.len();

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_polls.max(1)));
        let mut tasks: JoinSet<bool> = JoinSet::new();
        for device in devices {
            let semaphore = Arc::clone(&semaphore);
            let connector = Arc::clone(&self.connector);
            let reading_store = Arc::clone(&self.reading_store);
            let config = self.config.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                poll_device(connector, reading_store, device, &config).await
            });
        }

        let mut summary = SweepSummary::default();
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(true) => summary.succeeded += 1,
                Ok(false) => summary.failed += 1,
                Err(err) => {
                    warn!(error = %err, "device poll task aborted");
                    summary.failed += 1;
                }
            }
        }

        record_sweep_completed();
        record_sweep_latency_ms(started_at.elapsed().as_millis() as u64);
        info!(
            devices = device_count,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "acquisition sweep finished"
        );
        Ok(summary)
    }

    /// 以固定间隔驱动扫描，永不返回。
    ///
    /// 扫描级错误（注册表不可读）只记日志，下一个节拍照常触发。
    pub async fn run(&self) {
        let mut ticker = interval(self.config.poll_interval);
        loop {
            ticker.tick().await;
            if let Err(err) = self.run_sweep().await {
                warn!(error = %err, "acquisition sweep failed");
            }
        }
    }
}

/// 轮询单台设备：读寄存器并落一条读数。
///
/// 返回该设备是否计入成功。连接在所有路径上都先于返回释放。
async fn poll_device(
    connector: Arc<dyn RegisterConnector>,
    reading_store: Arc<dyn ReadingStore>,
    device: PlcRecord,
    config: &AcquisitionConfig,
) -> bool {
    let endpoint = device.endpoint();
    let mut client =
        RegisterClient::with_options(connector, endpoint, config.client_options.clone());
    let result = client
        .read_registers(config.register_address, config.register_count)
        .await;
    client.close().await;

    let values = match result {
        Ok(values) => values,
        Err(err) => {
            record_poll_failure();
            warn!(plc_id = %device.plc_id, error = %err, "device poll failed");
            return false;
        }
    };

    let reading = ReadingRecord {
        reading_id: uuid::Uuid::new_v4().to_string(),
        plc_id: device.plc_id.clone(),
        ts_ms: domain::now_epoch_ms(),
        values,
        processed: true,
    };
    match reading_store.insert_reading(reading).await {
        Ok(()) => {
            record_poll_success();
            record_reading_written();
            debug!(plc_id = %device.plc_id, "reading persisted");
            true
        }
        Err(err) => {
            record_poll_failure();
            record_reading_write_failure();
            warn!(plc_id = %device.plc_id, error = %err, "reading persist failed");
            false
        }
    }
}
