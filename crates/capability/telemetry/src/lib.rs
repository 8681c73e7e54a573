//! 追踪与请求 ID 生成。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tracing_subscriber::{fmt, EnvFilter};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 基础指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub sweeps_completed: u64,
    pub polls_succeeded: u64,
    pub polls_failed: u64,
    pub readings_written: u64,
    pub reading_write_failure: u64,
    pub sweep_latency_ms_total: u64,
    pub sweep_latency_ms_count: u64,
    pub commands_issued: u64,
    pub command_write_success: u64,
    pub command_write_failure: u64,
    pub messages_received: u64,
    pub messages_relayed: u64,
}

/// 基础指标。
pub struct TelemetryMetrics {
    sweeps_completed: AtomicU64,
    polls_succeeded: AtomicU64,
    polls_failed: AtomicU64,
    readings_written: AtomicU64,
    reading_write_failure: AtomicU64,
    sweep_latency_ms_total: AtomicU64,
    sweep_latency_ms_count: AtomicU64,
    commands_issued: AtomicU64,
    command_write_success: AtomicU64,
    command_write_failure: AtomicU64,
    messages_received: AtomicU64,
    messages_relayed: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            sweeps_completed: AtomicU64::new(0),
            polls_succeeded: AtomicU64::new(0),
            polls_failed: AtomicU64::new(0),
            readings_written: AtomicU64::new(0),
            reading_write_failure: AtomicU64::new(0),
            sweep_latency_ms_total: AtomicU64::new(0),
            sweep_latency_ms_count: AtomicU64::new(0),
            commands_issued: AtomicU64::new(0),
            command_write_success: AtomicU64::new(0),
            command_write_failure: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            messages_relayed: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sweeps_completed: self.sweeps_completed.load(Ordering::Relaxed),
            polls_succeeded: self.polls_succeeded.load(Ordering::Relaxed),
            polls_failed: self.polls_failed.load(Ordering::Relaxed),
            readings_written: self.readings_written.load(Ordering::Relaxed),
            reading_write_failure: self.reading_write_failure.load(Ordering::Relaxed),
            sweep_latency_ms_total: self.sweep_latency_ms_total.load(Ordering::Relaxed),
            sweep_latency_ms_count: self.sweep_latency_ms_count.load(Ordering::Relaxed),
            commands_issued: self.commands_issued.load(Ordering::Relaxed),
            command_write_success: self.command_write_success.load(Ordering::Relaxed),
            command_write_failure: self.command_write_failure.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_relayed: self.messages_relayed.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录完成一轮采集扫描。
pub fn record_sweep_completed() {
    metrics().sweeps_completed.fetch_add(1, Ordering::Relaxed);
}

/// 记录单台设备轮询成功。
pub fn record_poll_success() {
    metrics().polls_succeeded.fetch_add(1, Ordering::Relaxed);
}

/// 记录单台设备轮询失败。
pub fn record_poll_failure() {
    metrics().polls_failed.fetch_add(1, Ordering::Relaxed);
}

/// 记录读数写入成功。
pub fn record_reading_written() {
    metrics().readings_written.fetch_add(1, Ordering::Relaxed);
}

/// 记录读数写入失败。
pub fn record_reading_write_failure() {
    metrics()
        .reading_write_failure
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录扫描耗时（毫秒）。
pub fn record_sweep_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .sweep_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .sweep_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录命令下发请求次数。
pub fn record_command_issued() {
    metrics().commands_issued.fetch_add(1, Ordering::Relaxed);
}

/// 记录命令写入成功次数（设备已确认）。
pub fn record_command_write_success() {
    metrics()
        .command_write_success
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录命令写入失败次数。
pub fn record_command_write_failure() {
    metrics()
        .command_write_failure
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录收到的设备消息次数。
pub fn record_message_received() {
    metrics().messages_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录消息中继 upsert 次数。
pub fn record_message_relayed() {
    metrics().messages_relayed.fetch_add(1, Ordering::Relaxed);
}
