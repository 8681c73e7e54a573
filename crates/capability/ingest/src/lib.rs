//! 消息接入能力模块
//!
//! 两条独立的消息链路：
//!
//! - [`MqttMessageSource`]：订阅 `{prefix}/#`，主题最后一段是设备 ID，
//!   载荷是消息正文；每条消息交给 [`IotMessageHandler`] 落库
//! - [`MessageRelay`]：周期任务，为每台注册设备查出最新一条消息并
//!   upsert 到该设备的最近消息记录；单台设备的存储失败只计数不中断
//!
//! 中继覆盖全部注册设备（不按状态过滤）；只有采集扫描区分活跃设备。

use async_trait::async_trait;
use plc_storage::{
    IotMessageRecord, LastMessageRecord, MessageStore, PlcFilter, PlcStore, StorageError,
};
use plc_telemetry::{record_message_received, record_message_relayed};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// 接入错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 消息源错误（MQTT 订阅/事件循环）
    #[error("source error: {0}")]
    Source(String),

    /// 消息处理器错误
    #[error("handler error: {0}")]
    Handler(String),

    /// 存储错误
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for IngestError {
    fn from(err: StorageError) -> Self {
        IngestError::Storage(err.to_string())
    }
}

/// 设备消息处理器。
#[async_trait]
pub trait IotMessageHandler: Send + Sync {
    async fn handle(&self, device_id: &str, message: &str, ts_ms: i64)
        -> Result<(), IngestError>;
}

/// 入库处理器：把收到的消息追加到消息存储。
pub struct StoreMessageHandler {
    message_store: Arc<dyn MessageStore>,
}

impl StoreMessageHandler {
    pub fn new(message_store: Arc<dyn MessageStore>) -> Self {
        Self { message_store }
    }
}

#[async_trait]
impl IotMessageHandler for StoreMessageHandler {
    async fn handle(
        &self,
        device_id: &str,
        message: &str,
        ts_ms: i64,
    ) -> Result<(), IngestError> {
        self.message_store
            .insert_message(IotMessageRecord {
                message_id: uuid::Uuid::new_v4().to_string(),
                device_id: device_id.to_string(),
                message: message.to_string(),
                ts_ms,
            })
            .await?;
        record_message_received();
        debug!(device_id = %device_id, "iot message stored");
        Ok(())
    }
}

/// MQTT 采集源配置。
#[derive(Debug, Clone)]
pub struct MqttSourceConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 订阅主题前缀；设备消息发布在 `{prefix}/{device_id}`
    pub topic_prefix: String,
}

/// MQTT 采集源。
#[derive(Debug, Clone)]
pub struct MqttMessageSource {
    config: MqttSourceConfig,
}

impl MqttMessageSource {
    pub fn new(config: MqttSourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MqttSourceConfig {
        &self.config
    }

    /// 运行订阅循环。
    ///
    /// 单条消息的处理失败只记日志；事件循环错误终止并向上返回。
    pub async fn run(&self, handler: Arc<dyn IotMessageHandler>) -> Result<(), IngestError> {
        let client_id = format!("plc-ingest-{}", uuid::Uuid::new_v4());
        let mut options =
            rumqttc::MqttOptions::new(client_id, self.config.host.clone(), self.config.port);
        options.set_keep_alive(Duration::from_secs(30));
        if let (Some(username), Some(password)) =
            (self.config.username.as_ref(), self.config.password.as_ref())
        {
            options.set_credentials(username, password);
        }

        let (client, mut eventloop) = rumqttc::AsyncClient::new(options, 10);
        let topic = format!("{}/#", self.config.topic_prefix.trim_end_matches('/'));
        client
            .subscribe(topic, rumqttc::QoS::AtMostOnce)
            .await
            .map_err(|err| IngestError::Source(err.to_string()))?;

        loop {
            match eventloop.poll().await {
                Ok(rumqttc::Event::Incoming(rumqttc::Packet::Publish(publish))) => {
                    let Some(device_id) =
                        extract_device_id(&self.config.topic_prefix, &publish.topic)
                    else {
                        warn!("mqtt topic skipped: {}", publish.topic);
                        continue;
                    };
                    let message = String::from_utf8_lossy(&publish.payload).to_string();
                    if let Err(err) = handler
                        .handle(&device_id, &message, domain::now_epoch_ms())
                        .await
                    {
                        warn!(device_id = %device_id, error = %err, "iot message handler failed");
                    }
                }
                Ok(_) => {}
                Err(err) => return Err(IngestError::Source(err.to_string())),
            }
        }
    }
}

/// 主题最后一段即设备 ID（`{prefix}/{device_id}`）。
fn extract_device_id(prefix: &str, topic: &str) -> Option<String> {
    let prefix = prefix.trim_matches('/');
    let topic = topic.trim_matches('/');
    let rest = if prefix.is_empty() {
        topic
    } else {
        topic.strip_prefix(prefix)?
    };
    let device_id = rest
        .split('/')
        .filter(|part| !part.is_empty())
        .last()?
        .to_string();
    Some(device_id)
}

/// 一轮消息中继的汇总。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    /// upsert 成功的设备数
    pub relayed: usize,
    /// 尚无消息可中继的设备数
    pub skipped: usize,
    /// 存储失败的设备数
    pub failed: usize,
}

/// 消息中继：按设备 upsert 最近一条消息。
pub struct MessageRelay {
    plc_store: Arc<dyn PlcStore>,
    message_store: Arc<dyn MessageStore>,
    relay_interval: Duration,
}

impl MessageRelay {
    pub fn new(
        plc_store: Arc<dyn PlcStore>,
        message_store: Arc<dyn MessageStore>,
        relay_interval: Duration,
    ) -> Self {
        Self {
            plc_store,
            message_store,
            relay_interval,
        }
    }

    /// 执行一轮中继。
    pub async fn run_once(&self) -> Result<RelaySummary, IngestError> {
        let devices = self.plc_store.list_plcs(&PlcFilter::default()).await?;
        let mut summary = RelaySummary::default();
        for device in devices {
            let latest = match self.message_store.find_latest_message(&device.plc_id).await {
                Ok(latest) => latest,
                Err(err) => {
                    warn!(plc_id = %device.plc_id, error = %err, "latest message lookup failed");
                    summary.failed += 1;
                    continue;
                }
            };
            let Some(latest) = latest else {
                summary.skipped += 1;
                continue;
            };
            let record = LastMessageRecord {
                device_id: device.plc_id.clone(),
                message: latest.message,
                ts_ms: domain::now_epoch_ms(),
            };
            match self.message_store.upsert_last_message(record).await {
                Ok(()) => {
                    record_message_relayed();
                    summary.relayed += 1;
                }
                Err(err) => {
                    warn!(plc_id = %device.plc_id, error = %err, "last message upsert failed");
                    summary.failed += 1;
                }
            }
        }
        info!(
            relayed = summary.relayed,
            skipped = summary.skipped,
            failed = summary.failed,
            "message relay finished"
        );
        Ok(summary)
    }

    /// 以固定间隔驱动中继，永不返回。
    pub async fn run(&self) {
        let mut ticker = interval(self.relay_interval);
        loop {
            ticker.tick().await;
            if let Err(err) = self.run_once().await {
                warn!(error = %err, "message relay failed");
            }
        }
    }
}
