//! 运行时入口：装配存储、后台采集/中继/接入任务与 HTTP 服务。

use plc_acquisition::{AcquisitionConfig, AcquisitionService};
use plc_api::{build_router, AppState};
use plc_config::AppConfig;
use plc_control::CommandService;
use plc_ingest::{MessageRelay, MqttMessageSource, MqttSourceConfig, StoreMessageHandler};
use plc_protocol::{ClientOptions, ModbusTcpConnector, RegisterConnector};
use plc_storage::{PgMessageStore, PgPlcStore, PgReadingStore};
use plc_telemetry::init_tracing;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // Postgres 存储（共享同一连接池）
    let pool = plc_storage::connect_pool(&config.database_url).await?;
    let plc_store = Arc::new(PgPlcStore::new(pool.clone()));
    let reading_store = Arc::new(PgReadingStore::new(pool.clone()));
    let message_store = Arc::new(PgMessageStore::new(pool));

    // 设备客户端超时配置（采集与命令下发共用）
    let client_options = ClientOptions {
        connect_timeout: Duration::from_millis(config.connect_timeout_ms),
        request_timeout: Duration::from_millis(config.request_timeout_ms),
    };
    let connector: Arc<dyn RegisterConnector> = Arc::new(ModbusTcpConnector::new());

    let command_service = Arc::new(CommandService::with_options(
        plc_store.clone(),
        Arc::clone(&connector),
        client_options.clone(),
    ));

    // 周期采集扫描
    if config.acquisition_enabled {
        let acquisition = AcquisitionService::new(
            plc_store.clone(),
            reading_store.clone(),
            Arc::clone(&connector),
            AcquisitionConfig {
                register_address: config.register_address,
                register_count: config.register_count,
                max_concurrent_polls: config.max_concurrent_polls,
                poll_interval: Duration::from_secs(config.poll_interval_seconds),
                client_options: client_options.clone(),
            },
        );
        info!(
            interval_seconds = config.poll_interval_seconds,
            "acquisition sweep scheduled"
        );
        tokio::spawn(async move {
            acquisition.run().await;
        });
    }

    // 消息中继
    if config.relay_enabled {
        let relay = MessageRelay::new(
            plc_store.clone(),
            message_store.clone(),
            Duration::from_secs(config.relay_interval_seconds),
        );
        info!(
            interval_seconds = config.relay_interval_seconds,
            "message relay scheduled"
        );
        tokio::spawn(async move {
            relay.run().await;
        });
    }

    // MQTT 消息接入
    if config.ingest_enabled {
        let source = MqttMessageSource::new(MqttSourceConfig {
            host: config.mqtt_host.clone(),
            port: config.mqtt_port,
            username: config.mqtt_username.clone(),
            password: config.mqtt_password.clone(),
            topic_prefix: config.mqtt_topic_prefix.clone(),
        });
        let handler = Arc::new(StoreMessageHandler::new(message_store.clone()));
        info!(topic_prefix = %config.mqtt_topic_prefix, "mqtt ingest enabled");
        tokio::spawn(async move {
            if let Err(err) = source.run(handler).await {
                warn!(error = %err, "mqtt ingest stopped");
            }
        });
    }

    let state = AppState {
        plc_store,
        reading_store,
        message_store,
        command_service,
    };
    let app = build_router(state);

    info!(addr = %config.http_addr, "plc api listening");
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
