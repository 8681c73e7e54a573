//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_url: String,
    pub mqtt_host: String,
    pub mqtt_port: u16,
    pub mqtt_username: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_topic_prefix: String,
    pub acquisition_enabled: bool,
    pub ingest_enabled: bool,
    pub relay_enabled: bool,
    /// 全量采集扫描间隔（秒）
    pub poll_interval_seconds: u64,
    /// 消息中继间隔（秒）
    pub relay_interval_seconds: u64,
    /// 轮询读取的起始寄存器地址
    pub register_address: u16,
    /// 轮询读取的寄存器数量
    pub register_count: u16,
    /// 同时在途的设备轮询上限
    pub max_concurrent_polls: usize,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("PLC_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("PLC_DATABASE_URL".to_string()))?;
        let http_addr = env::var("PLC_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let mqtt_host = env::var("PLC_MQTT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let mqtt_port = read_u16_with_default("PLC_MQTT_PORT", 1883)?;
        let mqtt_username = read_optional("PLC_MQTT_USERNAME");
        let mqtt_password = read_optional("PLC_MQTT_PASSWORD");
        let mqtt_topic_prefix =
            env::var("PLC_MQTT_TOPIC_PREFIX").unwrap_or_else(|_| "plc/messages".to_string());
        let acquisition_enabled = read_bool_with_default("PLC_ACQUISITION", true);
        let ingest_enabled = read_bool_with_default("PLC_INGEST", false);
        let relay_enabled = read_bool_with_default("PLC_RELAY", true);
        let poll_interval_seconds = read_u64_with_default("PLC_POLL_INTERVAL_SECONDS", 1)?;
        let relay_interval_seconds = read_u64_with_default("PLC_RELAY_INTERVAL_SECONDS", 5)?;
        let register_address = read_u16_with_default("PLC_REGISTER_ADDRESS", 0)?;
        let register_count = read_u16_with_default("PLC_REGISTER_COUNT", 2)?;
        let max_concurrent_polls =
            read_u64_with_default("PLC_MAX_CONCURRENT_POLLS", 8)? as usize;
        let connect_timeout_ms = read_u64_with_default("PLC_CONNECT_TIMEOUT_MS", 5000)?;
        let request_timeout_ms = read_u64_with_default("PLC_REQUEST_TIMEOUT_MS", 3000)?;

        Ok(Self {
            http_addr,
            database_url,
            mqtt_host,
            mqtt_port,
            mqtt_username,
            mqtt_password,
            mqtt_topic_prefix,
            acquisition_enabled,
            ingest_enabled,
            relay_enabled,
            poll_interval_seconds,
            relay_interval_seconds,
            register_address,
            register_count,
            max_concurrent_polls,
            connect_timeout_ms,
            request_timeout_ms,
        })
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
