//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由包括：
//! - 健康检查：/health
//! - 设备管理：/add-plc, /update-plc/{plc_id}, /delete-plc/{plc_id}
//! - 查询接口：/get-all-plcs, /get-readings, /get-messages
//! - 命令下发：/send-command
//! - 指标快照：/metrics

use super::handlers::*;
use super::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// 创建 API 路由
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/add-plc", post(add_plc))
        .route("/update-plc/:plc_id", put(update_plc))
        .route("/delete-plc/:plc_id", delete(delete_plc))
        .route("/get-all-plcs", get(get_all_plcs))
        .route("/get-readings", get(get_readings))
        .route("/get-messages", get(get_messages))
        .route("/send-command", post(send_command))
        .route("/metrics", get(get_metrics))
}
