//! API handlers。

pub mod commands;
pub mod messages;
pub mod metrics;
pub mod plcs;
pub mod readings;

pub use commands::send_command;
pub use messages::get_messages;
pub use metrics::get_metrics;
pub use plcs::{add_plc, delete_plc, get_all_plcs, update_plc};
pub use readings::get_readings;

use axum::{response::IntoResponse, Json};

/// 健康检查。
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}
