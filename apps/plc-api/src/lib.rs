//! PLC 管理 API：设备注册 CRUD、分页查询、命令下发与请求追踪 ID。

pub mod handlers;
pub mod routes;
pub mod utils;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
    Router,
};
use plc_control::CommandService;
use plc_storage::{MessageStore, PlcStore, ReadingStore};
use plc_telemetry::new_request_ids;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

/// 应用状态：handlers 共享的存储与服务实例。
#[derive(Clone)]
pub struct AppState {
    pub plc_store: Arc<dyn PlcStore>,
    pub reading_store: Arc<dyn ReadingStore>,
    pub message_store: Arc<dyn MessageStore>,
    pub command_service: Arc<CommandService>,
}

/// 组装完整的应用路由（含请求追踪中间件）。
pub fn build_router(state: AppState) -> Router {
    routes::create_api_router()
        .with_state(state)
        .layer(middleware::from_fn(request_context))
        .layer(TraceLayer::new_for_http())
}

/// 注入 request_id/trace_id 并为整个请求建立日志 span。
pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}
