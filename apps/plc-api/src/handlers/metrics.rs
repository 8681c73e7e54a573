//! Telemetry 指标快照。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use plc_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::with_data(
            "Metrics fetched successfully",
            MetricsSnapshotDto {
                sweeps_completed: snapshot.sweeps_completed,
                polls_succeeded: snapshot.polls_succeeded,
                polls_failed: snapshot.polls_failed,
                readings_written: snapshot.readings_written,
                reading_write_failure: snapshot.reading_write_failure,
                sweep_latency_ms_total: snapshot.sweep_latency_ms_total,
                sweep_latency_ms_count: snapshot.sweep_latency_ms_count,
                commands_issued: snapshot.commands_issued,
                command_write_success: snapshot.command_write_success,
                command_write_failure: snapshot.command_write_failure,
                messages_received: snapshot.messages_received,
                messages_relayed: snapshot.messages_relayed,
            },
        )),
    )
        .into_response()
}
