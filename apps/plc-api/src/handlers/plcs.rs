//! 设备注册 CRUD 与列表查询 handlers
//!
//! - POST /add-plc - 注册设备（plc_id 唯一）
//! - PUT /update-plc/{plc_id} - 部分更新（只覆盖提供的非空字段）
//! - DELETE /delete-plc/{plc_id} - 删除设备
//! - GET /get-all-plcs - 过滤 + 分页列表
//!
//! 列表查询的验证顺序是固定的：分页边界 -> 日期解析 -> 日期范围，
//! 全部通过后才会触达存储；超过 90 天的日期范围在任何查询执行前
//! 就被拒绝。

use crate::utils::response::{
    bad_request_error, conflict_error, not_found_error, plc_to_dto, storage_error,
    validation_error,
};
use crate::utils::{
    nonzero_u16, nonzero_u8, normalize_optional, normalize_required, parse_optional_date_ms,
};
use crate::AppState;
use api_contract::{ApiResponse, PlcCreateRequest, PlcDto, PlcUpdateRequest};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DeviceStatus;
use plc_storage::{ensure_page_bounds, Paginator, PlcFilter, PlcRecord, PlcUpdate, StorageError};

#[derive(serde::Deserialize)]
pub struct PlcPath {
    plc_id: String,
}

/// 注册设备
///
/// # 流程
///
/// 1. 归一化必填字段（plc_id、ip_address），端口必须非零
/// 2. 以当前时间作为 created_at_ms 写入注册表
/// 3. plc_id 冲突映射为 409，其余存储错误映射为 500
pub async fn add_plc(
    State(state): State<AppState>,
    Json(req): Json<PlcCreateRequest>,
) -> Response {
    let plc_id = match normalize_required(req.plc_id, "plc_id") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ip_address = match normalize_required(req.ip_address, "ip_address") {
        Ok(value) => value,
        Err(response) => return response,
    };
    if req.port == 0 {
        return bad_request_error("port is required");
    }
    let record = PlcRecord {
        plc_id,
        ip_address,
        port: req.port,
        unit_id: req.unit_id.unwrap_or(1),
        status: req.status.unwrap_or_default(),
        created_at_ms: domain::now_epoch_ms(),
    };
    match state.plc_store.create_plc(record).await {
        Ok(item) => (
            StatusCode::OK,
            Json(ApiResponse::with_data(
                "PLC added successfully",
                plc_to_dto(item),
            )),
        )
            .into_response(),
        Err(StorageError::Duplicate(_)) => {
            conflict_error("A plc device with the same unique key already exists.")
        }
        Err(err) => storage_error(err),
    }
}

/// 部分更新设备
///
/// 空字符串与零值字段视为未提供；一个有效字段都没有的请求返回 400。
pub async fn update_plc(
    State(state): State<AppState>,
    Path(path): Path<PlcPath>,
    Json(req): Json<PlcUpdateRequest>,
) -> Response {
    let update = PlcUpdate {
        ip_address: normalize_optional(req.ip_address),
        port: nonzero_u16(req.port),
        unit_id: nonzero_u8(req.unit_id),
        status: req.status,
    };
    if update.is_empty() {
        return bad_request_error("empty update");
    }
    match state.plc_store.update_plc(&path.plc_id, update).await {
        Ok(Some(item)) => (
            StatusCode::OK,
            Json(ApiResponse::with_data(
                "Update data successfully",
                plc_to_dto(item),
            )),
        )
            .into_response(),
        Ok(None) => not_found_error("PLC record not found"),
        Err(err) => storage_error(err),
    }
}

/// 删除设备
pub async fn delete_plc(State(state): State<AppState>, Path(path): Path<PlcPath>) -> Response {
    match state.plc_store.delete_plc(&path.plc_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::<()>::message("PLC deleted successfully")),
        )
            .into_response(),
        Ok(false) => not_found_error("PLC record not found"),
        Err(err) => storage_error(err),
    }
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    10
}

#[derive(Debug, serde::Deserialize)]
pub struct PlcListQuery {
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_limit")]
    limit: u64,
    search: Option<String>,
    status: Option<String>,
    from_date: Option<String>,
    to_date: Option<String>,
    is_pagination: Option<bool>,
}

/// 设备列表
///
/// 支持 plc_id 检索、状态过滤、注册日期范围过滤与分页；
/// `is_pagination=false` 返回完整过滤列表。
pub async fn get_all_plcs(
    State(state): State<AppState>,
    Query(query): Query<PlcListQuery>,
) -> Response {
    if let Err(err) = ensure_page_bounds(query.page, query.limit) {
        return validation_error(err);
    }
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some("active") => Some(DeviceStatus::Active),
        Some("inactive") => Some(DeviceStatus::Inactive),
        Some(other) => {
            return bad_request_error(format!("unknown status: {}", other));
        }
    };
    let from_ms = match parse_optional_date_ms(&query.from_date) {
        Ok(value) => value,
        Err(err) => return validation_error(err),
    };
    let to_ms = match parse_optional_date_ms(&query.to_date) {
        Ok(value) => value,
        Err(err) => return validation_error(err),
    };
    let filter = PlcFilter {
        search: normalize_optional(query.search),
        status,
        from_ms,
        to_ms,
    };
    if let Err(err) = filter.validate() {
        return validation_error(err);
    }

    if query.is_pagination == Some(false) {
        return match state.plc_store.list_plcs(&filter).await {
            Ok(items) => {
                let data: Vec<PlcDto> = items.into_iter().map(plc_to_dto).collect();
                (
                    StatusCode::OK,
                    Json(ApiResponse::with_data("Plc list fetched successfully", data)),
                )
                    .into_response()
            }
            Err(err) => storage_error(err),
        };
    }

    let paginator = Paginator::new(state.plc_store.as_ref(), "/get-all-plcs")
        .with_filter_params(filter.query_params());
    match paginator.paginate(&filter, query.page, query.limit).await {
        Ok(page) => {
            let page = page.map(plc_to_dto);
            (
                StatusCode::OK,
                Json(ApiResponse::with_data("Plc list fetched successfully", page)),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}
