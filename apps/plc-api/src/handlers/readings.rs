//! 读数查询 handler
//!
//! - GET /get-readings - 按设备/时间范围过滤的分页读数列表

use crate::utils::response::{reading_to_dto, storage_error, validation_error};
use crate::utils::{normalize_optional, parse_optional_date_ms};
use crate::AppState;
use api_contract::ApiResponse;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use plc_storage::{ensure_page_bounds, Paginator, ReadingFilter};

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    10
}

#[derive(Debug, serde::Deserialize)]
pub struct ReadingListQuery {
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_limit")]
    limit: u64,
    plc_id: Option<String>,
    from_date: Option<String>,
    to_date: Option<String>,
}

pub async fn get_readings(
    State(state): State<AppState>,
    Query(query): Query<ReadingListQuery>,
) -> Response {
    if let Err(err) = ensure_page_bounds(query.page, query.limit) {
        return validation_error(err);
    }
    let from_ms = match parse_optional_date_ms(&query.from_date) {
        Ok(value) => value,
        Err(err) => return validation_error(err),
    };
    let to_ms = match parse_optional_date_ms(&query.to_date) {
        Ok(value) => value,
        Err(err) => return validation_error(err),
    };
    let filter = ReadingFilter {
        plc_id: normalize_optional(query.plc_id),
        from_ms,
        to_ms,
    };
    if let Err(err) = filter.validate() {
        return validation_error(err);
    }

    let paginator = Paginator::new(state.reading_store.as_ref(), "/get-readings")
        .with_filter_params(filter.query_params());
    match paginator.paginate(&filter, query.page, query.limit).await {
        Ok(page) => {
            let page = page.map(reading_to_dto);
            (
                StatusCode::OK,
                Json(ApiResponse::with_data(
                    "Reading list fetched successfully",
                    page,
                )),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}
