//! 消息查询 handler
//!
//! - GET /get-messages - 按设备/正文检索的分页消息列表

use crate::utils::response::{message_to_dto, storage_error, validation_error};
use crate::utils::normalize_optional;
use crate::AppState;
use api_contract::ApiResponse;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use plc_storage::{ensure_page_bounds, MessageFilter, Paginator};

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    10
}

#[derive(Debug, serde::Deserialize)]
pub struct MessageListQuery {
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_limit")]
    limit: u64,
    device_id: Option<String>,
    search: Option<String>,
}

pub async fn get_messages(
    State(state): State<AppState>,
    Query(query): Query<MessageListQuery>,
) -> Response {
    if let Err(err) = ensure_page_bounds(query.page, query.limit) {
        return validation_error(err);
    }
    let filter = MessageFilter {
        device_id: normalize_optional(query.device_id),
        search: normalize_optional(query.search),
    };

    let paginator = Paginator::new(state.message_store.as_ref(), "/get-messages")
        .with_filter_params(filter.query_params());
    match paginator.paginate(&filter, query.page, query.limit).await {
        Ok(page) => {
            let page = page.map(message_to_dto);
            (
                StatusCode::OK,
                Json(ApiResponse::with_data(
                    "Message list fetched successfully",
                    page,
                )),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}
