//! HTTP API 请求处理模块。
//!
//! - `message_handler`: `POST /api/message`，解析 JSON 请求体并回显其中的消息。
//! - `stats_handler`: `GET /api/stats`，返回消息中枢当前的在线客户端数量。

pub mod message_handler;
pub mod stats_handler;

use crate::state::AppState;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use common_models::api_payloads::ErrorResponsePayload;
use thiserror::Error;

/// API 处理函数返回给调用方的错误
#[derive(Error, Debug)]
pub enum ApiError {
    /// 请求体无法解析为预期的 JSON 结构
    #[error("无效的请求体: {0}")]
    InvalidPayload(String),

    /// 消息中枢已停止
    #[error("消息中枢不可用")]
    HubUnavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::HubUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(ErrorResponsePayload { error: self.to_string() })).into_response()
    }
}

/// 所有 `/api` 路由
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/message", post(message_handler::post_message))
        .route("/api/stats", get(stats_handler::hub_stats))
}
