//! `POST /api/message` 接口。
//!
//! 请求体形如 `{"message": "..."}`，成功时以纯文本返回 `Message: <内容>`。
//! 请求体格式错误时返回 400 和 JSON 错误描述，不会影响进程。

use super::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use common_models::api_payloads::PostMessagePayload;
use log::{info, warn};

pub async fn post_message(
    payload: Result<Json<PostMessagePayload>, JsonRejection>,
) -> Result<String, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!("[API] /api/message 请求体解析失败: {}", rejection.body_text());
        ApiError::InvalidPayload(rejection.body_text())
    })?;
    info!("[API] /api/message 收到消息: {}", payload.message);
    Ok(format!("Message: {}", payload.message))
}

#[cfg(test)]
mod tests {
    use crate::api::routes;
    use crate::config::HubConfig;
    use crate::state::AppState;
    use crate::ws_server::hub::Hub;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use common_models::api_payloads::ErrorResponsePayload;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        let (hub, handle) = Hub::new(&HubConfig::default());
        tokio::spawn(hub.run());
        routes().with_state(AppState::new(handle))
    }

    fn post_json(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/message")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_payload_is_echoed() {
        let response = app().oneshot(post_json(r#"{"message": "json-data"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], "Message: json-data".as_bytes());
    }

    #[tokio::test]
    async fn test_malformed_payload_returns_typed_error() {
        let response = app().oneshot(post_json(r#"{"message": "#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: ErrorResponsePayload = serde_json::from_slice(&body).expect("错误响应应为 JSON");
        assert!(!error.error.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_shape_returns_typed_error() {
        let response = app().oneshot(post_json(r#"{"text": 42}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
