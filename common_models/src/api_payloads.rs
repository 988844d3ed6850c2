// common_models/src/api_payloads.rs

//! 包含 HTTP API 中使用的各种 Payload 结构体定义。

use serde::{Deserialize, Serialize};

/// `POST /api/message` 接口的请求体。
///
/// 对应 JSON 形如 `{"message": "some text"}`。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PostMessagePayload {
    /// 客户端提交的消息文本。
    pub message: String,
}

/// 接口处理失败时返回给调用方的错误负载。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponsePayload {
    /// 可读的错误描述。
    pub error: String,
}

/// `GET /api/stats` 接口的响应体。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HubStatsPayload {
    /// 当前在中枢注册表中的客户端数量。
    pub connected_clients: usize,
}
