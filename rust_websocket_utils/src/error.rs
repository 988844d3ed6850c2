// rust_websocket_utils/src/error.rs

//! 定义 WebSocket 工具库相关的错误类型。

use std::time::Duration;
use thiserror::Error; // 引入 thiserror 来简化错误类型的定义

/// WebSocket 工具库的统一错误类型。
#[derive(Error, Debug)]
pub enum WsError {
    /// WebSocket 协议相关的错误。
    /// 例如，连接问题、握手失败、帧格式不正确等。
    #[error("WebSocket协议错误: {0}")]
    WebSocketProtocolError(#[from] tokio_tungstenite::tungstenite::Error),

    /// 底层 I/O 错误。
    #[error("I/O错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 其他传输实现 (例如 axum 的 WebSocket) 报告的错误，仅保留其描述文本。
    #[error("传输层错误: {0}")]
    Transport(String),

    /// 在已关闭的连接上继续写入。
    #[error("连接已关闭")]
    ConnectionClosed,

    /// 单帧写入超过了允许的时限。
    #[error("写入超时 (超过 {0:?})")]
    WriteTimeout(Duration),

    /// 无效的 URL 格式。
    #[error("无效的URL: {0}")]
    InvalidUrl(String),
}
