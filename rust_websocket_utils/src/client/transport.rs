// rust_websocket_utils/src/client/transport.rs

//! 客户端 WebSocket 传输层核心逻辑。
//!
//! 本模块负责建立与服务器的连接，并返回统一的 `Connection`，
//! 之后的收发都通过 `Connection::read_frame` / `Connection::write_frame` 完成。

use crate::connection::Connection;
use crate::error::WsError;
use crate::stream::connection_from_stream;
use log::{debug, error, info};
use std::net::{Ipv4Addr, SocketAddr};
use tokio_tungstenite::{connect_async, MaybeTlsStream};
use url::Url;

/// 异步连接到指定的 WebSocket 服务器。
///
/// # Arguments
/// * `url_str` - WebSocket 服务器的完整 URL (例如 "ws://127.0.0.1:8080/ws")。
///
/// # Returns
/// * `Ok(Connection)` - 握手完成后的连接。
/// * `Err(WsError::InvalidUrl)` - URL 无法解析或不是 ws/wss 协议。
/// * `Err(WsError::WebSocketProtocolError)` - 连接或握手失败。
pub async fn connect_client(url_str: &str) -> Result<Connection, WsError> {
    info!("客户端：开始尝试连接到 WebSocket 服务器，URL: {}", url_str);
    let parsed_url = Url::parse(url_str)
        .map_err(|e| WsError::InvalidUrl(format!("无效的 WebSocket URL '{}': {}", url_str, e)))?;
    if parsed_url.scheme() != "ws" && parsed_url.scheme() != "wss" {
        return Err(WsError::InvalidUrl(format!(
            "不支持的协议 '{}'，仅支持 ws/wss",
            parsed_url.scheme()
        )));
    }

    match connect_async(parsed_url.as_str()).await {
        Ok((ws_stream, response)) => {
            info!("客户端：已成功连接到 {} (HTTP 状态码: {})", url_str, response.status());
            debug!("客户端：WebSocket 连接响应头: {:?}", response.headers());
            let peer_addr = match ws_stream.get_ref() {
                MaybeTlsStream::Plain(tcp) => tcp.peer_addr()?,
                #[allow(unreachable_patterns)]
                _ => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            };
            Ok(connection_from_stream(ws_stream, peer_addr))
        }
        Err(e) => {
            error!("客户端：连接到 {} 失败，错误: {}", url_str, e);
            Err(WsError::WebSocketProtocolError(e))
        }
    }
}
