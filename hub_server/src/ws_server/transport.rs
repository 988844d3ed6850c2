//! 将 axum 升级得到的 `WebSocket` 适配为 `rust_websocket_utils::Connection`。

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use log::{debug, warn};
use rust_websocket_utils::{Connection, Frame, FrameSink, FrameSource, WsError};
use std::net::SocketAddr;

struct SocketSink {
    inner: SplitSink<WebSocket, Message>,
    closed: bool,
}

struct SocketSource {
    inner: SplitStream<WebSocket>,
}

/// 把握手完成的 axum `WebSocket` 包装为帧连接
pub fn connection_from_socket(socket: WebSocket, peer_addr: SocketAddr) -> Connection {
    let (sink, source) = socket.split();
    Connection::new(
        peer_addr,
        SocketSink { inner: sink, closed: false },
        SocketSource { inner: source },
    )
}

fn transport_error(e: axum::Error) -> WsError {
    WsError::Transport(e.to_string())
}

#[async_trait]
impl FrameSink for SocketSink {
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), WsError> {
        if self.closed {
            return Err(WsError::ConnectionClosed);
        }
        self.inner
            .send(Message::Text(frame.as_str().to_owned()))
            .await
            .map_err(transport_error)
    }

    async fn close(&mut self) -> Result<(), WsError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.inner.close().await.map_err(transport_error)
    }
}

#[async_trait]
impl FrameSource for SocketSource {
    async fn read_frame(&mut self) -> Result<Option<Frame>, WsError> {
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(Frame::from(text))),
                Some(Ok(Message::Binary(bin))) => match Frame::from_utf8(bin) {
                    Ok(frame) => return Ok(Some(frame)),
                    Err(e) => warn!("丢弃无法按 UTF-8 解码的二进制帧: {}", e),
                },
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Close(close_frame))) => {
                    debug!("收到 Close 控制帧: {:?}", close_frame);
                    return Ok(None);
                }
                Some(Err(e)) => return Err(transport_error(e)),
                None => return Ok(None),
            }
        }
    }
}
