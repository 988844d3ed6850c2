// rust_websocket_utils/src/stream.rs

//! 基于 `tokio-tungstenite` 的 `WebSocketStream` 实现帧连接抽象。
//!
//! 客户端 (`client::transport::connect_client`) 与任何持有原始 `WebSocketStream`
//! 的服务端代码都可以通过 `connection_from_stream` 得到统一的 `Connection`。

use crate::connection::{Connection, FrameSink, FrameSource};
use crate::error::WsError;
use crate::frame::Frame;
use async_trait::async_trait;
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use log::{debug, warn};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::{
    tungstenite::{protocol::Message, Error as TungsteniteError},
    WebSocketStream,
};

/// `WebSocketStream` 的写半部。
pub struct WsStreamSink<S> {
    inner: SplitSink<WebSocketStream<S>, Message>,
    closed: bool,
}

/// `WebSocketStream` 的读半部。
pub struct WsStreamSource<S> {
    inner: SplitStream<WebSocketStream<S>>,
}

/// 将一个已完成握手的 `WebSocketStream` 包装为 `Connection`。
pub fn connection_from_stream<S>(ws_stream: WebSocketStream<S>, peer_addr: SocketAddr) -> Connection
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (sink, source) = ws_stream.split();
    Connection::new(
        peer_addr,
        WsStreamSink { inner: sink, closed: false },
        WsStreamSource { inner: source },
    )
}

#[async_trait]
impl<S> FrameSink for WsStreamSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), WsError> {
        if self.closed {
            return Err(WsError::ConnectionClosed);
        }
        // SinkExt::send 会在返回前 flush，保证整帧写出或报错
        self.inner.send(Message::Text(frame.as_str().to_owned())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), WsError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.inner.close().await {
            Ok(()) => Ok(()),
            Err(TungsteniteError::ConnectionClosed) | Err(TungsteniteError::AlreadyClosed) => Ok(()),
            Err(e) => Err(WsError::from(e)),
        }
    }
}

#[async_trait]
impl<S> FrameSource for WsStreamSource<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn read_frame(&mut self) -> Result<Option<Frame>, WsError> {
        // 内部循环只用于跳过控制帧，真正的读取循环在调用方
        loop {
            match self.inner.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(Frame::from(text))),
                Some(Ok(Message::Binary(bin))) => match Frame::from_utf8(bin) {
                    Ok(frame) => return Ok(Some(frame)),
                    Err(e) => {
                        warn!("收到无法按 UTF-8 解码的二进制帧，已丢弃: {}", e);
                    }
                },
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {
                    // Ping 由 tungstenite 自动回复 Pong
                }
                Some(Ok(Message::Close(close_frame))) => {
                    debug!("收到 Close 控制帧: {:?}", close_frame);
                    return Ok(None);
                }
                Some(Err(TungsteniteError::ConnectionClosed)) | Some(Err(TungsteniteError::AlreadyClosed)) => {
                    return Ok(None);
                }
                Some(Err(e)) => return Err(WsError::from(e)),
                None => return Ok(None),
            }
        }
    }
}
