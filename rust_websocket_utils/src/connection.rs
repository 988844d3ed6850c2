// rust_websocket_utils/src/connection.rs

//! 帧连接抽象。
//!
//! 一个 `Connection` 由一个写半部 (`FrameSink`) 和一个读半部 (`FrameSource`) 组成，
//! 二者可以通过 `into_split` 分离，分别交给不同的异步任务持有：
//! 读半部留在连接处理任务中循环读取，写半部交给唯一负责写入的一方。

use crate::error::WsError;
use crate::frame::Frame;
use async_trait::async_trait;
use std::fmt;
use std::net::SocketAddr;

/// 连接的写半部。
///
/// 实现必须保证 `write_frame` 要么把整帧完整写出，要么返回错误，
/// 不会留下"写了一半"的帧。`close` 必须可以重复调用。
#[async_trait]
pub trait FrameSink: Send {
    /// 向对端写入一个完整的帧。
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), WsError>;

    /// 关闭连接 (发送关闭帧并释放底层资源)。重复调用时直接返回 `Ok(())`。
    async fn close(&mut self) -> Result<(), WsError>;
}

/// 连接的读半部。
#[async_trait]
pub trait FrameSource: Send {
    /// 阻塞地读取下一个数据帧。
    ///
    /// - `Ok(Some(frame))`：收到一个帧。
    /// - `Ok(None)`：对端已正常关闭连接。
    /// - `Err(e)`：协议或 I/O 错误，连接不可再用。
    ///
    /// Ping/Pong 等控制帧由实现内部消化，不会返回给调用方。
    async fn read_frame(&mut self) -> Result<Option<Frame>, WsError>;
}

/// 一条已完成握手的双向帧连接。
pub struct Connection {
    peer_addr: SocketAddr,
    sink: Box<dyn FrameSink>,
    source: Box<dyn FrameSource>,
}

impl Connection {
    /// 用任意读写半部组装一个连接。
    pub fn new(
        peer_addr: SocketAddr,
        sink: impl FrameSink + 'static,
        source: impl FrameSource + 'static,
    ) -> Self {
        Self {
            peer_addr,
            sink: Box::new(sink),
            source: Box::new(source),
        }
    }

    /// 对端的网络地址。
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// 拆分为写半部与读半部。
    pub fn into_split(self) -> (Box<dyn FrameSink>, Box<dyn FrameSource>) {
        (self.sink, self.source)
    }

    pub async fn read_frame(&mut self) -> Result<Option<Frame>, WsError> {
        self.source.read_frame().await
    }

    pub async fn write_frame(&mut self, frame: &Frame) -> Result<(), WsError> {
        self.sink.write_frame(frame).await
    }

    pub async fn close(&mut self) -> Result<(), WsError> {
        self.sink.close().await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("peer_addr", &self.peer_addr)
            .finish_non_exhaustive()
    }
}
