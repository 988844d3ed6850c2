use chrono::{DateTime, Utc};
use log::debug;
use rust_websocket_utils::{Frame, FrameSink, WsError};
use std::fmt;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// 客户端在注册表中的身份标识。
///
/// 每个 `Client` 创建时生成一个新的 UUID v4，之后不再改变，也不会被复用；
/// 它不由地址等连接属性推导，两个连接即使来自同一地址也是不同的客户端。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    fn new() -> Self {
        ClientId(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 代表一个已完成握手的 WebSocket 客户端。
///
/// `Client` 独占其连接的写半部。注册时整个 `Client` 被移交给消息中枢，
/// 此后只有中枢的事件循环会向它写入或关闭它；连接处理任务只保留 `ClientId`
/// 和一个读取终止令牌。客户端被关闭或丢弃时令牌被触发，处理任务随即停止读取，
/// 因此被移出注册表的客户端不会再向其他人广播。
pub struct Client {
    /// 客户端的唯一标识符
    id: ClientId,
    /// 客户端连接的源网络地址
    addr: SocketAddr,
    /// 握手完成、客户端被创建的时间 (UTC)
    connected_at: DateTime<Utc>,
    sink: Box<dyn FrameSink>,
    read_cancel: CancellationToken,
    closed: bool,
}

impl Client {
    /// 为一个刚完成握手的连接创建客户端。
    pub fn new(addr: SocketAddr, sink: Box<dyn FrameSink>) -> Self {
        Self {
            id: ClientId::new(),
            addr,
            connected_at: Utc::now(),
            sink,
            read_cancel: CancellationToken::new(),
            closed: false,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// 客户端被关闭或丢弃时触发的令牌，由连接处理任务用来终止读循环。
    pub fn read_cancel_token(&self) -> CancellationToken {
        self.read_cancel.clone()
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    /// 向客户端写入一帧。整帧写出返回 `Ok`，否则返回错误；关闭后写入直接失败。
    pub async fn write(&mut self, frame: &Frame) -> Result<(), WsError> {
        if self.closed {
            return Err(WsError::ConnectionClosed);
        }
        self.sink.write_frame(frame).await
    }

    /// 关闭客户端连接：先终止读取，再关闭写半部。只有第一次调用会真正关闭底层连接。
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.read_cancel.cancel();
        if let Err(e) = self.sink.close().await {
            // 对端通常已经不可达，关闭失败不影响后续处理
            debug!("[Client {}] 关闭连接时出错: {}", self.id, e);
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.read_cancel.cancel();
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .field("connected_at", &self.connected_at)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws_server::test_support::{test_addr, RecordingSink};

    #[test]
    fn test_each_client_gets_a_distinct_id() {
        let (sink_a, _) = RecordingSink::new();
        let (sink_b, _) = RecordingSink::new();
        let a = Client::new(test_addr(), Box::new(sink_a));
        let b = Client::new(test_addr(), Box::new(sink_b));
        assert_ne!(a.id(), b.id(), "同一地址的两个客户端也必须有不同的身份");
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_blocks_later_writes() {
        let (sink, monitor) = RecordingSink::new();
        let mut client = Client::new(test_addr(), Box::new(sink));

        client.write(&Frame::text("before")).await.expect("关闭前写入应成功");
        client.close().await;
        client.close().await;

        assert!(client.is_closed());
        assert_eq!(monitor.close_count(), 1, "底层连接只能被关闭一次");
        assert!(matches!(client.write(&Frame::text("after")).await, Err(WsError::ConnectionClosed)));
        assert_eq!(monitor.frames(), vec!["before".to_string()]);
    }

    #[tokio::test]
    async fn test_close_and_drop_cancel_the_read_side() {
        let (sink, _) = RecordingSink::new();
        let mut closed = Client::new(test_addr(), Box::new(sink));
        let closed_token = closed.read_cancel_token();
        assert!(!closed_token.is_cancelled());
        closed.close().await;
        assert!(closed_token.is_cancelled(), "关闭客户端应终止读取");

        let (sink, _) = RecordingSink::new();
        let dropped = Client::new(test_addr(), Box::new(sink));
        let dropped_token = dropped.read_cancel_token();
        drop(dropped);
        assert!(dropped_token.is_cancelled(), "丢弃客户端应终止读取");
    }
}
