//! 回显处理：把收到的每一帧原样写回同一个对端，不经过消息中枢。

use log::{debug, info, warn};
use rust_websocket_utils::Connection;

pub async fn handle_echo(connection: Connection) {
    let peer_addr = connection.peer_addr();
    let (mut sink, mut source) = connection.into_split();
    info!("[Echo] 新的回显连接: {}", peer_addr);

    loop {
        match source.read_frame().await {
            Ok(Some(frame)) => {
                info!("[Echo] 收到来自 {} 的消息: {}", peer_addr, frame);
                if let Err(e) = sink.write_frame(&frame).await {
                    warn!("[Echo] 回显到 {} 失败: {}", peer_addr, e);
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("[Echo] 读取 {} 失败: {}", peer_addr, e);
                break;
            }
        }
    }

    if let Err(e) = sink.close().await {
        debug!("[Echo] 关闭与 {} 的连接时出错: {}", peer_addr, e);
    }
    info!("[Echo] 回显连接 {} 已结束", peer_addr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws_server::test_support::{scripted_connection, SinkMode, SourceEvent};
    use rust_websocket_utils::Frame;

    #[tokio::test]
    async fn test_echo_writes_each_frame_back_then_closes() {
        let (conn, monitor, events) = scripted_connection();
        events.send(SourceEvent::Frame(Frame::text("one"))).unwrap();
        events.send(SourceEvent::Frame(Frame::text("two"))).unwrap();
        drop(events);

        handle_echo(conn).await;
        assert_eq!(monitor.frames(), vec!["one".to_string(), "two".to_string()]);
        assert_eq!(monitor.close_count(), 1);
    }

    #[tokio::test]
    async fn test_echo_stops_on_write_failure() {
        let (conn, monitor, events) = scripted_connection();
        monitor.set_mode(SinkMode::Failing);
        events.send(SourceEvent::Frame(Frame::text("one"))).unwrap();
        events.send(SourceEvent::Frame(Frame::text("two"))).unwrap();

        handle_echo(conn).await;
        assert_eq!(monitor.write_attempts(), 1, "第一次写入失败后应停止");
        assert_eq!(monitor.close_count(), 1);
    }
}
