//! 连接处理任务：驱动单个客户端连接的读半部。
//!
//! 每个接入的连接对应一个处理任务。任务先把客户端注册到中枢，
//! 然后循环读取帧并投递到中枢的广播通道；读到连接结束、出错，
//! 或中枢关闭了该客户端（写入失败、超时、注销）时退出。
//! 无论以何种方式退出（正常返回、出错、panic、任务被中止），
//! `UnregisterGuard` 都会在析构时向中枢发送注销请求。

use crate::ws_server::client::{Client, ClientId};
use crate::ws_server::hub::HubHandle;
use log::{debug, error, info, warn};
use rust_websocket_utils::Connection;

/// 在析构时注销客户端的守卫
struct UnregisterGuard {
    hub: HubHandle,
    client_id: ClientId,
}

impl Drop for UnregisterGuard {
    fn drop(&mut self) {
        debug!("[Handler {}] 读循环结束，请求注销", self.client_id);
        self.hub.unregister(self.client_id);
    }
}

/// 处理一个已完成握手的连接，直到连接结束。
pub async fn handle_connection(hub: HubHandle, connection: Connection) {
    let peer_addr = connection.peer_addr();
    let (sink, mut source) = connection.into_split();
    let client = Client::new(peer_addr, sink);
    let read_cancel = client.read_cancel_token();

    let client_id = match hub.register(client).await {
        Ok(id) => id,
        Err(e) => {
            // 中枢已停止，客户端连同写半部一起被丢弃
            error!("[Handler] 无法注册来自 {} 的客户端: {}", peer_addr, e);
            return;
        }
    };
    let _guard = UnregisterGuard {
        hub: hub.clone(),
        client_id,
    };
    info!("[Handler {}] 开始读取来自 {} 的消息", client_id, peer_addr);

    loop {
        let next = tokio::select! {
            biased;
            _ = read_cancel.cancelled() => {
                info!("[Handler {}] 客户端已被中枢关闭，停止读取 {}", client_id, peer_addr);
                break;
            }
            result = source.read_frame() => result,
        };
        match next {
            Ok(Some(frame)) => {
                debug!("[Handler {}] 收到 {} 字节，投递广播", client_id, frame.len());
                let delivered = tokio::select! {
                    biased;
                    _ = read_cancel.cancelled() => break,
                    result = hub.broadcast(frame) => result,
                };
                if let Err(e) = delivered {
                    warn!("[Handler {}] 投递广播失败: {}", client_id, e);
                    break;
                }
            }
            Ok(None) => {
                info!("[Handler {}] 对端 {} 已关闭连接", client_id, peer_addr);
                break;
            }
            Err(e) => {
                warn!("[Handler {}] 读取失败，视为断开: {}", client_id, e);
                break;
            }
        }
    }
}
