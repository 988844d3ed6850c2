//! 消息中枢 (Hub)。
//!
//! `Hub` 独占客户端注册表，并在单个事件循环任务中串行处理三类请求：
//! 注册、注销与广播。注册表只在这个循环里被修改，因此不需要任何锁；
//! 其他任务只能通过可克隆的 `HubHandle` 向循环投递请求。
//!
//! 当多个通道同时就绪时，循环按"注册 → 注销 → 广播 → 统计查询"的优先级取请求。
//! 因此同一个任务先完成的注销（或已确认的注册）一定先于它之后投递的广播生效。
//! 而其他任务在广播排队期间新注册的客户端是否能收到这条广播是不确定的，调用方不应依赖。
//! 统计查询排在最后，所以它能作为此前所有请求的屏障；代价是广播持续积压时，
//! `client_count`（以及 `GET /api/stats`）要等广播队列排空才会得到回复。
//!
//! 广播时向每个接收方的写入都是顺序进行的：一个迟迟不返回的接收方会拖住整个循环。
//! `HubConfig::write_timeout_ms` 为每次写入设置时限，超时按写入失败处理（关闭并移出注册表）；
//! 关闭时限后即退化为完全阻塞的行为。

use crate::config::HubConfig;
use crate::error::AppError;
use crate::ws_server::client::{Client, ClientId};
use chrono::Utc;
use log::{debug, info, warn};
use rust_websocket_utils::{Frame, WsError};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

/// 一次注册请求：客户端本身加上完成插入后的确认通道
struct Registration {
    client: Client,
    ack: oneshot::Sender<()>,
}

/// 向消息中枢投递请求的句柄。克隆代价很低，每个连接处理任务各持有一份。
#[derive(Debug, Clone)]
pub struct HubHandle {
    register_tx: mpsc::Sender<Registration>,
    unregister_tx: mpsc::UnboundedSender<ClientId>,
    broadcast_tx: mpsc::Sender<Frame>,
    stats_tx: mpsc::Sender<oneshot::Sender<usize>>,
}

impl HubHandle {
    /// 把客户端交给中枢，等待其被插入注册表后返回它的标识。
    pub async fn register(&self, client: Client) -> Result<ClientId, AppError> {
        let client_id = client.id();
        let (ack_tx, ack_rx) = oneshot::channel();
        self.register_tx
            .send(Registration { client, ack: ack_tx })
            .await
            .map_err(|_| AppError::HubClosed)?;
        ack_rx.await.map_err(|_| AppError::HubClosed)?;
        Ok(client_id)
    }

    /// 请求注销客户端。立即返回；对未注册或已注销的客户端是无害的空操作。
    ///
    /// 不需要等待，因此可以在 `Drop` 中调用。
    pub fn unregister(&self, client_id: ClientId) {
        if self.unregister_tx.send(client_id).is_err() {
            debug!("[Hub] 中枢已停止，忽略对客户端 {} 的注销请求", client_id);
        }
    }

    /// 投递一条广播。广播队列已满时在此等待，把中枢的处理速度反压给调用方。
    pub async fn broadcast(&self, frame: Frame) -> Result<(), AppError> {
        self.broadcast_tx.send(frame).await.map_err(|_| AppError::HubClosed)
    }

    /// 查询当前注册表中的客户端数量。
    ///
    /// 查询的优先级最低，返回时此前投递的注册、注销和广播都已处理完毕。
    /// 广播持续积压时查询会一直等待，需要限时的调用方应自行加超时。
    pub async fn client_count(&self) -> Result<usize, AppError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.stats_tx.send(reply_tx).await.map_err(|_| AppError::HubClosed)?;
        reply_rx.await.map_err(|_| AppError::HubClosed)
    }
}

/// 消息中枢本体，由 `run` 在独立任务中驱动。
pub struct Hub {
    clients: HashMap<ClientId, Client>,
    write_timeout: Option<Duration>,
    register_rx: mpsc::Receiver<Registration>,
    unregister_rx: mpsc::UnboundedReceiver<ClientId>,
    broadcast_rx: mpsc::Receiver<Frame>,
    stats_rx: mpsc::Receiver<oneshot::Sender<usize>>,
}

impl Hub {
    /// 创建中枢及其句柄。中枢需要交给 `tokio::spawn(hub.run())` 才会开始工作。
    pub fn new(config: &HubConfig) -> (Hub, HubHandle) {
        let (register_tx, register_rx) = mpsc::channel(1);
        let (unregister_tx, unregister_rx) = mpsc::unbounded_channel();
        let (broadcast_tx, broadcast_rx) = mpsc::channel(config.channel_capacity());
        let (stats_tx, stats_rx) = mpsc::channel(8);

        let hub = Hub {
            clients: HashMap::new(),
            write_timeout: config.write_timeout(),
            register_rx,
            unregister_rx,
            broadcast_rx,
            stats_rx,
        };
        let handle = HubHandle {
            register_tx,
            unregister_tx,
            broadcast_tx,
            stats_tx,
        };
        (hub, handle)
    }

    /// 中枢事件循环。所有 `HubHandle` 都被丢弃且队列排空后返回，并关闭仍在注册表中的连接。
    pub async fn run(mut self) {
        info!(
            "[Hub] 事件循环已启动。广播写入时限: {:?}",
            self.write_timeout
        );
        loop {
            tokio::select! {
                biased;
                Some(registration) = self.register_rx.recv() => self.register(registration),
                Some(client_id) = self.unregister_rx.recv() => self.unregister(client_id).await,
                Some(frame) = self.broadcast_rx.recv() => self.broadcast(frame).await,
                Some(reply) = self.stats_rx.recv() => {
                    let _ = reply.send(self.clients.len());
                }
                else => break,
            }
        }
        self.shutdown().await;
    }

    fn register(&mut self, registration: Registration) {
        let Registration { client, ack } = registration;
        let client_id = client.id();
        match self.clients.entry(client_id) {
            Entry::Occupied(_) => {
                debug!("[Hub] 客户端 {} 已在注册表中，忽略重复注册", client_id);
            }
            Entry::Vacant(slot) => {
                info!("[Hub] 客户端已注册: id={}, addr={}", client_id, client.addr());
                slot.insert(client);
                debug!("[Hub] 当前在线客户端数: {}", self.clients.len());
            }
        }
        let _ = ack.send(());
    }

    async fn unregister(&mut self, client_id: ClientId) {
        match self.clients.remove(&client_id) {
            Some(mut client) => {
                close_within(self.write_timeout, &mut client).await;
                let online_for = Utc::now().signed_duration_since(client.connected_at());
                info!(
                    "[Hub] 客户端已注销: id={}, addr={}, 在线 {} 秒。剩余客户端数: {}",
                    client_id,
                    client.addr(),
                    online_for.num_seconds(),
                    self.clients.len()
                );
            }
            None => {
                debug!("[Hub] 客户端 {} 不在注册表中，注销请求忽略", client_id);
            }
        }
    }

    async fn broadcast(&mut self, frame: Frame) {
        let deadline = self.write_timeout;
        debug!(
            "[Hub] 开始广播 {} 字节到 {} 个客户端",
            frame.len(),
            self.clients.len()
        );

        // 先遍历收集失败者，遍历结束后再统一移除
        let mut failed = Vec::new();
        for (client_id, client) in self.clients.iter_mut() {
            if let Err(e) = write_within(deadline, client.write(&frame)).await {
                warn!(
                    "[Hub] 向客户端 {} ({}) 写入失败，将其断开: {}",
                    client_id,
                    client.addr(),
                    e
                );
                failed.push(*client_id);
            }
        }

        for client_id in failed {
            if let Some(mut client) = self.clients.remove(&client_id) {
                close_within(deadline, &mut client).await;
            }
        }
    }

    async fn shutdown(&mut self) {
        info!(
            "[Hub] 所有句柄均已释放，事件循环结束。关闭剩余 {} 个客户端连接。",
            self.clients.len()
        );
        let deadline = self.write_timeout;
        for (_, mut client) in self.clients.drain() {
            close_within(deadline, &mut client).await;
        }
    }
}

async fn write_within<F>(deadline: Option<Duration>, write: F) -> Result<(), WsError>
where
    F: Future<Output = Result<(), WsError>>,
{
    match deadline {
        Some(limit) => timeout(limit, write)
            .await
            .unwrap_or_else(|_| Err(WsError::WriteTimeout(limit))),
        None => write.await,
    }
}

async fn close_within(deadline: Option<Duration>, client: &mut Client) {
    match deadline {
        Some(limit) => {
            if timeout(limit, client.close()).await.is_err() {
                warn!("[Hub] 关闭客户端 {} 超时，直接丢弃连接", client.id());
            }
        }
        None => client.close().await,
    }
}
