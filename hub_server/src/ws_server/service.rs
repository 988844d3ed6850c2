//! WebSocket 服务端核心服务：路由装配、监听与 WebSocket 握手。

use crate::api;
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::state::AppState;
use crate::ws_server::echo::handle_echo;
use crate::ws_server::handler::handle_connection;
use crate::ws_server::hub::HubHandle;
use crate::ws_server::transport::connection_from_socket;
use anyhow::{Context, Result};
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::{error, info, warn};
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// 装配完整的路由：
/// - `GET /ws`：接入消息中枢的 WebSocket 端点
/// - `GET /echo`：回显 WebSocket 端点
/// - `/api/*`：HTTP API
/// - 其余路径：静态文件
pub fn build_router(hub: HubHandle, static_dir: &Path) -> Router {
    Router::new()
        .route("/ws", get(hub_socket_endpoint))
        .route("/echo", get(echo_socket_endpoint))
        .merge(api::routes())
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(hub))
}

async fn hub_socket_endpoint(
    ws: WebSocketUpgrade,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    ws.on_failed_upgrade(move |e| {
        error!("[WsService] 与 {} 的 WebSocket 握手失败: {}", peer_addr, e);
    })
    .on_upgrade(move |socket| {
        info!("[WsService] 与 {} 的 WebSocket 握手成功", peer_addr);
        handle_connection(state.hub, connection_from_socket(socket, peer_addr))
    })
}

async fn echo_socket_endpoint(
    ws: WebSocketUpgrade,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
) -> Response {
    ws.on_failed_upgrade(move |e| {
        error!("[WsService] 与 {} 的回显握手失败: {}", peer_addr, e);
    })
    .on_upgrade(move |socket| handle_echo(connection_from_socket(socket, peer_addr)))
}

/// 在已绑定的监听器上运行路由，直到服务出错。
pub async fn serve(listener: TcpListener, router: Router) -> Result<(), AppError> {
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(AppError::Serve)
}

/// WebSocket 服务结构体，封装了监听配置和消息中枢句柄。
pub struct WsService {
    config: ServerConfig,
    hub: HubHandle,
}

impl WsService {
    /// 创建一个新的 WsService 实例。
    pub fn new(config: ServerConfig, hub: HubHandle) -> Self {
        info!("[WsService] New instance created.");
        Self { config, hub }
    }

    /// 绑定监听地址。失败时返回 `AppError::Bind`。
    pub async fn bind(&self) -> Result<TcpListener, AppError> {
        let listen_addr = format!("{}:{}", self.config.host, self.config.port);
        match TcpListener::bind(&listen_addr).await {
            Ok(listener) => Ok(listener),
            Err(source) => Err(AppError::Bind { addr: listen_addr, source }),
        }
    }

    /// 启动服务：绑定地址并持续处理请求。
    pub async fn start(self) -> Result<()> {
        info!(
            "[WsService] Configuration: host={}, port={}, static_dir={:?}",
            self.config.host, self.config.port, self.config.static_dir
        );
        if !self.config.static_dir.is_dir() {
            warn!(
                "[WsService] 静态文件目录 {:?} 不存在，静态路径将返回 404",
                self.config.static_dir
            );
        }

        let listener = self.bind().await.context("WebSocket server bind failed")?;
        let local_addr = listener.local_addr().context("failed to read local address")?;
        info!("[WsService] 服务器已启动: http://{} (WebSocket: ws://{}/ws)", local_addr, local_addr);

        let router = build_router(self.hub, &self.config.static_dir);
        serve(listener, router)
            .await
            .context("WebSocket server operation failed")?;

        warn!("[WsService] WebSocket server has unexpectedly stopped.");
        Ok(())
    }
}
