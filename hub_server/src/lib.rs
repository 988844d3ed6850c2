//! `hub_server` 实时扇出消息中枢服务端核心库。
//!
//! 客户端通过 WebSocket 接入 `/ws` 后发送的每一帧文本，都会被广播给当前所有在线客户端。
//! 尽力而为、纯内存、单进程：不持久化消息，不做鉴权，也不保证送达。
//!
//! 主要模块包括：
//! - `api`: HTTP API 请求处理。
//! - `config`: 管理应用的配置信息加载。
//! - `error`: 定义应用特定的错误类型。
//! - `state`: axum 请求处理函数共享的应用状态。
//! - `ws_server`: 消息中枢、客户端、连接处理任务以及 WebSocket 服务本身。

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod ws_server;
