// rust_websocket_utils/src/client/mod.rs

//! WebSocket 客户端模块。
//!
//! `transport` 子模块负责连接远程 WebSocket 服务器，并把握手后的流包装成
//! 与服务端相同的 `Connection` 抽象，便于测试和 Rust 客户端复用同一套读写接口。

pub mod transport; // 公开 transport 子模块，其中包含客户端连接逻辑
