//! `rust_websocket_utils` 是一个提供 WebSocket 通信实用功能的 Rust Crate。
//! 它把具体的 WebSocket 库隐藏在一个很小的"帧连接"抽象之后，
//! 让上层（例如消息中枢）只面对"读一帧 / 写一帧 / 关闭"三个操作。
//!
//! 主要模块包括：
//! - `frame`: 定义不可变的文本帧 `Frame`。
//! - `connection`: 定义 `FrameSink` / `FrameSource` 两个异步 trait 以及组合二者的 `Connection`。
//! - `stream`: 基于 `tokio-tungstenite` 的 `WebSocketStream` 实现上述 trait 的适配器。
//! - `error`: 定义库中使用的统一错误类型 `WsError`。
//! - `client`: 提供 WebSocket 客户端连接功能。

pub mod client;
pub mod connection;
pub mod error;
pub mod frame;
pub mod stream;

pub use connection::{Connection, FrameSink, FrameSource};
pub use error::WsError;
pub use frame::Frame;
