//! WebSocket 服务端逻辑模块。

pub mod client;
pub mod echo;
pub mod handler;
pub mod hub;
pub mod service;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;
