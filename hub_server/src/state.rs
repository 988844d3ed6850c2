//! 应用级共享状态。
//!
//! `AppState` 在 `main` 中构造，通过 axum 的 `State` 提取器交给每个请求处理函数。
//! 它只持有消息中枢的句柄，中枢本身由独立任务运行，不存在全局实例。

use crate::ws_server::hub::HubHandle;

#[derive(Debug, Clone)]
pub struct AppState {
    /// 消息中枢句柄
    pub hub: HubHandle,
}

impl AppState {
    pub fn new(hub: HubHandle) -> Self {
        Self { hub }
    }
}
