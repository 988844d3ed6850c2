//! `common_models` 公共模型库 crate。
//!
//! 本 crate 集中定义了消息中枢服务端 (`hub_server`) 与其客户端之间共享的数据结构。
//! 目前只包含 HTTP API 使用的请求/响应负载 (`api_payloads`)。
//!
//! 设计原则：
//! - 所有模型都派生 `serde::Serialize` 和 `serde::Deserialize`，以 JSON 形式在网络上传输。
//! - 所有模型也派生 `Debug`、`Clone` 和 `PartialEq`，方便调试输出与测试断言。

pub mod api_payloads; // HTTP API 请求与响应的负载结构体
