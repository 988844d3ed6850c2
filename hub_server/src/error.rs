use thiserror::Error;

/// 应用的主要错误类型
///
/// 这个枚举定义了应用中可能出现的各种错误类型。
/// 单个连接上的故障不会以这些错误的形式向上传播，只在本连接内记录日志并断开。
#[derive(Error, Debug)]
pub enum AppError {
    /// 监听地址绑定失败，这是唯一会终止进程的错误。
    #[error("无法绑定监听地址 {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP 服务在运行期间出错。
    #[error("HTTP 服务错误: {0}")]
    Serve(#[source] std::io::Error),

    /// 消息中枢的事件循环已经结束，无法再接收请求。
    #[error("消息中枢已停止")]
    HubClosed,
}
