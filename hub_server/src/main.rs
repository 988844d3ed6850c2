use hub_server::config;
use hub_server::ws_server::hub::Hub;
use hub_server::ws_server::service::WsService;
use log::{error, info, LevelFilter};

#[tokio::main]
async fn main() {
    // 初始化日志记录器，可通过 RUST_LOG 覆盖默认级别
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
    info!("[主程序] 日志系统已成功初始化 (env_logger)，默认级别: Info。");

    let app_config = config::load_or_create_config();
    info!("[主程序] 应用配置已加载: {:?}", app_config);

    // 创建消息中枢，并在独立任务中运行其事件循环
    let (hub, hub_handle) = Hub::new(&app_config.hub);
    let hub_task = tokio::spawn(hub.run());
    info!("[主程序] 消息中枢 (Hub) 已创建并启动。");

    let ws_service = WsService::new(app_config.server.clone(), hub_handle);
    info!("[主程序] 正在启动 WebSocket 服务...");
    if let Err(e) = ws_service.start().await {
        error!("[主程序] 致命错误：启动 WebSocket 服务时发生严重问题: {:#}", e);
        hub_task.abort();
        std::process::exit(1);
    }
}
