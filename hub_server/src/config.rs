use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 服务的默认主机地址
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// 服务的默认端口号
pub const DEFAULT_PORT: u16 = 8080;
/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "app_settings.json";
/// 用于显式指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "HUB_CONFIG_PATH";

/// HTTP / WebSocket 监听相关配置
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务绑定的主机地址
    pub host: String,
    /// 服务监听的端口号
    pub port: u16,
    /// 静态文件根目录，所有未匹配 API / WebSocket 路由的请求都从这里取文件
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(), // 默认监听所有网络接口
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("./static"),
        }
    }
}

/// 消息中枢配置
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HubConfig {
    /// 广播通道容量。通道满时连接处理任务会在发送处等待，形成背压。
    pub broadcast_channel_capacity: usize,
    /// 广播时单个接收方的写入时限（毫秒）。`null` 表示不设时限，慢客户端会阻塞整个中枢。
    pub write_timeout_ms: Option<u64>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            broadcast_channel_capacity: 16,
            write_timeout_ms: Some(5000),
        }
    }
}

impl HubConfig {
    /// tokio 的有界通道要求容量至少为 1
    pub fn channel_capacity(&self) -> usize {
        self.broadcast_channel_capacity.max(1)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }
}

/// 应用的主配置结构体
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// 监听与静态文件相关配置
    pub server: ServerConfig,
    /// 消息中枢相关配置
    pub hub: HubConfig,
}

/// 从默认位置加载配置，不存在或损坏时写入一份默认配置
pub fn load_or_create_config() -> AppConfig {
    let config_file_path = get_config_file_path();
    load_or_create_config_at(&config_file_path)
}

/// 从指定路径加载配置，不存在或损坏时使用默认配置并尝试写回该路径
pub fn load_or_create_config_at(config_file_path: &Path) -> AppConfig {
    match fs::read_to_string(config_file_path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("[配置模块] 已成功从配置文件 {:?} 加载应用配置。", config_file_path);
                config
            }
            Err(e) => {
                warn!(
                    "[配置模块] 警告：从 {:?} 反序列化配置失败: {}. 文件可能已损坏。将使用默认配置并尝试覆盖。",
                    config_file_path, e
                );
                let default_config = AppConfig::default();
                save_config(&default_config, config_file_path);
                default_config
            }
        },
        Err(e) => {
            info!(
                "[配置模块] 未在 {:?} 找到配置文件或读取时发生错误 (错误: {}). 将使用默认配置并尝试创建新文件。",
                config_file_path, e
            );
            let default_config = AppConfig::default();
            save_config(&default_config, config_file_path);
            default_config
        }
    }
}

/// 获取配置文件路径
fn get_config_file_path() -> PathBuf {
    if let Ok(explicit) = env::var(CONFIG_PATH_ENV) {
        if !explicit.trim().is_empty() {
            return PathBuf::from(explicit);
        }
    }

    // 首先尝试当前目录
    let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config_file_path = current_dir.join(CONFIG_FILE_NAME);

    let current_dir_writable = fs::metadata(&current_dir)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false);
    if config_file_path.exists() || current_dir_writable {
        return config_file_path;
    }

    // 当前目录不可写时退回到用户主目录
    if let Ok(home) = env::var("HOME") {
        return PathBuf::from(home).join(".config").join("hub_server").join(CONFIG_FILE_NAME);
    } else if let Ok(userprofile) = env::var("USERPROFILE") {
        return PathBuf::from(userprofile)
            .join("AppData")
            .join("Local")
            .join("hub_server")
            .join(CONFIG_FILE_NAME);
    }

    config_file_path
}

/// 保存配置到文件；失败只记录日志
fn save_config(config: &AppConfig, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("[配置模块] 错误：创建配置目录 {:?} 失败: {}", parent, e);
                return;
            }
        }
    }

    match serde_json::to_string_pretty(config) {
        Ok(content) => {
            if let Err(e) = fs::write(path, content) {
                warn!("[配置模块] 错误：将配置写入文件 {:?} 时失败: {}", path, e);
            } else {
                info!("[配置模块] 已成功将当前配置保存到 {:?}.", path);
            }
        }
        Err(e) => {
            warn!("[配置模块] 错误：序列化配置信息以便保存时失败: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_path() -> PathBuf {
        env::temp_dir()
            .join(format!("hub_server_config_test_{}", Uuid::new_v4()))
            .join(CONFIG_FILE_NAME)
    }

    #[test]
    fn test_missing_file_yields_defaults_and_creates_file() {
        let path = scratch_path();
        let config = load_or_create_config_at(&path);
        assert_eq!(config, AppConfig::default());
        assert!(path.exists(), "缺失的配置文件应被创建");

        let reloaded = load_or_create_config_at(&path);
        assert_eq!(reloaded, config);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_is_replaced_with_defaults() {
        let path = scratch_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ 这不是 JSON").unwrap();

        let config = load_or_create_config_at(&path);
        assert_eq!(config, AppConfig::default());
        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(serde_json::from_str::<AppConfig>(&rewritten).is_ok(), "损坏的文件应被默认配置覆盖");
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"server": {"port": 9001}}"#).unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.hub, HubConfig::default());
    }

    #[test]
    fn test_null_write_timeout_disables_deadline() {
        let config: AppConfig =
            serde_json::from_str(r#"{"hub": {"write_timeout_ms": null, "broadcast_channel_capacity": 0}}"#).unwrap();
        assert_eq!(config.hub.write_timeout(), None);
        assert_eq!(config.hub.channel_capacity(), 1, "容量 0 应被提升为 1");
        assert_eq!(HubConfig::default().write_timeout(), Some(Duration::from_millis(5000)));
    }
}
