//! 驱动层错误类型定义

use rtmove_transport::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// 驱动层错误类型
///
/// 只有构造阶段会返回错误；运动命令接口本身从不失败。
#[derive(Error, Debug)]
pub enum DriverError {
    /// 传输层连接失败（启动前置条件，不可恢复）
    #[error("Transport connect failed: {0}")]
    Connect(#[source] TransportError),

    /// 配置无效
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// 配置文件解析失败
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// 配置文件读取失败
    #[error("Failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 投递线程启动失败
    #[error("Failed to spawn delivery worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
