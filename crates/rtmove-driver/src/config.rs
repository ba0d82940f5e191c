//! 控制器配置
//!
//! 可以在代码中构造，也可以从 TOML 文件加载：
//!
//! ```toml
//! robot_id = "arm-0"
//! endpoint = "ws://192.168.1.10:9000"
//! queue_capacity = 1        # 可选，默认 1
//! shutdown_timeout_ms = 1000 # 可选，默认 1000
//! ```

use crate::error::DriverError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 默认队列容量（单槽位，最新命令覆盖上一条）
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

/// 默认关闭等待时间（毫秒）
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 1000;

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_shutdown_timeout_ms() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT_MS
}

/// 控制器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// 目标机器人 ID（作为每次请求的 target_id）
    pub robot_id: String,

    /// 传输层地址
    pub endpoint: String,

    /// 队列容量（必须 >= 1）
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// `close()` 等待投递线程退出的最长时间（毫秒）
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl ControllerConfig {
    pub fn new(robot_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            robot_id: robot_id.into(),
            endpoint: endpoint.into(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shutdown_timeout_ms: DEFAULT_SHUTDOWN_TIMEOUT_MS,
        }
    }

    /// 从 TOML 字符串解析（并校验）
    pub fn from_toml_str(source: &str) -> Result<Self, DriverError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载（并校验）
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| DriverError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.robot_id.trim().is_empty() {
            return Err(DriverError::InvalidConfig("robot_id must not be empty".into()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(DriverError::InvalidConfig("endpoint must not be empty".into()));
        }
        if self.queue_capacity == 0 {
            return Err(DriverError::InvalidConfig(
                "queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
