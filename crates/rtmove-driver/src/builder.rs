//! Builder 模式实现
//!
//! 提供链式构造 `RtController` 的方式。

use crate::config::ControllerConfig;
use crate::controller::RtController;
use crate::error::DriverError;
use rtmove_transport::Transport;
use std::time::Duration;

/// RtController Builder
///
/// # Example
///
/// ```no_run
/// use rtmove_driver::RtControllerBuilder;
/// use rtmove_transport::MockTransport;
/// use std::time::Duration;
///
/// let controller = RtControllerBuilder::new("arm-0", "ws://192.168.1.10:9000")
///     .queue_capacity(1)
///     .shutdown_timeout(Duration::from_millis(500))
///     .build(|endpoint| MockTransport::new(endpoint))
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RtControllerBuilder {
    config: ControllerConfig,
}

impl RtControllerBuilder {
    /// 创建新的 Builder（其余参数使用默认值）
    pub fn new(robot_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            config: ControllerConfig::new(robot_id, endpoint),
        }
    }

    /// 从已有配置创建（例如从 TOML 文件加载的配置）
    pub fn from_config(config: ControllerConfig) -> Self {
        Self { config }
    }

    /// 设置队列容量（可选，默认 1）
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// 设置关闭等待时间（可选，默认 1 秒）
    ///
    /// 超出 `u64` 毫秒范围时取 `u64::MAX`。
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// 当前配置
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// 构建控制器
    ///
    /// `open` 接收 endpoint，返回尚未连接的传输层。
    pub fn build<T, F>(self, open: F) -> Result<RtController<T>, DriverError>
    where
        T: Transport + 'static,
        F: FnOnce(&str) -> T,
    {
        RtController::new(self.config, open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtmove_transport::MockTransport;

    #[test]
    fn test_builder_defaults() {
        let builder = RtControllerBuilder::new("arm-0", "ws://mock");
        assert_eq!(builder.config(), &ControllerConfig::new("arm-0", "ws://mock"));
    }

    #[test]
    fn test_builder_chain() {
        let builder = RtControllerBuilder::new("arm-0", "ws://mock")
            .queue_capacity(3)
            .shutdown_timeout(Duration::from_millis(250));

        assert_eq!(builder.config().queue_capacity, 3);
        assert_eq!(builder.config().shutdown_timeout_ms, 250);
    }

    #[test]
    fn test_builder_shutdown_timeout_saturates() {
        let builder = RtControllerBuilder::new("arm-0", "ws://mock").shutdown_timeout(Duration::MAX);
        assert_eq!(builder.config().shutdown_timeout_ms, u64::MAX);
        assert!(builder.config().shutdown_timeout() > Duration::from_secs(1));
    }

    #[test]
    fn test_builder_from_config() {
        let mut config = ControllerConfig::new("arm-9", "ws://arm-9");
        config.queue_capacity = 5;

        let builder = RtControllerBuilder::from_config(config.clone());
        assert_eq!(builder.config(), &config);
    }

    #[test]
    fn test_builder_build() {
        let mock = MockTransport::new("ws://mock");
        let handle = mock.clone();

        let controller = RtControllerBuilder::new("arm-0", "ws://mock")
            .queue_capacity(2)
            .build(move |_| handle)
            .unwrap();
        assert_eq!(controller.queue_capacity(), 2);
        assert!(mock.is_connected());

        controller.close();
        assert_eq!(mock.close_count(), 1);
    }

    #[test]
    fn test_builder_rejects_zero_capacity() {
        let result = RtControllerBuilder::new("arm-0", "ws://mock")
            .queue_capacity(0)
            .build(|endpoint| MockTransport::new(endpoint));
        assert!(matches!(result, Err(DriverError::InvalidConfig(_))));
    }
}
