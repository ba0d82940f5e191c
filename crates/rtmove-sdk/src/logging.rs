//! 日志初始化
//!
//! 库内部只使用 `tracing` 宏；是否输出、输出到哪里由应用决定。

use tracing_subscriber::EnvFilter;

/// 未设置 `RUST_LOG` 时使用的过滤规则
pub const DEFAULT_LOG_DIRECTIVE: &str =
    "rtmove_sdk=info,rtmove_driver=info,rtmove_transport=info,rtmove_protocol=info";

/// 初始化日志（默认规则）
///
/// 见 [`init_logger_with`]。
pub fn init_logger() -> bool {
    init_logger_with(DEFAULT_LOG_DIRECTIVE)
}

/// 初始化日志
///
/// 优先使用 `RUST_LOG` 环境变量，否则使用 `default_directive`
/// （无法解析时退回 `info`）。
///
/// 已经安装过全局 subscriber 时不做任何事，返回 `false`。
pub fn init_logger_with(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok();
    if installed {
        tracing::debug!("Logger initialized (default directive: {})", default_directive);
    }
    installed
}
