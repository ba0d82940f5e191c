//! 驱动层模块
//!
//! 本模块提供实时运动命令的投递功能，包括：
//! - 单槽位分发队列（满时丢弃最旧命令，最新意图总是胜出）
//! - 专用投递线程（同步调用传输层，失败只记录不重试）
//! - 投递线程状态机（Running → Stopping → Stopped）
//! - 控制器生命周期（连接、启动线程、有界时间关闭）
//!
//! # 数据流
//!
//! ```text
//! 调用方 ──build_*()──▶ DispatchQueue ──take()──▶ delivery_loop ──▶ Transport
//!   (任意线程，永不阻塞)     (容量 N，默认 1)      (rt_sender 线程)
//! ```

mod builder;
pub mod config;
mod controller;
mod error;
pub mod metrics;
pub mod pipeline;
pub mod queue;
pub mod state;

pub use builder::RtControllerBuilder;
pub use config::ControllerConfig;
pub use controller::RtController;
pub use error::DriverError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use pipeline::{DeliveryOutcome, WORKER_THREAD_NAME, deliver_command, delivery_loop};
pub use queue::{DispatchQueue, EnqueueOutcome, Envelope};
pub use state::{AtomicWorkerState, WorkerState};
