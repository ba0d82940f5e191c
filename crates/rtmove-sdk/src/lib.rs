//! rtmove SDK - 实时运动命令分发
//!
//! 把高频运动意图（关节路点、笛卡尔目标位姿）可靠地交给远端机器人，
//! 同时保证调用方永不阻塞：只有最新的命令重要，过时的命令会被直接丢弃。
//!
//! # 架构设计
//!
//! - **协议层** (`protocol`): 命令数据模型与各运动变体的构建函数
//! - **传输层** (`transport`): 传输契约（`Transport` trait）
//! - **驱动层** (`driver`): 分发队列、投递线程、控制器
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use rtmove_sdk::prelude::*;
//! # fn open(endpoint: &str) -> rtmove_sdk::transport::MockTransport {
//! #     rtmove_sdk::transport::MockTransport::new(endpoint)
//! # }
//!
//! rtmove_sdk::init_logger();
//!
//! let controller = RtControllerBuilder::new("arm-0", "ws://192.168.1.10:9000")
//!     .build(open)
//!     .unwrap();
//!
//! controller.rt_movec(&[0.3, 0.0, 0.4, 0.0, 3.1, 0.0]);
//! controller.close();
//! ```

mod logging;
pub mod prelude;

pub use rtmove_driver as driver;
pub use rtmove_protocol as protocol;
pub use rtmove_transport as transport;

pub use logging::{DEFAULT_LOG_DIRECTIVE, init_logger, init_logger_with};

// 协议层
pub use protocol::{Command, Method, Payload, ProtocolError};

// 传输层
pub use transport::{Transport, TransportError};

// 驱动层
pub use driver::{
    ControllerConfig, DriverError, EnqueueOutcome, MetricsSnapshot, RtController,
    RtControllerBuilder, WorkerState,
};
