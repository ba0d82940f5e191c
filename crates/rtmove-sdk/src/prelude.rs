//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use rtmove_sdk::prelude::*;
//! ```

// 控制器
pub use crate::driver::{ControllerConfig, RtController, RtControllerBuilder};
pub use crate::driver::{EnqueueOutcome, MetricsSnapshot, WorkerState};

// 命令构建
pub use crate::protocol::{
    Command, Method, build_move, build_move_cartesian, build_move_cartesian_hard,
    build_move_cartesian_soft,
};

// 传输层（常用 Trait）
pub use crate::transport::Transport;

// 错误类型
pub use crate::driver::DriverError;
pub use crate::protocol::ProtocolError;
pub use crate::transport::TransportError;
