//! # rtmove Protocol
//!
//! 实时运动命令的数据模型（无传输层依赖）
//!
//! ## 模块
//!
//! - `method`: 命令方法名（`rt-move` 等）
//! - `command`: 不可变命令记录与各运动变体的构建函数
//!
//! ## 在架构中的位置
//!
//! ```text
//! 调用方
//!     ↓ build_move() / build_move_cartesian() ...
//! Command (此 crate)
//!     ↓ DispatchQueue → 投递线程
//! Transport::run_request(target_id, method, payload)
//! ```
//!
//! 构建函数是纯函数：不做校验，不阻塞，永远返回合法的 `Command`。
//! 数值是否有效由远端决定。

pub mod command;
pub mod method;

pub use command::*;
pub use method::Method;

use thiserror::Error;

/// 命令载荷：字段名到 JSON 值的映射
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown command method: {0}")]
    UnknownMethod(String),
}
