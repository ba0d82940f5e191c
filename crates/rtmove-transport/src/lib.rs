//! # rtmove Transport Layer
//!
//! 传输层抽象：投递线程通过 [`Transport`] 把命令同步发送到远端。
//! 具体连接（WebSocket 等）由外部实现，本 crate 只定义契约。

use rtmove_protocol::Payload;
use std::sync::Arc;
use thiserror::Error;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockReply, MockTransport, RecordedRequest};

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connect failed: {0}")]
    Connect(String),
    #[error("Not connected")]
    NotConnected,
    #[error("Remote error {code}: {message}")]
    Remote { code: i64, message: String },
    #[error("Request timeout")]
    Timeout,
    #[error("Connection closed")]
    Closed,
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// 远端返回的业务错误
    pub fn remote(code: i64, message: impl Into<String>) -> Self {
        Self::Remote {
            code,
            message: message.into(),
        }
    }
}

/// 传输连接契约
///
/// # 线程模型
///
/// - `connect()`：控制器线程，启动时调用一次
/// - `run_request()`：仅由投递线程调用（单消费者）
/// - `close()`：控制器线程，关闭时调用一次
///
/// 方法接收 `&self`：即使投递线程仍卡在 `run_request()` 中，
/// 控制器也必须能够调用 `close()`，内部同步由实现方负责。
///
/// `run_request()` 中的 panic 视为"意外故障"，投递线程会捕获并继续运行。
pub trait Transport: Send + Sync {
    /// 建立连接
    fn connect(&self) -> Result<(), TransportError>;

    /// 同步请求：发送一条命令并等待响应
    fn run_request(
        &self,
        target_id: &str,
        method: &str,
        payload: &Payload,
    ) -> Result<serde_json::Value, TransportError>;

    /// 释放连接
    fn close(&self);
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn connect(&self) -> Result<(), TransportError> {
        (**self).connect()
    }

    fn run_request(
        &self,
        target_id: &str,
        method: &str,
        payload: &Payload,
    ) -> Result<serde_json::Value, TransportError> {
        (**self).run_request(target_id, method, payload)
    }

    fn close(&self) {
        (**self).close()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn connect(&self) -> Result<(), TransportError> {
        (**self).connect()
    }

    fn run_request(
        &self,
        target_id: &str,
        method: &str,
        payload: &Payload,
    ) -> Result<serde_json::Value, TransportError> {
        (**self).run_request(target_id, method, payload)
    }

    fn close(&self) {
        (**self).close()
    }
}
