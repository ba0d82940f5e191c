//! Mock 传输层（无网络依赖）
//!
//! 用于测试投递线程和控制器的生命周期：
//! - 记录每一次 `run_request()` 调用
//! - 按脚本返回错误或触发 panic
//! - 闸门（gate）：阻塞请求，模拟卡住或缓慢的网络

use crate::{Transport, TransportError};
use parking_lot::{Condvar, Mutex};
use rtmove_protocol::Payload;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// 一次被记录的请求
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub target_id: String,
    pub method: String,
    pub payload: Payload,
}

/// 脚本化的响应（按 FIFO 顺序消费，耗尽后默认返回 `Ok(null)`）
#[derive(Debug, Clone)]
pub enum MockReply {
    Ok(Value),
    Error { code: i64, message: String },
    Panic(String),
}

#[derive(Debug, Default)]
struct MockState {
    refuse_connect: bool,
    connected: bool,
    gated: bool,
    replies: VecDeque<MockReply>,
    requests: Vec<RecordedRequest>,
    connect_count: usize,
    close_count: usize,
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<MockState>,
    changed: Condvar,
}

/// 内存中的脚本化传输层
///
/// `Clone` 共享同一份状态：测试保留一个克隆，另一个交给控制器。
#[derive(Debug, Clone)]
pub struct MockTransport {
    endpoint: String,
    shared: Arc<Shared>,
}

impl MockTransport {
    /// 创建可正常连接的 Mock
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            shared: Arc::new(Shared::default()),
        }
    }

    /// 创建拒绝连接的 Mock（`connect()` 返回错误）
    pub fn refusing(endpoint: impl Into<String>) -> Self {
        let mock = Self::new(endpoint);
        mock.shared.state.lock().refuse_connect = true;
        mock
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 追加一条脚本化响应
    pub fn push_reply(&self, reply: MockReply) {
        self.shared.state.lock().replies.push_back(reply);
    }

    /// 下一次请求返回远端错误
    pub fn fail_next(&self, message: impl Into<String>) {
        self.push_reply(MockReply::Error {
            code: -1,
            message: message.into(),
        });
    }

    /// 下一次请求触发 panic
    pub fn panic_next(&self, message: impl Into<String>) {
        self.push_reply(MockReply::Panic(message.into()));
    }

    /// 关闭闸门：此后的请求在记录后阻塞，直到 `release()`
    pub fn hold(&self) {
        self.shared.state.lock().gated = true;
    }

    /// 打开闸门，唤醒所有阻塞中的请求
    pub fn release(&self) {
        self.shared.state.lock().gated = false;
        self.shared.changed.notify_all();
    }

    /// 已记录的请求（快照）
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.state.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.shared.state.lock().requests.len()
    }

    pub fn connect_count(&self) -> usize {
        self.shared.state.lock().connect_count
    }

    pub fn close_count(&self) -> usize {
        self.shared.state.lock().close_count
    }

    pub fn is_connected(&self) -> bool {
        self.shared.state.lock().connected
    }

    /// 等待至少 `count` 次请求被记录
    ///
    /// 超时返回 `false`。
    pub fn wait_for_requests(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while state.requests.len() < count {
            if self.shared.changed.wait_until(&mut state, deadline).timed_out() {
                return state.requests.len() >= count;
            }
        }
        true
    }
}

impl Transport for MockTransport {
    fn connect(&self) -> Result<(), TransportError> {
        let mut state = self.shared.state.lock();
        state.connect_count += 1;
        if state.refuse_connect {
            return Err(TransportError::Connect(format!(
                "{} refused connection",
                self.endpoint
            )));
        }
        state.connected = true;
        Ok(())
    }

    fn run_request(
        &self,
        target_id: &str,
        method: &str,
        payload: &Payload,
    ) -> Result<Value, TransportError> {
        let reply = {
            let mut state = self.shared.state.lock();
            state.requests.push(RecordedRequest {
                target_id: target_id.to_string(),
                method: method.to_string(),
                payload: payload.clone(),
            });
            self.shared.changed.notify_all();
            trace!("MockTransport: recorded {} for {}", method, target_id);

            while state.gated {
                self.shared.changed.wait(&mut state);
            }

            if !state.connected {
                return Err(TransportError::NotConnected);
            }
            state.replies.pop_front()
        };

        // 锁外执行，panic 不会卡住其他调用方
        match reply {
            None => Ok(Value::Null),
            Some(MockReply::Ok(value)) => Ok(value),
            Some(MockReply::Error { code, message }) => Err(TransportError::remote(code, message)),
            Some(MockReply::Panic(message)) => panic!("{}", message),
        }
    }

    fn close(&self) {
        let mut state = self.shared.state.lock();
        state.connected = false;
        state.close_count += 1;
        self.shared.changed.notify_all();
    }
}
