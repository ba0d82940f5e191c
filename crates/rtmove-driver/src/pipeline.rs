//! 投递线程主循环模块
//!
//! 投递线程是分发队列的唯一消费者，也是 `Transport::run_request()` 的唯一调用者。
//! 单消费者保证了传输层上的请求顺序，无需额外加锁。

use crate::metrics::DispatchMetrics;
use crate::queue::{DispatchQueue, Envelope};
use crate::state::{AtomicWorkerState, WorkerState};
use rtmove_protocol::Command;
use rtmove_transport::Transport;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{debug, error, trace};

/// 投递线程名称
pub const WORKER_THREAD_NAME: &str = "rt_sender";

/// 单条命令的投递结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 请求成功（结果被丢弃，fire-and-forget）
    Delivered,
    /// 传输层返回错误
    Failed,
    /// 传输层 panic
    Faulted,
}

/// 从 panic 载荷中提取可读信息
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

/// 同步投递一条命令
///
/// 错误和 panic 都只记录日志与指标，不向上传播，也不重试。
pub fn deliver_command<T>(
    transport: &T,
    target_id: &str,
    command: &Command,
    metrics: &DispatchMetrics,
) -> DeliveryOutcome
where
    T: Transport + ?Sized,
{
    let method = command.method();

    // 传输层内部的 panic 视为意外故障：捕获后继续循环
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        transport.run_request(target_id, method.as_str(), command.payload())
    }));

    match result {
        Ok(Ok(_)) => {
            metrics.commands_delivered.fetch_add(1, Ordering::Relaxed);
            trace!("Delivery worker: {} delivered to {}", method, target_id);
            DeliveryOutcome::Delivered
        },
        Ok(Err(e)) => {
            metrics.transport_errors.fetch_add(1, Ordering::Relaxed);
            error!("rt control err: {} failed for {}: {}", method, target_id, e);
            DeliveryOutcome::Failed
        },
        Err(payload) => {
            metrics.transport_faults.fetch_add(1, Ordering::Relaxed);
            error!(
                "Delivery worker: {} request panicked for {}: {}",
                method,
                target_id,
                panic_message(payload.as_ref())
            );
            DeliveryOutcome::Faulted
        },
    }
}

/// 投递线程主循环
///
/// 1. 检查运行状态，非 Running 则退出
/// 2. 阻塞等待队列中的下一个元素；停止标记则退出
/// 3. 关闭过程中取出的命令直接丢弃（关闭开始后不再发送任何命令）
/// 4. 同步调用传输层；失败只记录，继续下一轮
///
/// 退出时丢弃队列中剩余的命令（计入 `commands_discarded`），再把状态置为 `Stopped`。
///
/// 取出后的状态检查与 `run_request()` 之间仍有一个窄窗口：`close()` 恰好在此时
/// 进入 Stopping，则这一条命令仍会被发送。它是关闭开始后唯一可能发出的请求，
/// 在持锁状态下调用传输层才能消除该窗口，而那样会让 `close()` 等待网络。
///
/// # 参数
/// - `transport`: 传输层（已连接）
/// - `queue`: 分发队列（本线程是唯一消费者）
/// - `state`: 运行状态（由控制器写入 Stopping）
/// - `metrics`: 性能指标
/// - `target_id`: 目标机器人 ID
pub fn delivery_loop<T>(
    transport: Arc<T>,
    queue: Arc<DispatchQueue<Command>>,
    state: Arc<AtomicWorkerState>,
    metrics: Arc<DispatchMetrics>,
    target_id: String,
) where
    T: Transport + ?Sized,
{
    loop {
        // Acquire: 看到 Stopping 时，也能看到关闭流程之前的所有写入
        if !state.get(Ordering::Acquire).is_running() {
            trace!("Delivery worker: state is no longer Running, exiting");
            break;
        }

        let command = match queue.take() {
            Envelope::Command(command) => command,
            Envelope::Stop => {
                trace!("Delivery worker: stop marker received");
                break;
            },
        };

        if !state.get(Ordering::Acquire).is_running() {
            metrics.commands_discarded.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Delivery worker: discarding {} taken during shutdown",
                command.method()
            );
            break;
        }

        deliver_command(transport.as_ref(), &target_id, &command, &metrics);
    }

    let leftover = queue.discard_pending();
    if leftover > 0 {
        metrics.commands_discarded.fetch_add(leftover as u64, Ordering::Relaxed);
        debug!("Delivery worker: discarded {} pending command(s) on exit", leftover);
    }

    state.set(WorkerState::Stopped, Ordering::Release);
    trace!("Delivery worker: loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtmove_protocol::{build_move, build_move_cartesian, build_move_cartesian_hard};
    use rtmove_transport::MockTransport;
    use std::thread;
    use std::time::Duration;

    struct Harness {
        mock: MockTransport,
        queue: Arc<DispatchQueue<Command>>,
        state: Arc<AtomicWorkerState>,
        metrics: Arc<DispatchMetrics>,
    }

    impl Harness {
        fn new(capacity: usize) -> Self {
            let mock = MockTransport::new("ws://mock");
            mock.connect().unwrap();
            Self {
                mock,
                queue: Arc::new(DispatchQueue::new(capacity)),
                state: Arc::new(AtomicWorkerState::new(WorkerState::Running)),
                metrics: Arc::new(DispatchMetrics::new()),
            }
        }

        fn spawn(&self) -> thread::JoinHandle<()> {
            let transport = Arc::new(self.mock.clone());
            let queue = self.queue.clone();
            let state = self.state.clone();
            let metrics = self.metrics.clone();
            thread::spawn(move || {
                delivery_loop(transport, queue, state, metrics, "arm-0".to_string())
            })
        }

        fn stop(&self, handle: thread::JoinHandle<()>) {
            self.state.begin_stop();
            self.queue.enqueue_stop_marker();
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_only_latest_command_delivered_before_drain() {
        let harness = Harness::new(1);

        // 线程启动前连续入队：第一条被驱逐
        harness.queue.try_enqueue(build_move_cartesian(&[1.0, 2.0, 3.0]));
        harness.queue.try_enqueue(build_move_cartesian_hard(&[4.0, 5.0, 6.0]));

        let handle = harness.spawn();
        assert!(harness.mock.wait_for_requests(1, Duration::from_secs(1)));
        harness.stop(handle);

        let requests = harness.mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "rt-move-cartesian-hard");
        assert_eq!(requests[0].target_id, "arm-0");
        assert_eq!(
            requests[0].payload["destination"],
            serde_json::json!([4.0, 5.0, 6.0])
        );
    }

    #[test]
    fn test_worker_survives_error_and_panic() {
        let harness = Harness::new(1);
        harness.mock.fail_next("joint limit");
        harness.mock.panic_next("socket exploded");

        let handle = harness.spawn();
        for expected in 1..=3 {
            harness.queue.try_enqueue(build_move(&[expected as f64], 0.01));
            assert!(harness.mock.wait_for_requests(expected, Duration::from_secs(1)));
        }
        harness.stop(handle);

        let snapshot = harness.metrics.snapshot();
        assert_eq!(snapshot.transport_errors, 1);
        assert_eq!(snapshot.transport_faults, 1);
        assert_eq!(snapshot.commands_delivered, 1);
        assert!(harness.state.get(Ordering::Acquire).is_stopped());
    }

    #[test]
    fn test_stop_marker_terminates_loop() {
        let harness = Harness::new(1);
        let handle = harness.spawn();

        harness.stop(handle);
        assert_eq!(harness.state.get(Ordering::Acquire), WorkerState::Stopped);
        assert_eq!(harness.mock.request_count(), 0);
    }

    #[test]
    fn test_commands_ahead_of_stop_marker_are_discarded() {
        let harness = Harness::new(3);
        harness.queue.try_enqueue(build_move(&[1.0], 0.1));
        harness.queue.try_enqueue(build_move(&[2.0], 0.1));

        // 关闭先于投递线程启动：队列中的命令不得发送
        harness.state.begin_stop();
        harness.queue.enqueue_stop_marker();

        let handle = harness.spawn();
        handle.join().unwrap();

        assert_eq!(harness.mock.request_count(), 0);
        assert_eq!(harness.metrics.snapshot().commands_discarded, 2);
        assert_eq!(harness.queue.len(), 1);
        assert!(harness.state.get(Ordering::Acquire).is_stopped());
    }

    #[test]
    fn test_command_taken_during_shutdown_is_discarded() {
        let harness = Harness::new(2);
        let handle = harness.spawn();
        thread::sleep(Duration::from_millis(20));

        // 线程阻塞在 take() 中：先进入 Stopping，再放入命令
        harness.state.begin_stop();
        harness.queue.try_enqueue(build_move(&[1.0], 0.1));
        handle.join().unwrap();

        assert_eq!(harness.mock.request_count(), 0);
        assert!(harness.metrics.snapshot().commands_discarded <= 1);
        assert!(harness.state.get(Ordering::Acquire).is_stopped());
    }

    #[test]
    fn test_deliver_command_outcomes() {
        let mock = MockTransport::new("ws://mock");
        mock.connect().unwrap();
        let metrics = DispatchMetrics::new();
        let command = build_move(&[0.0], 0.5);

        assert_eq!(
            deliver_command(&mock, "arm-0", &command, &metrics),
            DeliveryOutcome::Delivered
        );

        mock.fail_next("busy");
        assert_eq!(
            deliver_command(&mock, "arm-0", &command, &metrics),
            DeliveryOutcome::Failed
        );

        mock.panic_next(String::from("owned panic message"));
        assert_eq!(
            deliver_command(&mock, "arm-0", &command, &metrics),
            DeliveryOutcome::Faulted
        );
    }

    #[test]
    fn test_panic_message_extraction() {
        let borrowed: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(borrowed.as_ref()), "static str");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");

        let other: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}
