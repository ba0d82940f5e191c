//! 控制器模块
//!
//! 提供对外的 `RtController`，封装传输连接、分发队列和投递线程的生命周期。

use crate::config::ControllerConfig;
use crate::error::DriverError;
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::pipeline::{WORKER_THREAD_NAME, delivery_loop};
use crate::queue::{DispatchQueue, EnqueueOutcome};
use crate::state::{AtomicWorkerState, WorkerState};
use parking_lot::Mutex;
use rtmove_protocol::{
    Command, build_move, build_move_cartesian, build_move_cartesian_hard,
    build_move_cartesian_soft,
};
use rtmove_transport::Transport;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// 驱逐率检查间隔（按入队次数）
const EVICTION_CHECK_INTERVAL: u64 = 1000;

#[derive(Debug)]
enum JoinFailure {
    /// 超时：线程仍在运行（通常卡在 `run_request()` 中）
    Timeout,
    /// 线程 panic
    Panicked,
    /// 看门狗线程无法启动
    Watchdog(std::io::Error),
}

/// Extension trait for timeout-capable thread joins
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> Result<(), JoinFailure>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> Result<(), JoinFailure> {
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);

        // 看门狗线程代为 join，主线程只做带超时的等待，无忙等
        thread::Builder::new()
            .name(format!("{}_join", WORKER_THREAD_NAME))
            .spawn(move || {
                let panicked = self.join().is_err();
                // 接收端可能已超时退出，忽略发送错误
                let _ = done_tx.send(panicked);
            })
            .map_err(JoinFailure::Watchdog)?;

        match done_rx.recv_timeout(timeout) {
            Ok(false) => Ok(()),
            Ok(true) => Err(JoinFailure::Panicked),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Err(JoinFailure::Timeout),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Err(JoinFailure::Panicked),
        }
    }
}

/// 实时运动控制器（对外 API）
///
/// - 构造时连接传输层并启动投递线程（`rt_sender`）
/// - 运动方法构建命令后非阻塞入队，可从任意线程调用
/// - `close()` 在有界时间内完成关闭；`Drop` 时自动关闭
///
/// # 示例
///
/// ```rust,no_run
/// # use rtmove_driver::{ControllerConfig, RtController};
/// # use rtmove_transport::Transport;
/// # fn example<T: Transport + 'static>(open: impl FnOnce(&str) -> T) -> Result<(), rtmove_driver::DriverError> {
/// let config = ControllerConfig::new("arm-0", "ws://192.168.1.10:9000");
/// let controller = RtController::new(config, open)?;
///
/// controller.rt_movec(&[0.3, 0.0, 0.4, 0.0, 3.1, 0.0]);
/// controller.rt_movec(&[0.3, 0.1, 0.4, 0.0, 3.1, 0.0]); // 覆盖上一条（如果尚未发送）
///
/// controller.close();
/// # Ok(())
/// # }
/// ```
pub struct RtController<T: Transport + 'static> {
    /// 目标机器人 ID（每次请求的 target_id）
    robot_id: String,
    /// 传输层地址（用于日志）
    endpoint: String,
    /// 传输连接（投递线程与控制器共享）
    transport: Arc<T>,
    /// 分发队列
    queue: Arc<DispatchQueue<Command>>,
    /// 投递线程状态
    state: Arc<AtomicWorkerState>,
    /// 性能指标（原子计数器）
    metrics: Arc<DispatchMetrics>,
    /// 投递线程句柄（close 时 take 并 join）
    worker: Mutex<Option<JoinHandle<()>>>,
    /// 关闭时等待投递线程的最长时间
    shutdown_timeout: Duration,
}

impl<T: Transport + 'static> RtController<T> {
    /// 创建控制器
    ///
    /// 1. 校验配置
    /// 2. 通过 `open(endpoint)` 构造传输层并 `connect()`
    /// 3. 创建分发队列，启动投递线程
    ///
    /// # 错误
    /// - `DriverError::InvalidConfig`: 配置无效
    /// - `DriverError::Connect`: 连接失败（不会启动任何线程）
    /// - `DriverError::WorkerSpawn`: 线程启动失败（传输层已关闭）
    pub fn new<F>(config: ControllerConfig, open: F) -> Result<Self, DriverError>
    where
        F: FnOnce(&str) -> T,
    {
        config.validate()?;

        let transport = Arc::new(open(&config.endpoint));
        if let Err(e) = transport.connect() {
            error!("Connection to {} failed, quitting: {}", config.endpoint, e);
            return Err(DriverError::Connect(e));
        }

        let queue = Arc::new(DispatchQueue::new(config.queue_capacity));
        let state = Arc::new(AtomicWorkerState::new(WorkerState::Running));
        let metrics = Arc::new(DispatchMetrics::new());

        let spawned = {
            let transport = transport.clone();
            let queue = queue.clone();
            let state = state.clone();
            let metrics = metrics.clone();
            let target_id = config.robot_id.clone();
            thread::Builder::new()
                .name(WORKER_THREAD_NAME.to_string())
                .spawn(move || delivery_loop(transport, queue, state, metrics, target_id))
        };

        let worker = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                error!("Failed to spawn delivery worker: {}", e);
                transport.close();
                return Err(DriverError::WorkerSpawn(e));
            },
        };

        info!(
            "RtController started: robot={}, endpoint={}, queue_capacity={}",
            config.robot_id, config.endpoint, config.queue_capacity
        );

        let shutdown_timeout = config.shutdown_timeout();
        Ok(Self {
            robot_id: config.robot_id,
            endpoint: config.endpoint,
            transport,
            queue,
            state,
            metrics,
            worker: Mutex::new(Some(worker)),
            shutdown_timeout,
        })
    }

    /// 关节空间路点运动（`rt-move`）
    pub fn rt_move(&self, target: &[f64], duration: f64) -> EnqueueOutcome {
        self.send(build_move(target, duration))
    }

    /// 笛卡尔空间运动（`rt-move-cartesian`，满速）
    pub fn rt_movec(&self, target: &[f64]) -> EnqueueOutcome {
        self.send(build_move_cartesian(target))
    }

    /// 笛卡尔空间柔顺运动（`rt-move-cartesian-soft`，按时长）
    pub fn rt_movec_soft(&self, target: &[f64], duration: f64) -> EnqueueOutcome {
        self.send(build_move_cartesian_soft(target, duration))
    }

    /// 笛卡尔空间直接运动（`rt-move-cartesian-hard`）
    pub fn rt_movec_hard(&self, target: &[f64]) -> EnqueueOutcome {
        self.send(build_move_cartesian_hard(target))
    }

    /// 非阻塞发送任意命令
    ///
    /// 队列满时驱逐最旧的待发送命令；关闭开始后命令被拒绝。
    /// 返回值只描述入队结果，不代表命令已送达。
    pub fn send(&self, command: Command) -> EnqueueOutcome {
        let method = command.method();
        let outcome = self.queue.try_enqueue(command);

        match outcome {
            EnqueueOutcome::Admitted => {
                self.metrics.commands_enqueued.fetch_add(1, Ordering::Relaxed);
            },
            EnqueueOutcome::Replaced { evicted } => {
                let total = self.metrics.commands_enqueued.fetch_add(1, Ordering::Relaxed) + 1;
                let evictions = self
                    .metrics
                    .commands_evicted
                    .fetch_add(evicted as u64, Ordering::Relaxed)
                    + evicted as u64;
                debug!("{} superseded {} pending command(s)", method, evicted);

                // 每 1000 次入队检查一次驱逐率，避免频繁计算
                if total % EVICTION_CHECK_INTERVAL == 0 {
                    let rate = (evictions as f64 / total as f64) * 100.0;
                    if rate > 50.0 {
                        warn!(
                            "High command eviction rate: {:.1}% ({} evicted / {} enqueued). \
                             The delivery worker or transport may be a bottleneck.",
                            rate, evictions, total
                        );
                    } else if rate > 30.0 {
                        info!(
                            "Moderate command eviction rate: {:.1}% ({} evicted / {} enqueued)",
                            rate, evictions, total
                        );
                    }
                }
            },
            EnqueueOutcome::Rejected => {
                self.metrics.commands_rejected.fetch_add(1, Ordering::Relaxed);
                warn!("cmd queue closed, drop cmd {}", method);
            },
        }

        outcome
    }

    /// 关闭控制器
    ///
    /// 1. 状态 `Running → Stopping`（重复调用直接返回）
    /// 2. 放入停止标记（为其驱逐的命令计入 `commands_evicted`）
    /// 3. 等待投递线程退出，最多 `shutdown_timeout`；超时只记录警告
    /// 4. 丢弃仍在队列中的命令（计入 `commands_discarded`）
    /// 5. 关闭传输连接（无论 join 是否成功）
    pub fn close(&self) {
        if !self.state.begin_stop() {
            trace!("RtController: close() called again, ignoring");
            return;
        }

        debug!("RtController: shutting down robot={}", self.robot_id);
        if let Some(evicted) = self.queue.enqueue_stop_marker()
            && evicted > 0
        {
            self.metrics.commands_evicted.fetch_add(evicted as u64, Ordering::Relaxed);
            debug!("RtController: stop marker evicted {} pending command(s)", evicted);
        }

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            match handle.join_timeout(self.shutdown_timeout) {
                Ok(()) => trace!("RtController: delivery worker joined"),
                Err(JoinFailure::Timeout) => warn!(
                    "Delivery worker did not stop within {:?}, closing transport anyway",
                    self.shutdown_timeout
                ),
                Err(JoinFailure::Panicked) => error!("Delivery worker panicked"),
                Err(JoinFailure::Watchdog(e)) => {
                    warn!("Failed to spawn join watchdog, detaching delivery worker: {}", e)
                },
            }
        }

        // 投递线程卡住时，停止标记之前的命令留在队列中
        let leftover = self.queue.discard_pending();
        if leftover > 0 {
            self.metrics.commands_discarded.fetch_add(leftover as u64, Ordering::Relaxed);
            debug!("RtController: discarded {} pending command(s)", leftover);
        }

        self.transport.close();

        let snapshot = self.metrics.snapshot();
        info!(
            "RtController closed: robot={}, endpoint={}, delivered={}, evicted={}, discarded={}, errors={}, faults={}",
            self.robot_id,
            self.endpoint,
            snapshot.commands_delivered,
            snapshot.commands_evicted,
            snapshot.commands_discarded,
            snapshot.transport_errors,
            snapshot.transport_faults
        );
    }

    /// 目标机器人 ID
    pub fn robot_id(&self) -> &str {
        &self.robot_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 投递线程当前状态
    pub fn state(&self) -> WorkerState {
        self.state.get(Ordering::Acquire)
    }

    /// 是否仍接受命令
    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// 投递线程是否存活
    ///
    /// `close()` 之后句柄已交给看门狗，此时以线程是否写入 `Stopped` 为准：
    /// join 超时的线程（卡在 `run_request()` 中）仍视为存活。
    pub fn is_worker_alive(&self) -> bool {
        match self.worker.lock().as_ref() {
            Some(handle) => !handle.is_finished(),
            None => !self.state().is_stopped(),
        }
    }

    /// 队列中等待投递的命令数
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// 队列容量
    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// 获取性能指标快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl<T: Transport + 'static> Drop for RtController<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: Transport + 'static> std::fmt::Debug for RtController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtController")
            .field("robot_id", &self.robot_id)
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .field("queue", &self.queue)
            .finish()
    }
}
