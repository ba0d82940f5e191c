//! 投递线程状态定义
//!
//! 控制器与投递线程之间共享的三态运行标志。

use std::sync::atomic::{AtomicU8, Ordering};

/// 投递线程状态
///
/// # 状态转换
///
/// ```text
/// Running ──close()──▶ Stopping ──收到停止标记──▶ Stopped
/// ```
///
/// `Running → Stopping` 只发生一次（由 `close()` 触发），
/// `Stopping → Stopped` 由投递线程在退出循环时完成。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum WorkerState {
    /// 运行中（默认）
    #[default]
    Running = 0,

    /// 正在关闭：不再投递任何命令
    Stopping = 1,

    /// 已退出循环
    Stopped = 2,
}

impl WorkerState {
    /// 从 u8 转换
    ///
    /// 无效值按 Stopped 处理。
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Running,
            1 => Self::Stopping,
            _ => Self::Stopped,
        }
    }

    /// 转换为 u8
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    pub fn is_stopped(self) -> bool {
        self == Self::Stopped
    }
}

/// 投递线程状态（原子版本，用于线程间共享）
///
/// 投递线程在每次循环开始时读取（Acquire），控制器在关闭时写入。
#[derive(Debug)]
pub struct AtomicWorkerState {
    inner: AtomicU8,
}

impl AtomicWorkerState {
    pub fn new(state: WorkerState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    /// 获取当前状态
    pub fn get(&self, ordering: Ordering) -> WorkerState {
        WorkerState::from_u8(self.inner.load(ordering))
    }

    /// 设置状态
    pub fn set(&self, state: WorkerState, ordering: Ordering) {
        self.inner.store(state.as_u8(), ordering);
    }

    /// 比较并交换（Compare-and-Swap）
    ///
    /// 成功返回旧状态，失败返回当前实际状态。
    pub fn compare_exchange(
        &self,
        current: WorkerState,
        new: WorkerState,
        success: Ordering,
        failure: Ordering,
    ) -> Result<WorkerState, WorkerState> {
        self.inner
            .compare_exchange(current.as_u8(), new.as_u8(), success, failure)
            .map(WorkerState::from_u8)
            .map_err(WorkerState::from_u8)
    }

    /// 发起关闭：`Running → Stopping`
    ///
    /// 只有第一个调用者返回 `true`，用于保证关闭流程只执行一次。
    pub fn begin_stop(&self) -> bool {
        self.compare_exchange(
            WorkerState::Running,
            WorkerState::Stopping,
            Ordering::AcqRel,
            Ordering::Acquire,
        )
        .is_ok()
    }
}

impl Default for AtomicWorkerState {
    fn default() -> Self {
        Self::new(WorkerState::default())
    }
}
