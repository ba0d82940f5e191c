//! 分发性能指标模块
//!
//! 提供零开销的原子计数器，用于监控命令链路的健康状态。
//! 所有计数器都使用原子操作，可以在任何线程安全地读取，不会引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 分发链路实时指标
///
/// 丢弃与失败不会反馈给调用方，只能通过这里（以及日志）观察。
///
/// # 使用示例
///
/// ```rust
/// use rtmove_driver::DispatchMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = DispatchMetrics::new();
/// metrics.commands_enqueued.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.commands_enqueued, 1);
/// ```
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// 进入队列的命令数
    pub commands_enqueued: AtomicU64,

    /// 被更新的命令驱逐（从未发送）的命令数
    ///
    /// 如果这个值快速增长，说明投递线程（或网络）跟不上命令生成速度。
    /// 对实时控制流这是预期行为：只有最新意图才重要。
    pub commands_evicted: AtomicU64,

    /// 关闭后被拒绝的命令数
    pub commands_rejected: AtomicU64,

    /// 成功投递的命令数
    pub commands_delivered: AtomicU64,

    /// 关闭过程中被取出但未发送的命令数
    pub commands_discarded: AtomicU64,

    /// 传输层返回错误的次数
    pub transport_errors: AtomicU64,

    /// 传输层 panic（意外故障）的次数
    pub transport_faults: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指标快照
    ///
    /// 使用 `Ordering::Relaxed`：不同计数器之间可能有微小的时间差，适合监控场景。
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            commands_enqueued: self.commands_enqueued.load(Ordering::Relaxed),
            commands_evicted: self.commands_evicted.load(Ordering::Relaxed),
            commands_rejected: self.commands_rejected.load(Ordering::Relaxed),
            commands_delivered: self.commands_delivered.load(Ordering::Relaxed),
            commands_discarded: self.commands_discarded.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            transport_faults: self.transport_faults.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器（用于性能测试）
    pub fn reset(&self) {
        self.commands_enqueued.store(0, Ordering::Relaxed);
        self.commands_evicted.store(0, Ordering::Relaxed);
        self.commands_rejected.store(0, Ordering::Relaxed);
        self.commands_delivered.store(0, Ordering::Relaxed);
        self.commands_discarded.store(0, Ordering::Relaxed);
        self.transport_errors.store(0, Ordering::Relaxed);
        self.transport_faults.store(0, Ordering::Relaxed);
    }
}

/// 指标快照（不可变，用于读取）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub commands_enqueued: u64,
    pub commands_evicted: u64,
    pub commands_rejected: u64,
    pub commands_delivered: u64,
    pub commands_discarded: u64,
    pub transport_errors: u64,
    pub transport_faults: u64,
}

impl MetricsSnapshot {
    /// 驱逐率（百分比）
    ///
    /// 返回 0.0 到 100.0 之间的值。如果 `commands_enqueued` 为 0，返回 0.0。
    pub fn eviction_rate(&self) -> f64 {
        if self.commands_enqueued == 0 {
            return 0.0;
        }
        (self.commands_evicted as f64 / self.commands_enqueued as f64) * 100.0
    }

    /// 已尝试发送的请求数（成功 + 错误 + 故障）
    pub fn requests_attempted(&self) -> u64 {
        self.commands_delivered + self.transport_errors + self.transport_faults
    }

    /// 请求失败率（百分比）
    ///
    /// 如果没有任何请求，返回 0.0。
    pub fn failure_rate(&self) -> f64 {
        let attempted = self.requests_attempted();
        if attempted == 0 {
            return 0.0;
        }
        ((self.transport_errors + self.transport_faults) as f64 / attempted as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_snapshot() {
        let metrics = DispatchMetrics::new();
        metrics.commands_enqueued.fetch_add(10, Ordering::Relaxed);
        metrics.commands_evicted.fetch_add(4, Ordering::Relaxed);
        metrics.commands_delivered.fetch_add(5, Ordering::Relaxed);
        metrics.transport_errors.fetch_add(1, Ordering::Relaxed);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.commands_enqueued, 10);
        assert_eq!(snapshot.commands_evicted, 4);
        assert_eq!(snapshot.requests_attempted(), 6);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = DispatchMetrics::new();
        metrics.commands_rejected.fetch_add(3, Ordering::Relaxed);
        metrics.transport_faults.fetch_add(2, Ordering::Relaxed);

        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_rates() {
        let snapshot = MetricsSnapshot {
            commands_enqueued: 200,
            commands_evicted: 50,
            commands_delivered: 90,
            transport_errors: 6,
            transport_faults: 4,
            ..Default::default()
        };
        assert!((snapshot.eviction_rate() - 25.0).abs() < 1e-9);
        assert!((snapshot.failure_rate() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_rates_empty() {
        let snapshot = MetricsSnapshot::default();
        assert_eq!(snapshot.eviction_rate(), 0.0);
        assert_eq!(snapshot.failure_rate(), 0.0);
    }
}
