//! 分发队列（Drop-Oldest 背压策略）
//!
//! 调用方与投递线程之间唯一共享的可变结构。
//!
//! # 策略
//!
//! 队列满时先驱逐最旧的待发送命令，再放入新命令：最新的命令代表调用方
//! 当前的意图，必须胜出；尚未发出的旧命令已经过时，可以安全丢弃。
//! 默认容量为 1，即"最新命令总是覆盖上一条"。
//!
//! # 原子性
//!
//! `try_enqueue`、`take`、`enqueue_stop_marker` 在同一把锁下完成各自的
//! 驱逐与放入，彼此之间是原子的。

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// 队列中的元素
///
/// 停止标记与真实命令共享同一通道，用带标签的枚举区分，
/// 投递线程的分支因此是穷尽的。
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    /// 待投递的命令
    Command(T),
    /// 停止标记：投递线程收到后退出循环
    Stop,
}

impl<T> Envelope<T> {
    /// 是否为停止标记
    pub fn is_stop(&self) -> bool {
        matches!(self, Envelope::Stop)
    }

    /// 取出命令（停止标记返回 `None`）
    pub fn into_command(self) -> Option<T> {
        match self {
            Envelope::Command(item) => Some(item),
            Envelope::Stop => None,
        }
    }
}

/// 入队结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// 直接放入（队列未满）
    Admitted,
    /// 驱逐了 `evicted` 条旧命令后放入
    Replaced { evicted: usize },
    /// 队列已关闭（关闭流程已开始），命令被丢弃
    Rejected,
}

impl EnqueueOutcome {
    /// 命令是否进入了队列
    pub fn is_admitted(self) -> bool {
        !matches!(self, EnqueueOutcome::Rejected)
    }

    /// 被驱逐的旧命令数量
    pub fn evicted(self) -> usize {
        match self {
            EnqueueOutcome::Replaced { evicted } => evicted,
            _ => 0,
        }
    }
}

struct QueueInner<T> {
    items: VecDeque<Envelope<T>>,
    /// 停止标记已入队：此后拒绝所有命令
    closed: bool,
}

impl<T> QueueInner<T> {
    /// 驱逐最旧元素直到有空位，返回驱逐数量
    fn evict_for(&mut self, capacity: usize) -> usize {
        let mut evicted = 0;
        while self.items.len() >= capacity {
            if self.items.pop_front().is_none() {
                break;
            }
            evicted += 1;
        }
        evicted
    }
}

/// 有界分发队列
///
/// - 生产者（任意线程）：`try_enqueue()`，从不等待空位
/// - 消费者（投递线程）：`take()`，阻塞直到有元素
///
/// 不变量：任意时刻 `len() <= capacity()`。
pub struct DispatchQueue<T> {
    inner: Mutex<QueueInner<T>>,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> DispatchQueue<T> {
    /// 默认容量（单槽位）
    pub const DEFAULT_CAPACITY: usize = 1;

    /// 创建队列
    ///
    /// `capacity` 为 0 时按 1 处理（停止标记至少需要一个槽位）。
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(QueueInner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// 非阻塞入队
    ///
    /// 队列满时驱逐最旧的元素（即下一个将被取出的元素），然后放入 `item`。
    /// 队列关闭后返回 [`EnqueueOutcome::Rejected`]，`item` 被丢弃。
    pub fn try_enqueue(&self, item: T) -> EnqueueOutcome {
        let mut inner = self.inner.lock();
        if inner.closed {
            return EnqueueOutcome::Rejected;
        }

        let evicted = inner.evict_for(self.capacity);
        inner.items.push_back(Envelope::Command(item));
        drop(inner);

        self.not_empty.notify_one();

        if evicted == 0 {
            EnqueueOutcome::Admitted
        } else {
            EnqueueOutcome::Replaced { evicted }
        }
    }

    /// 放入停止标记并关闭队列
    ///
    /// 与 `try_enqueue` 走同一条"先驱逐再放入"路径，停止标记因此永远不会
    /// 因队列已满而丢失。返回为此驱逐的命令数；重复调用为空操作，返回 `None`。
    pub fn enqueue_stop_marker(&self) -> Option<usize> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return None;
        }

        inner.closed = true;
        let evicted = inner.evict_for(self.capacity);
        inner.items.push_back(Envelope::Stop);
        drop(inner);

        self.not_empty.notify_all();
        Some(evicted)
    }

    /// 丢弃所有待投递的命令，保留停止标记
    ///
    /// 返回丢弃的命令数。
    pub fn discard_pending(&self) -> usize {
        let mut inner = self.inner.lock();
        let before = inner.items.len();
        inner.items.retain(Envelope::is_stop);
        before - inner.items.len()
    }

    /// 阻塞取出最旧的元素（FIFO）
    pub fn take(&self) -> Envelope<T> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(envelope) = inner.items.pop_front() {
                return envelope;
            }
            self.not_empty.wait(&mut inner);
        }
    }

    /// 带超时的取出
    ///
    /// 超时仍为空时返回 `None`。
    pub fn take_timeout(&self, timeout: Duration) -> Option<Envelope<T>> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        loop {
            if let Some(envelope) = inner.items.pop_front() {
                return Some(envelope);
            }
            if self.not_empty.wait_until(&mut inner, deadline).timed_out() {
                return inner.items.pop_front();
            }
        }
    }

    /// 当前元素数量（包括停止标记）
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 停止标记是否已入队
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}

impl<T> Default for DispatchQueue<T> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl<T> std::fmt::Debug for DispatchQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("DispatchQueue")
            .field("len", &inner.items.len())
            .field("capacity", &self.capacity)
            .field("closed", &inner.closed)
            .finish()
    }
}
