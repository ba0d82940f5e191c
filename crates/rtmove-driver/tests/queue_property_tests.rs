//! 分发队列的属性测试
//!
//! 使用 proptest 验证 drop-oldest 策略的不变量。

use proptest::prelude::*;
use rtmove_driver::{DispatchQueue, EnqueueOutcome, Envelope};

fn drain(queue: &DispatchQueue<u32>) -> Vec<u32> {
    let mut drained = Vec::new();
    while !queue.is_empty() {
        if let Envelope::Command(item) = queue.take() {
            drained.push(item);
        }
    }
    drained
}

proptest! {
    /// 任意入队序列后，长度不超过容量
    #[test]
    fn len_never_exceeds_capacity(capacity in 1usize..8, items in prop::collection::vec(any::<u32>(), 0..64)) {
        let queue = DispatchQueue::new(capacity);
        for item in items {
            queue.try_enqueue(item);
            prop_assert!(queue.len() <= capacity);
        }
    }

    /// 保留的元素恰好是最后 N 个入队的元素，且按 FIFO 顺序取出
    #[test]
    fn retains_latest_in_fifo_order(capacity in 1usize..8, items in prop::collection::vec(any::<u32>(), 0..64)) {
        let queue = DispatchQueue::new(capacity);
        for &item in &items {
            queue.try_enqueue(item);
        }

        let skip = items.len().saturating_sub(capacity);
        prop_assert_eq!(drain(&queue), items[skip..].to_vec());
    }

    /// 驱逐计数之和 + 剩余数量 = 入队总数
    #[test]
    fn evictions_account_for_every_item(capacity in 1usize..8, items in prop::collection::vec(any::<u32>(), 0..64)) {
        let queue = DispatchQueue::new(capacity);
        let evicted: usize = items
            .iter()
            .map(|&item| queue.try_enqueue(item).evicted())
            .sum();

        prop_assert_eq!(evicted + queue.len(), items.len());
    }

    /// 停止标记总是最后一个被取出，关闭后的命令全部被拒绝
    #[test]
    fn stop_marker_is_last_and_closes(
        capacity in 1usize..8,
        before in prop::collection::vec(any::<u32>(), 0..16),
        after in prop::collection::vec(any::<u32>(), 0..16),
    ) {
        let queue = DispatchQueue::new(capacity);
        for item in before {
            queue.try_enqueue(item);
        }
        prop_assert!(queue.enqueue_stop_marker().is_some());
        for item in after {
            prop_assert_eq!(queue.try_enqueue(item), EnqueueOutcome::Rejected);
        }

        prop_assert!(queue.len() <= capacity);
        let mut last = None;
        while !queue.is_empty() {
            last = Some(queue.take());
        }
        prop_assert_eq!(last, Some(Envelope::Stop));
    }
}
