//! 高频命令流演示（Mock 传输层）
//!
//! 以约 500Hz 生成笛卡尔目标，并周期性地让传输层卡住 10ms：
//! 卡住期间的命令在发送前就被后续命令覆盖，驱逐率会反映这一点。
//!
//! ```bash
//! RUST_LOG=debug cargo run -p rtmove-sdk --example mock_stream --features mock
//! ```

use rtmove_sdk::prelude::*;
use rtmove_sdk::transport::{MockReply, MockTransport};
use std::thread;
use std::time::Duration;

fn main() -> Result<(), DriverError> {
    rtmove_sdk::init_logger();

    let mock = MockTransport::new("ws://mock");
    let handle = mock.clone();

    let controller = RtControllerBuilder::new("arm-0", "ws://mock")
        .shutdown_timeout(Duration::from_millis(500))
        .build(move |_| handle)?;

    // 模拟一次远端拒绝：投递线程记录后继续
    mock.push_reply(MockReply::Error {
        code: 409,
        message: "target out of workspace".to_string(),
    });

    for step in 0..1000 {
        let t = step as f64 * 0.002;
        let pose = [0.3 + 0.05 * t.sin(), 0.05 * t.cos(), 0.4, 0.0, 3.1, 0.0];
        controller.rt_movec(&pose);

        // 每 100 步让链路卡住 10ms
        if step % 100 == 0 {
            mock.hold();
            thread::sleep(Duration::from_millis(10));
            mock.release();
        }
        thread::sleep(Duration::from_millis(2));
    }

    controller.close();

    let snapshot = controller.metrics();
    println!(
        "enqueued={} evicted={} delivered={} errors={} eviction_rate={:.1}%",
        snapshot.commands_enqueued,
        snapshot.commands_evicted,
        snapshot.commands_delivered,
        snapshot.transport_errors,
        snapshot.eviction_rate()
    );
    println!("remote saw {} requests", mock.request_count());
    Ok(())
}
