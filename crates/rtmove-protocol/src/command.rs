//! 命令记录与构建函数
//!
//! 每个运动变体对应一个纯函数，把运动意图（目标位姿、时长）转换为
//! 规范的 `{method, payload}` 记录。

use crate::{Method, Payload};
use serde::Serialize;
use serde_json::Value;

/// 笛卡尔/关节命令中 `velocityPercentage` 的满速值
pub const FULL_VELOCITY_PERCENTAGE: u8 = 100;

/// 一条不可变的运动命令
///
/// 由构建函数创建，由投递线程消费一次，之后不再修改。
/// 字段私有：构造后只能读取，不能改写。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    method: Method,
    payload: Payload,
}

impl Command {
    /// 从方法和载荷直接构造（用于自定义变体）
    pub fn new(method: Method, payload: Payload) -> Self {
        Self { method, payload }
    }

    /// 命令方法
    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    /// 命令载荷
    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// 消费并拆分为 `(method, payload)`
    pub fn into_parts(self) -> (Method, Payload) {
        (self.method, self.payload)
    }
}

/// 位姿转 JSON 数组
///
/// 非有限值（NaN/Inf）按 JSON 规则编码为 `null`，不在本层拒绝。
fn pose_value(target: &[f64]) -> Value {
    Value::Array(target.iter().copied().map(Value::from).collect())
}

/// 构建 `rt-move` 命令（单个路点）
///
/// 载荷：`{"waypoints": [{"position": target, "duration": duration}]}`
pub fn build_move(target: &[f64], duration: f64) -> Command {
    let mut waypoint = Payload::new();
    waypoint.insert("position".to_string(), pose_value(target));
    waypoint.insert("duration".to_string(), Value::from(duration));

    let mut payload = Payload::new();
    payload.insert(
        "waypoints".to_string(),
        Value::Array(vec![Value::Object(waypoint)]),
    );

    Command::new(Method::RtMove, payload)
}

/// 构建 `rt-move-cartesian` 命令（满速、绝对坐标）
pub fn build_move_cartesian(target: &[f64]) -> Command {
    let mut payload = Payload::new();
    payload.insert("destination".to_string(), pose_value(target));
    payload.insert(
        "velocityPercentage".to_string(),
        Value::from(FULL_VELOCITY_PERCENTAGE),
    );
    payload.insert("isRelative".to_string(), Value::Bool(false));

    Command::new(Method::RtMoveCartesian, payload)
}

/// 构建 `rt-move-cartesian-soft` 命令（按时长而非速度）
pub fn build_move_cartesian_soft(target: &[f64], duration: f64) -> Command {
    let mut payload = Payload::new();
    payload.insert("destination".to_string(), pose_value(target));
    payload.insert("useVelocity".to_string(), Value::Bool(false));
    payload.insert("duration".to_string(), Value::from(duration));
    payload.insert("velocityPercentage".to_string(), Value::from(0u8));
    payload.insert("isRelative".to_string(), Value::Bool(false));

    Command::new(Method::RtMoveCartesianSoft, payload)
}

/// 构建 `rt-move-cartesian-hard` 命令
pub fn build_move_cartesian_hard(target: &[f64]) -> Command {
    let mut payload = Payload::new();
    payload.insert("destination".to_string(), pose_value(target));
    payload.insert("isRelative".to_string(), Value::Bool(false));

    Command::new(Method::RtMoveCartesianHard, payload)
}
