//! 命令方法定义

use crate::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 实时运动命令的方法名
///
/// 序列化为远端约定的字符串（如 `"rt-move-cartesian"`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// 关节空间路点运动
    #[serde(rename = "rt-move")]
    RtMove,
    /// 笛卡尔空间运动（满速）
    #[serde(rename = "rt-move-cartesian")]
    RtMoveCartesian,
    /// 笛卡尔空间柔顺运动（按时长）
    #[serde(rename = "rt-move-cartesian-soft")]
    RtMoveCartesianSoft,
    /// 笛卡尔空间直接运动
    #[serde(rename = "rt-move-cartesian-hard")]
    RtMoveCartesianHard,
}

impl Method {
    /// 所有方法（按定义顺序）
    pub const ALL: [Method; 4] = [
        Method::RtMove,
        Method::RtMoveCartesian,
        Method::RtMoveCartesianSoft,
        Method::RtMoveCartesianHard,
    ];

    /// 远端使用的方法名
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::RtMove => "rt-move",
            Method::RtMoveCartesian => "rt-move-cartesian",
            Method::RtMoveCartesianSoft => "rt-move-cartesian-soft",
            Method::RtMoveCartesianHard => "rt-move-cartesian-hard",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownMethod(s.to_string()))
    }
}
