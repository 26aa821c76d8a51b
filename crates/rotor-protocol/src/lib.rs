//! # Rotor Protocol
//!
//! 旋钮遥测链路的线上文法定义（无 socket 依赖）
//!
//! ## 模块
//!
//! - `command`: 入站命令解析（握手 / 字母命令 / 复位）
//! - `telemetry`: 出站遥测报文编解码
//!
//! ## 线上格式
//!
//! 报文是 ASCII 文本数据报，单包不超过 [`MAX_DATAGRAM_LEN`] 字节。
//! 出站遥测采用冒号前缀格式 `T:<angle>:<velocity>:<click>`
//! （规范格式，带 click 标志；逗号分隔的旧变体不被接受）。

pub mod command;
pub mod telemetry;

pub use command::{Command, Subsystem, parse_command};
pub use telemetry::TelemetryReport;

use thiserror::Error;

/// 设备侦听的默认 UDP 端口
pub const DEFAULT_PORT: u16 = 4444;

/// 单个数据报的最大长度（字节）
///
/// 与固件侧的接收缓冲区一致，超长报文直接视为无效。
pub const MAX_DATAGRAM_LEN: usize = 64;

/// 协议解析错误
///
/// 链路层对无效报文的处理是静默丢弃；错误变体只用于 trace 日志
/// 说明丢弃原因，不向对端回传任何内容。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 空报文
    #[error("empty payload")]
    Empty,

    /// 超过单包长度上限
    #[error("payload too long: {len} > {max} bytes", max = MAX_DATAGRAM_LEN)]
    TooLong { len: usize },

    /// 不是合法的 ASCII 文本
    #[error("payload is not ASCII text")]
    NotAscii,

    /// 不匹配任何已知命令形式
    #[error("unrecognized payload: {0:?}")]
    Unrecognized(String),

    /// 遥测报文字段非法
    #[error("invalid telemetry field {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}
