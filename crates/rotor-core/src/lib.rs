//! # Rotor Core
//!
//! 旋钮控制仲裁核心（无硬件依赖）
//!
//! 每个控制周期读取一次传感器快照，三个行为评估器独立求值，
//! 仲裁器按固定优先级合并为一条电机命令：
//!
//! ```text
//! ClickPulser > BoundaryEnforcer > DetentQuantizer > Idle
//! ```
//!
//! ## 模块
//!
//! - `config`: 可校验的调参配置
//! - `command`: 周期输入/电机命令类型
//! - `reference`: 逻辑角度零点（rebase 机制）
//! - `click`: 力触发的双相脉冲状态机
//! - `wall`: 边界回弹（迟滞检测）
//! - `detent`: 档位吸附（死区/啮合带）
//! - `arbiter`: 固定优先级仲裁
//! - `engine`: 周期编排（驱动层唯一入口）
//!
//! ## 确定性
//!
//! 所有时间相关的状态转换都通过显式传入的单调时钟时间戳驱动，
//! 测试可以喂入合成时间戳逐周期复现。

pub mod arbiter;
pub mod click;
pub mod command;
pub mod config;
pub mod detent;
pub mod engine;
pub mod reference;
pub mod wall;

// 重新导出常用类型
pub use arbiter::arbitrate;
pub use click::{ClickPhase, ClickPulser};
pub use command::{ActiveSource, CycleInput, MotionRequest, MotorCommand};
pub use config::{ConfigError, KnobConfig};
pub use detent::DetentQuantizer;
pub use engine::{CycleOutput, KnobEngine};
pub use reference::PositionReference;
pub use wall::BoundaryEnforcer;
