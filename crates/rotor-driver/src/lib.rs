//! 驱动层模块
//!
//! 本模块提供 Rotor 旋钮的设备驱动功能，包括：
//! - 硬件接缝（电机 / 角度传感器 / 力传感垫的 trait 抽象）
//! - 协作式固定周期控制循环（传感 → 仲裁 → 执行 → 遥测）
//! - 控制线程管理与状态快照（ArcSwap 无锁读取）
//! - 用于测试和演示的 mock 适配器
//!
//! FOC 换相、SPI 传感器驱动、PWM 栅极驱动属于外部协作者，
//! 在 [`hal`] 的 trait 后面实现；本层假定它们在初始化阶段就大声失败，
//! 而不是在循环中静默退化。

mod builder;
mod error;
pub mod hal;
pub mod mock;
pub mod pipeline;
mod rotor;
pub mod state;

pub use builder::RotorBuilder;
pub use error::DriverError;
pub use hal::{AngleSensor, ForcePad, HalError, MotorOutput};
pub use pipeline::LoopConfig;
pub use rotor::Rotor;
pub use state::RotorState;
