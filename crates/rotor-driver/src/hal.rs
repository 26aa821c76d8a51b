//! 硬件接缝
//!
//! 控制循环与外部协作者（FOC 电机抽象、位置传感器、力传感垫）之间的
//! trait 边界。所有方法必须非阻塞或有界耗时：循环是协作式单线程的，
//! 任何一个慢调用都会拖垮整个执行器的响应性。

use thiserror::Error;

/// 硬件层错误
///
/// 传感器/执行器故障没有降级路径：错误会沿 `?` 传到控制循环并终止它
/// （见 `pipeline` 模块）。
#[derive(Error, Debug)]
pub enum HalError {
    /// 位置/速度传感器故障
    #[error("sensor fault: {0}")]
    Sensor(String),

    /// 力传感垫故障
    #[error("force pad fault: {0}")]
    ForcePad(String),

    /// 电机抽象拒绝命令
    #[error("motor fault: {0}")]
    Motor(String),

    /// 底层 IO 错误
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

/// 角度/角速度传感器
///
/// 角度单位为弧度，随传感器量程回绕；零点重基由核心层处理，
/// 实现方不需要关心逻辑角度。
pub trait AngleSensor {
    /// 当前原始角度（弧度）
    fn angle(&mut self) -> Result<f32, HalError>;

    /// 当前角速度（rad/s）
    fn velocity(&mut self) -> Result<f32, HalError>;
}

/// 力传感垫
pub trait ForcePad {
    /// 原始力读数（固定整数范围，如 12 位 ADC）
    fn read(&mut self) -> Result<u16, HalError>;
}

/// 电机抽象（速度闭环模式的 FOC 驱动）
pub trait MotorOutput {
    /// 使能输出级
    fn enable(&mut self) -> Result<(), HalError>;

    /// 关闭输出级（coast）
    fn disable(&mut self) -> Result<(), HalError>;

    /// 设置电压限制（V）
    fn set_voltage_limit(&mut self, volts: f32) -> Result<(), HalError>;

    /// 设置目标速度（rad/s）
    fn set_velocity_target(&mut self, velocity: f32) -> Result<(), HalError>;
}
