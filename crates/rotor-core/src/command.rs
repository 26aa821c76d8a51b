//! 周期输入与电机命令类型
//!
//! `CycleInput` 是一个控制周期内所有行为评估器共享的传感器快照：
//! 周期开始时读取一次，周期内不再重采样，保证各行为观察到一致的输入。

use std::time::Instant;

/// 一个控制周期的传感器快照
#[derive(Debug, Clone, Copy)]
pub struct CycleInput {
    /// 原始传感器角度（弧度，未扣除零点偏移）
    pub raw_angle: f32,
    /// 角速度（rad/s）
    pub angular_velocity: f32,
    /// 原始力传感读数（固定整数范围）
    pub force: u16,
    /// 单调时钟时间戳（显式传入，测试可喂合成值）
    pub now: Instant,
}

/// 单个行为提出的运动请求
///
/// `Some(MotionRequest)` 即该行为本周期申请驱动电机；
/// 是否采纳由仲裁器按优先级决定。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionRequest {
    /// 目标速度（rad/s）
    pub target_velocity: f32,
    /// 电压限制（V）
    pub voltage_limit: f32,
}

/// 仲裁后的电机命令（核心层与电机抽象之间的唯一通道）
///
/// 不变式：`active == false` 时 `target_velocity` 无意义，
/// 电机抽象必须被置为 coast/禁用。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorCommand {
    /// 本周期是否有行为驱动电机
    pub active: bool,
    /// 目标速度（rad/s，仅 `active == true` 时有效）
    pub target_velocity: f32,
    /// 电压限制（V，`active == false` 时为空闲基线以减少发热）
    pub voltage_limit: f32,
}

impl MotorCommand {
    /// 空闲命令（电机 coast，电压限制回落到空闲基线）
    pub fn idle(idle_voltage_limit: f32) -> Self {
        Self {
            active: false,
            target_velocity: 0.0,
            voltage_limit: idle_voltage_limit,
        }
    }
}

/// 本周期胜出的行为（用于日志与状态快照）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveSource {
    /// 点击脉冲
    Click,
    /// 边界回弹
    Wall,
    /// 档位吸附
    Detent,
    /// 无行为激活
    #[default]
    Idle,
}
