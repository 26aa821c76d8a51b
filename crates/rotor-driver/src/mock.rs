//! Mock 适配器
//!
//! 无硬件环境下的电机/传感器实现：集成测试和 CLI 的 `--mock`
//! 演示模式共用。句柄可克隆（内部 `Arc<Mutex>`），测试线程写入
//! 传感值、读取电机收到的命令，控制线程并发运行。

use crate::hal::{AngleSensor, ForcePad, HalError, MotorOutput};
use parking_lot::Mutex;
use std::sync::Arc;

/// Mock 电机收到的最新命令状态
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorSnapshot {
    /// 输出级是否使能
    pub enabled: bool,
    /// 最近一次设置的电压限制
    pub voltage_limit: f32,
    /// 最近一次设置的目标速度
    pub velocity_target: f32,
    /// enable 被调用的次数
    pub enable_count: u32,
}

/// Mock 电机
#[derive(Debug, Clone, Default)]
pub struct MockMotor {
    state: Arc<Mutex<MotorSnapshot>>,
}

impl MockMotor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取当前命令状态
    pub fn snapshot(&self) -> MotorSnapshot {
        *self.state.lock()
    }
}

impl MotorOutput for MockMotor {
    fn enable(&mut self) -> Result<(), HalError> {
        let mut state = self.state.lock();
        state.enabled = true;
        state.enable_count += 1;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), HalError> {
        self.state.lock().enabled = false;
        Ok(())
    }

    fn set_voltage_limit(&mut self, volts: f32) -> Result<(), HalError> {
        self.state.lock().voltage_limit = volts;
        Ok(())
    }

    fn set_velocity_target(&mut self, velocity: f32) -> Result<(), HalError> {
        self.state.lock().velocity_target = velocity;
        Ok(())
    }
}

/// Mock 角度传感器（测试侧写入，控制线程读取）
#[derive(Debug, Clone, Default)]
pub struct MockAngleSensor {
    state: Arc<Mutex<(f32, f32)>>,
}

impl MockAngleSensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置原始角度（弧度）
    pub fn set_angle(&self, angle: f32) {
        self.state.lock().0 = angle;
    }

    /// 设置角速度（rad/s）
    pub fn set_velocity(&self, velocity: f32) {
        self.state.lock().1 = velocity;
    }
}

impl AngleSensor for MockAngleSensor {
    fn angle(&mut self) -> Result<f32, HalError> {
        Ok(self.state.lock().0)
    }

    fn velocity(&mut self) -> Result<f32, HalError> {
        Ok(self.state.lock().1)
    }
}

/// Mock 力传感垫
#[derive(Debug, Clone, Default)]
pub struct MockForcePad {
    force: Arc<Mutex<u16>>,
}

impl MockForcePad {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置力读数
    pub fn set_force(&self, force: u16) {
        *self.force.lock() = force;
    }
}

impl ForcePad for MockForcePad {
    fn read(&mut self) -> Result<u16, HalError> {
        Ok(*self.force.lock())
    }
}

/// 总是失败的传感器（故障语义测试用）
#[derive(Debug, Clone, Default)]
pub struct FaultyAngleSensor;

impl AngleSensor for FaultyAngleSensor {
    fn angle(&mut self) -> Result<f32, HalError> {
        Err(HalError::Sensor("mock sensor fault".to_string()))
    }

    fn velocity(&mut self) -> Result<f32, HalError> {
        Err(HalError::Sensor("mock sensor fault".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_motor_records_commands() {
        let motor = MockMotor::new();
        let mut handle = motor.clone();

        handle.enable().unwrap();
        handle.set_voltage_limit(5.0).unwrap();
        handle.set_velocity_target(10.0).unwrap();

        let snapshot = motor.snapshot();
        assert!(snapshot.enabled);
        assert_eq!(snapshot.voltage_limit, 5.0);
        assert_eq!(snapshot.velocity_target, 10.0);
        assert_eq!(snapshot.enable_count, 1);
    }

    #[test]
    fn test_mock_sensor_shared_handle() {
        let sensor = MockAngleSensor::new();
        let mut reader = sensor.clone();

        sensor.set_angle(1.5);
        sensor.set_velocity(-0.25);
        assert_eq!(reader.angle().unwrap(), 1.5);
        assert_eq!(reader.velocity().unwrap(), -0.25);
    }
}
