//! Rotor 构造器
//!
//! 启动顺序：校验配置 → 初始读角度（确定逻辑零点，失败即中止启动）
//! → 绑定遥测链路 → 启动控制线程。所有会失败的步骤都在线程启动前
//! 完成，控制循环本身只剩运行期故障。

use crate::error::DriverError;
use crate::hal::{AngleSensor, ForcePad, MotorOutput};
use crate::pipeline::{LoopConfig, control_loop};
use crate::rotor::Rotor;
use crate::state::RotorContext;
use rotor_core::{KnobConfig, KnobEngine};
use rotor_link::{LinkConfig, TelemetryLink};
use std::sync::Arc;
use tracing::info;

/// Rotor 构造器
///
/// # Example
///
/// ```no_run
/// use rotor_driver::{Rotor, mock};
///
/// # fn main() -> Result<(), rotor_driver::DriverError> {
/// let rotor = Rotor::builder()
///     .build(
///         mock::MockMotor::new(),
///         mock::MockAngleSensor::new(),
///         mock::MockForcePad::new(),
///     )?;
/// println!("logical angle: {}", rotor.state().logical_angle);
/// rotor.shutdown()?;
/// # Ok(())
/// # }
/// ```
pub struct RotorBuilder {
    knob_config: KnobConfig,
    loop_config: LoopConfig,
    link_config: Option<LinkConfig>,
}

impl RotorBuilder {
    pub fn new() -> Self {
        Self {
            knob_config: KnobConfig::default(),
            loop_config: LoopConfig::default(),
            link_config: Some(LinkConfig::default()),
        }
    }

    /// 设置旋钮调参配置
    pub fn knob_config(mut self, config: KnobConfig) -> Self {
        self.knob_config = config;
        self
    }

    /// 设置循环配置
    pub fn loop_config(mut self, config: LoopConfig) -> Self {
        self.loop_config = config;
        self
    }

    /// 设置遥测链路配置
    pub fn link_config(mut self, config: LinkConfig) -> Self {
        self.link_config = Some(config);
        self
    }

    /// 不启用遥测链路（纯本地运行）
    pub fn without_link(mut self) -> Self {
        self.link_config = None;
        self
    }

    /// 构建并启动控制线程
    ///
    /// # 错误
    ///
    /// - [`DriverError::Config`]: 配置校验失败
    /// - [`DriverError::Hal`]: 初始角度读取失败（传感器在启动期就必须可用）
    /// - [`DriverError::Link`]: 遥测端口绑定失败
    pub fn build<M, A, F>(self, motor: M, mut sensor: A, force_pad: F) -> Result<Rotor, DriverError>
    where
        M: MotorOutput + Send + 'static,
        A: AngleSensor + Send + 'static,
        F: ForcePad + Send + 'static,
    {
        // 初始角度即逻辑零点
        let initial_raw = sensor.angle()?;
        let engine = KnobEngine::new(self.knob_config, initial_raw)?;
        info!(initial_raw, "knob engine initialized");

        let link = match self.link_config {
            Some(config) => Some(TelemetryLink::bind(config)?),
            None => None,
        };
        let link_addr = match link.as_ref() {
            Some(link) => Some(link.local_addr()?),
            None => None,
        };

        let ctx = Arc::new(RotorContext::new());
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);

        let ctx_clone = Arc::clone(&ctx);
        let loop_config = self.loop_config;
        let thread = std::thread::Builder::new()
            .name("rotor-control".to_string())
            .spawn(move || {
                control_loop(
                    motor,
                    sensor,
                    force_pad,
                    engine,
                    link,
                    loop_config,
                    ctx_clone,
                    shutdown_rx,
                )
            })
            .map_err(DriverError::ThreadSpawn)?;

        Ok(Rotor::from_parts(ctx, shutdown_tx, thread, link_addr))
    }
}

impl Default for RotorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{FaultyAngleSensor, MockAngleSensor, MockForcePad, MockMotor};

    #[test]
    fn test_build_rejects_invalid_config() {
        let result = RotorBuilder::new()
            .knob_config(KnobConfig {
                motor_direction: 2.0,
                ..KnobConfig::default()
            })
            .without_link()
            .build(MockMotor::new(), MockAngleSensor::new(), MockForcePad::new());
        assert!(matches!(result, Err(DriverError::Config(_))));
    }

    #[test]
    fn test_build_aborts_on_sensor_fault_at_startup() {
        let result = RotorBuilder::new().without_link().build(
            MockMotor::new(),
            FaultyAngleSensor,
            MockForcePad::new(),
        );
        assert!(matches!(result, Err(DriverError::Hal(_))));
    }
}
