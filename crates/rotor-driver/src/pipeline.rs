//! 控制循环
//!
//! 协作式固定周期执行：一次迭代读取全部传感器、运行仲裁引擎、
//! 下发一条电机命令，然后（同一线程）服务遥测链路，最后用
//! `spin_sleep` 睡掉周期余量（亚毫秒精度，std sleep 的 1-2ms
//! 抖动对 1kHz 循环不可接受）。
//!
//! 循环内没有阻塞调用；传感器/电机故障沿 `?` 冒泡并终止循环，
//! 退出路径上尽力把电机断电。

use crate::error::DriverError;
use crate::hal::{AngleSensor, ForcePad, MotorOutput};
use crate::state::{RotorState, SharedContext};
use crossbeam_channel::{Receiver, TryRecvError};
use rotor_core::{CycleInput, KnobEngine};
use rotor_link::TelemetryLink;
use rotor_protocol::TelemetryReport;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// 循环配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    /// 控制周期（微秒）
    pub cycle_period_us: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            cycle_period_us: 1000, // 1kHz
        }
    }
}

impl LoopConfig {
    fn cycle_period(&self) -> Duration {
        Duration::from_micros(self.cycle_period_us)
    }
}

/// 循环持有的全部可变状态
///
/// 单线程独占，无锁；`was_active` 记录上一周期电机是否被驱动，
/// 只在状态翻转时调用 enable/disable。
struct LoopState<M, A, F> {
    motor: M,
    sensor: A,
    force_pad: F,
    engine: KnobEngine,
    link: Option<TelemetryLink>,
    ctx: SharedContext,
    was_active: bool,
    cycles: u64,
}

impl<M: MotorOutput, A: AngleSensor, F: ForcePad> LoopState<M, A, F> {
    /// 执行一个控制周期
    ///
    /// 传感器在周期开始处读取一次，周期内复用同一快照。
    fn cycle(&mut self, now: Instant) -> Result<(), DriverError> {
        let raw_angle = self.sensor.angle()?;
        let angular_velocity = self.sensor.velocity()?;
        let force = self.force_pad.read()?;

        let input = CycleInput {
            raw_angle,
            angular_velocity,
            force,
            now,
        };
        let output = self.engine.step(&input);

        if output.command.active {
            self.motor.set_voltage_limit(output.command.voltage_limit)?;
            if !self.was_active {
                debug!(source = ?output.source, "behavior engaged, enabling motor");
                self.motor.enable()?;
                self.was_active = true;
            }
            self.motor.set_velocity_target(output.command.target_velocity)?;
        } else if self.was_active {
            // active == false 时速度目标无意义：电机必须 coast
            debug!("all behaviors idle, motor coasting");
            self.motor.disable()?;
            self.motor.set_voltage_limit(output.command.voltage_limit)?;
            self.was_active = false;
        }

        if let Some(link) = self.link.as_mut() {
            if let Some(command) = link.poll() {
                // 字母命令只用于对端注册，不赋予参数语义
                debug!(?command, "inbound command");
            }
            link.publish(
                &TelemetryReport {
                    logical_angle: output.logical_angle,
                    angular_velocity,
                    click_active: output.click_active,
                },
                now,
            );
        }

        self.cycles += 1;
        self.ctx.state.store(Arc::new(RotorState {
            logical_angle: output.logical_angle,
            angular_velocity,
            force,
            click_phase: output.click_phase,
            source: output.source,
            peer_connected: self.link.as_ref().is_some_and(|l| l.peer().is_some()),
            cycles: self.cycles,
        }));

        Ok(())
    }
}

/// 控制循环入口（在专用线程上运行，见 `Rotor`）
///
/// 退出条件：shutdown 信号、`ctx.is_running` 清零、通道断开
/// （持有端被 drop），或任一硬件调用失败。
pub fn control_loop<M, A, F>(
    motor: M,
    sensor: A,
    force_pad: F,
    engine: KnobEngine,
    link: Option<TelemetryLink>,
    config: LoopConfig,
    ctx: SharedContext,
    shutdown_rx: Receiver<()>,
) -> Result<(), DriverError>
where
    M: MotorOutput,
    A: AngleSensor,
    F: ForcePad,
{
    promote_thread_priority();

    let period = config.cycle_period();
    let idle_voltage = engine.config().idle_voltage_limit;
    let mut state = LoopState {
        motor,
        sensor,
        force_pad,
        engine,
        link,
        ctx: Arc::clone(&ctx),
        was_active: false,
        cycles: 0,
    };

    // 启动即进入安全状态：电机 coast、空闲电压限制
    state.motor.set_voltage_limit(idle_voltage)?;
    state.motor.disable()?;
    info!(period_us = config.cycle_period_us, "control loop started");

    let result = loop {
        if !ctx.is_running.load(Ordering::Relaxed) {
            break Ok(());
        }
        match shutdown_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break Ok(()),
            Err(TryRecvError::Empty) => {},
        }

        let cycle_start = Instant::now();
        if let Err(e) = state.cycle(cycle_start) {
            error!("control cycle failed: {}", e);
            break Err(e);
        }

        let elapsed = cycle_start.elapsed();
        if elapsed < period {
            spin_sleep::sleep(period - elapsed);
        }
    };

    // 退出路径上尽力断电
    if let Err(e) = state.motor.disable() {
        warn!("failed to disable motor on shutdown: {}", e);
    }
    ctx.is_running.store(false, Ordering::Relaxed);
    info!(cycles = state.cycles, "control loop stopped");

    result
}

#[cfg(feature = "realtime")]
fn promote_thread_priority() {
    use thread_priority::{ThreadPriority, set_current_thread_priority};

    match set_current_thread_priority(ThreadPriority::Max) {
        Ok(()) => info!("control thread priority raised"),
        Err(e) => warn!("failed to raise control thread priority: {:?}", e),
    }
}

#[cfg(not(feature = "realtime"))]
fn promote_thread_priority() {}
