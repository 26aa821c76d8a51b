//! 点击脉冲状态机
//!
//! 力触发、时间盒限定的双相速度脉冲：先正向打出，再反向收回，
//! 然后保持冷却直到手指压力降到复位阈值以下。
//!
//! 脉冲按时间盒而不是按位置盒限定——位置盒会和边界/档位力互相打架。
//! 冷却退出时通过 [`PositionReference::rebase`] 抵消脉冲造成的净角位移，
//! 把「手感」和「逻辑位置」解耦。

use crate::command::{CycleInput, MotionRequest};
use crate::config::KnobConfig;
use crate::reference::PositionReference;
use std::time::Instant;
use tracing::debug;

/// 对外可见的脉冲阶段（用于遥测与状态快照）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickPhase {
    /// 待触发
    #[default]
    Idle,
    /// 正向脉冲
    PulseOut,
    /// 反向脉冲
    PulseBack,
    /// 冷却（等待压力释放）
    Cooldown,
}

/// 内部状态：阶段数据随状态携带，进入时间与触发前角度不可能缺失
#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    PulseOut { since: Instant, pre_click_angle: f32 },
    PulseBack { since: Instant, pre_click_angle: f32 },
    Cooldown { pre_click_angle: f32 },
}

/// 点击脉冲评估器
///
/// 每周期调用一次 [`evaluate`](ClickPulser::evaluate)，纯时间/阈值驱动，
/// 无外部调用、无失败模式。
#[derive(Debug)]
pub struct ClickPulser {
    state: State,
}

impl ClickPulser {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// 当前阶段
    pub fn phase(&self) -> ClickPhase {
        match self.state {
            State::Idle => ClickPhase::Idle,
            State::PulseOut { .. } => ClickPhase::PulseOut,
            State::PulseBack { .. } => ClickPhase::PulseBack,
            State::Cooldown { .. } => ClickPhase::Cooldown,
        }
    }

    /// 脉冲是否正在输出（遥测的 click 标志）
    pub fn is_active(&self) -> bool {
        matches!(self.state, State::PulseOut { .. } | State::PulseBack { .. })
    }

    /// 驱动状态机一个周期
    ///
    /// 仅在 PulseOut/PulseBack 阶段返回运动请求。
    /// Cooldown → Idle 转换时调用 `reference.rebase()`，
    /// 使逻辑角度回到触发前的值（这是全局唯一改写零点的地方）。
    pub fn evaluate(
        &mut self,
        config: &KnobConfig,
        input: &CycleInput,
        reference: &mut PositionReference,
    ) -> Option<MotionRequest> {
        let duration = config.haptic_duration();

        match self.state {
            State::Idle => {
                if input.force > config.force_threshold {
                    let pre_click_angle = reference.logical_angle(input.raw_angle);
                    debug!(
                        force = input.force,
                        pre_click_angle, "click triggered, entering PulseOut"
                    );
                    self.state = State::PulseOut {
                        since: input.now,
                        pre_click_angle,
                    };
                    Some(self.pulse_out(config))
                } else {
                    None
                }
            },
            State::PulseOut {
                since,
                pre_click_angle,
            } => {
                // 时间盒：力的波动不影响脉冲时长
                if input.now.duration_since(since) >= duration {
                    self.state = State::PulseBack {
                        since: input.now,
                        pre_click_angle,
                    };
                    Some(self.pulse_back(config))
                } else {
                    Some(self.pulse_out(config))
                }
            },
            State::PulseBack {
                since,
                pre_click_angle,
            } => {
                if input.now.duration_since(since) >= duration {
                    self.state = State::Cooldown { pre_click_angle };
                    None
                } else {
                    Some(self.pulse_back(config))
                }
            },
            State::Cooldown { pre_click_angle } => {
                // 迟滞：复位阈值低于触发阈值，手指仍在按压时不会重触发
                if input.force < config.force_reset_level {
                    reference.rebase(input.raw_angle, pre_click_angle);
                    debug!(pre_click_angle, "click finished, logical angle rebased");
                    self.state = State::Idle;
                }
                None
            },
        }
    }

    fn pulse_out(&self, config: &KnobConfig) -> MotionRequest {
        MotionRequest {
            target_velocity: config.haptic_velocity,
            voltage_limit: config.click_voltage_limit,
        }
    }

    fn pulse_back(&self, config: &KnobConfig) -> MotionRequest {
        MotionRequest {
            target_velocity: -config.haptic_velocity,
            voltage_limit: config.click_voltage_limit,
        }
    }
}

impl Default for ClickPulser {
    fn default() -> Self {
        Self::new()
    }
}
