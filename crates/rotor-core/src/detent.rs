//! 档位吸附
//!
//! 把逻辑角度量化到最近的档位角，并施加朝向档位的比例拉力。
//! 档位被钳制在距离两侧边界 `detent_margin` 的安全区内，
//! 边界附近由回弹行为接管（本评估器被抑制）。
//!
//! 啮合/脱离采用不对称阈值：距离超过 `detent_engage` 才开始吸附，
//! 低于 `detent_disengage` 才停止，旋钮停在档位附近时不会微抖。

use crate::command::MotionRequest;
use crate::config::KnobConfig;
use tracing::trace;

/// 档位吸附评估器
#[derive(Debug, Default)]
pub struct DetentQuantizer {
    in_scroll_move: bool,
}

impl DetentQuantizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否正在吸附
    pub fn is_engaged(&self) -> bool {
        self.in_scroll_move
    }

    /// 清除啮合状态
    ///
    /// 边界回弹激活期间调用：抑制不只是跳过求值，而是整个回到死区，
    /// 边界释放后从干净状态重新啮合。
    pub fn reset(&mut self) {
        self.in_scroll_move = false;
    }

    /// 最近的合法档位角
    ///
    /// 四舍五入到档位网格后，用 floor/ceil 钳回安全区
    /// （`bound ∓ detent_margin`）内最后一个档位。档距不整除边界范围时，
    /// 靠墙的最后一档与安全边的距离可能大于一个档距，这是可接受的。
    pub fn step_target(&self, config: &KnobConfig, logical: f32) -> f32 {
        let step = config.step_angle;
        let mut target = (logical / step).round() * step;

        let safe_upper = config.upper_bound - config.detent_margin;
        let safe_lower = config.lower_bound + config.detent_margin;
        if target > safe_upper {
            target = (safe_upper / step).floor() * step;
        }
        if target < safe_lower {
            target = (safe_lower / step).ceil() * step;
        }

        target
    }

    /// 驱动啮合判定一个周期
    pub fn evaluate(&mut self, config: &KnobConfig, logical: f32) -> Option<MotionRequest> {
        let diff = self.step_target(config, logical) - logical;

        if !self.in_scroll_move && diff.abs() > config.detent_engage {
            trace!(logical, diff, "detent engaged");
            self.in_scroll_move = true;
        } else if self.in_scroll_move && diff.abs() < config.detent_disengage {
            trace!(logical, "detent released");
            self.in_scroll_move = false;
        }

        if self.in_scroll_move {
            Some(MotionRequest {
                target_velocity: diff * config.step_stiffness * config.motor_direction,
                voltage_limit: config.detent_voltage_limit,
            })
        } else {
            None
        }
    }
}
