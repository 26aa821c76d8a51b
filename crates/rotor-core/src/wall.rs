//! 边界回弹
//!
//! 上下边界各一个独立的单侧检测器，带迟滞带 H：越过边界进入恢复态，
//! 只有回到 `bound ∓ H` 严格内侧才退出，避免在边界处来回抖动。
//!
//! 恢复期间的目标位置是边界再往安全区内拉 H（不是边界本身，
//! 否则会恰好停在边缘反复进出）。比例速度的幅值下限是
//! `wall_min_velocity`，静摩擦不会把回弹力矩吃成零。

use crate::command::MotionRequest;
use crate::config::KnobConfig;
use tracing::debug;

/// 边界回弹评估器
#[derive(Debug, Default)]
pub struct BoundaryEnforcer {
    recovering_upper: bool,
    recovering_lower: bool,
}

impl BoundaryEnforcer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 任一侧是否处于恢复态
    pub fn is_recovering(&self) -> bool {
        self.recovering_upper || self.recovering_lower
    }

    /// 上边界是否处于恢复态
    pub fn recovering_upper(&self) -> bool {
        self.recovering_upper
    }

    /// 下边界是否处于恢复态
    pub fn recovering_lower(&self) -> bool {
        self.recovering_lower
    }

    /// 驱动两侧检测器一个周期
    ///
    /// 两侧的迟滞带在合法配置下不重叠（`KnobConfig::validate` 保证），
    /// 同一周期最多一侧处于恢复态；这里按上边界优先取请求。
    pub fn evaluate(&mut self, config: &KnobConfig, logical: f32) -> Option<MotionRequest> {
        let h = config.wall_hysteresis;

        if !self.recovering_upper && logical > config.upper_bound {
            debug!(logical, bound = config.upper_bound, "upper wall engaged");
            self.recovering_upper = true;
        } else if self.recovering_upper && logical < config.upper_bound - h {
            debug!(logical, "upper wall released");
            self.recovering_upper = false;
        }

        if !self.recovering_lower && logical < config.lower_bound {
            debug!(logical, bound = config.lower_bound, "lower wall engaged");
            self.recovering_lower = true;
        } else if self.recovering_lower && logical > config.lower_bound + h {
            debug!(logical, "lower wall released");
            self.recovering_lower = false;
        }

        if self.recovering_upper {
            // 目标拉到 bound - H 的内侧，误差为负方向
            Some(self.spring(config, (config.upper_bound - h) - logical, -1.0))
        } else if self.recovering_lower {
            Some(self.spring(config, (config.lower_bound + h) - logical, 1.0))
        } else {
            None
        }
    }

    /// 比例回弹速度，幅值不低于 `wall_min_velocity`
    ///
    /// `fallback_error_sign` 是误差恰好为零时的推回方向（上边界为负、
    /// 下边界为正），保证恢复态下永远不会输出零速度的激活命令。
    fn spring(&self, config: &KnobConfig, error: f32, fallback_error_sign: f32) -> MotionRequest {
        let mut velocity = error * config.wall_stiffness * config.motor_direction;
        if velocity.abs() < config.wall_min_velocity {
            let sign = if velocity != 0.0 {
                velocity.signum()
            } else {
                fallback_error_sign * config.motor_direction
            };
            velocity = config.wall_min_velocity * sign;
        }

        MotionRequest {
            target_velocity: velocity,
            voltage_limit: config.wall_voltage_limit,
        }
    }
}
