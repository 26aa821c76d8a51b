//! 旋钮调参配置
//!
//! 默认值来自实机调试：力阈值 500/100（ADC 计数）、脉冲 20ms / 10 rad/s、
//! 空闲电压限制 1.0V（静止时不发热）、点击电压限制 5.0V（全力脉冲）。

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// 配置校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 力迟滞对非法（复位阈值必须低于触发阈值）
    #[error("force_reset_level ({reset}) must be below force_threshold ({threshold})")]
    ForceHysteresis { threshold: u16, reset: u16 },

    /// 角度边界非法
    #[error("lower_bound ({lower}) must be below upper_bound ({upper})")]
    InvertedBounds { lower: f32, upper: f32 },

    /// 迟滞带过宽，上下边界的恢复带重叠
    #[error("wall hysteresis bands overlap: range {range} <= 2 * hysteresis {hysteresis}")]
    OverlappingWallBands { range: f32, hysteresis: f32 },

    /// 档位迟滞对非法（脱离阈值必须小于啮合阈值）
    #[error("detent_disengage ({disengage}) must be below detent_engage ({engage})")]
    DetentHysteresis { engage: f32, disengage: f32 },

    /// 电机方向符号非法（只能是 +1.0 或 -1.0）
    #[error("motor_direction must be +1.0 or -1.0, got {0}")]
    InvalidDirection(f32),

    /// 数值参数必须为正
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    /// 电压限制必须满足 idle <= detent <= wall <= click
    #[error("voltage limits must satisfy idle <= detent <= wall <= click")]
    VoltageOrdering,
}

/// 旋钮控制配置
///
/// 所有行为评估器共享的调参集合。通过 `validate()` 在启动时拒绝非法配置，
/// 控制循环内不做运行时断言。
///
/// # Example
///
/// ```
/// use rotor_core::KnobConfig;
///
/// let config = KnobConfig::default();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnobConfig {
    /// 点击触发力阈值（原始 ADC 计数）
    pub force_threshold: u16,
    /// 点击复位力阈值（必须低于触发阈值，迟滞防重触发）
    pub force_reset_level: u16,
    /// 脉冲单相时长（毫秒）
    pub haptic_duration_ms: u64,
    /// 脉冲速度（rad/s）
    pub haptic_velocity: f32,

    /// 角度下边界（逻辑角度，弧度）
    pub lower_bound: f32,
    /// 角度上边界（逻辑角度，弧度）
    pub upper_bound: f32,
    /// 边界迟滞带宽度（弧度）
    pub wall_hysteresis: f32,
    /// 边界回弹刚度（rad/s per rad）
    pub wall_stiffness: f32,
    /// 回弹最小速度幅值（防止静摩擦下停转，rad/s）
    pub wall_min_velocity: f32,

    /// 档位间距（弧度）
    pub step_angle: f32,
    /// 档位啮合阈值（弧度）
    pub detent_engage: f32,
    /// 档位脱离阈值（必须小于啮合阈值，弧度）
    pub detent_disengage: f32,
    /// 档位距边界的安全裕度（弧度）
    pub detent_margin: f32,
    /// 档位吸附刚度（rad/s per rad）
    pub step_stiffness: f32,

    /// 电机方向符号（+1.0 或 -1.0）
    ///
    /// 位置误差换算为速度命令时的负号取决于硬件接线方向，
    /// 在调试阶段确认一次，而不是在代码里假定。
    pub motor_direction: f32,

    /// 空闲电压限制（V）
    pub idle_voltage_limit: f32,
    /// 档位吸附电压限制（V）
    pub detent_voltage_limit: f32,
    /// 边界回弹电压限制（V）
    pub wall_voltage_limit: f32,
    /// 点击脉冲电压限制（V）
    pub click_voltage_limit: f32,
}

impl Default for KnobConfig {
    fn default() -> Self {
        Self {
            force_threshold: 500,
            force_reset_level: 100,
            haptic_duration_ms: 20,
            haptic_velocity: 10.0,

            lower_bound: -4.0,
            upper_bound: 4.0,
            wall_hysteresis: 0.01,
            wall_stiffness: 20.0,
            wall_min_velocity: 1.0,

            step_angle: core::f32::consts::PI / 6.0,
            detent_engage: 0.08,
            detent_disengage: 0.02,
            detent_margin: 0.1,
            step_stiffness: 15.0,

            motor_direction: -1.0,

            idle_voltage_limit: 1.0,
            detent_voltage_limit: 2.0,
            wall_voltage_limit: 3.0,
            click_voltage_limit: 5.0,
        }
    }
}

impl KnobConfig {
    /// 校验配置
    ///
    /// # 错误
    ///
    /// 拒绝：倒置的边界、非正的刚度/速度/间距、
    /// 迟滞对不满足「脱离 < 啮合」、重叠的恢复带、非法的方向符号、
    /// 不满足 idle <= detent <= wall <= click 的电压限制。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.force_reset_level >= self.force_threshold {
            return Err(ConfigError::ForceHysteresis {
                threshold: self.force_threshold,
                reset: self.force_reset_level,
            });
        }
        if self.lower_bound >= self.upper_bound {
            return Err(ConfigError::InvertedBounds {
                lower: self.lower_bound,
                upper: self.upper_bound,
            });
        }

        for (field, value) in [
            ("haptic_velocity", self.haptic_velocity),
            ("wall_hysteresis", self.wall_hysteresis),
            ("wall_stiffness", self.wall_stiffness),
            ("wall_min_velocity", self.wall_min_velocity),
            ("step_angle", self.step_angle),
            ("detent_engage", self.detent_engage),
            ("detent_disengage", self.detent_disengage),
            ("detent_margin", self.detent_margin),
            ("step_stiffness", self.step_stiffness),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let range = self.upper_bound - self.lower_bound;
        if range <= 2.0 * self.wall_hysteresis {
            return Err(ConfigError::OverlappingWallBands {
                range,
                hysteresis: self.wall_hysteresis,
            });
        }

        if self.detent_disengage >= self.detent_engage {
            return Err(ConfigError::DetentHysteresis {
                engage: self.detent_engage,
                disengage: self.detent_disengage,
            });
        }

        if self.motor_direction != 1.0 && self.motor_direction != -1.0 {
            return Err(ConfigError::InvalidDirection(self.motor_direction));
        }

        if !(self.idle_voltage_limit <= self.detent_voltage_limit
            && self.detent_voltage_limit <= self.wall_voltage_limit
            && self.wall_voltage_limit <= self.click_voltage_limit)
        {
            return Err(ConfigError::VoltageOrdering);
        }

        Ok(())
    }

    /// 脉冲单相时长
    pub fn haptic_duration(&self) -> Duration {
        Duration::from_millis(self.haptic_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(KnobConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_force_hysteresis_violation() {
        let config = KnobConfig {
            force_reset_level: 600,
            ..KnobConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ForceHysteresis { .. })
        ));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let config = KnobConfig {
            lower_bound: 2.0,
            upper_bound: -2.0,
            ..KnobConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn test_rejects_detent_hysteresis_violation() {
        let config = KnobConfig {
            detent_engage: 0.02,
            detent_disengage: 0.08,
            ..KnobConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DetentHysteresis { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_direction() {
        let config = KnobConfig {
            motor_direction: 0.5,
            ..KnobConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDirection(0.5))
        );
    }

    #[test]
    fn test_rejects_overlapping_wall_bands() {
        let config = KnobConfig {
            lower_bound: -0.01,
            upper_bound: 0.01,
            ..KnobConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OverlappingWallBands { .. })
        ));
    }

    #[test]
    fn test_rejects_voltage_ordering_violation() {
        let config = KnobConfig {
            click_voltage_limit: 0.5,
            ..KnobConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::VoltageOrdering));
    }

    #[test]
    fn test_partial_toml_profile_fills_defaults() {
        // serde(default)：调参文件只需覆盖需要改动的字段
        let profile: KnobConfig =
            toml::from_str("step_angle = 0.52\nupper_bound = 4.0\n").unwrap();
        assert_eq!(profile.step_angle, 0.52);
        assert_eq!(profile.force_threshold, 500);
    }
}
