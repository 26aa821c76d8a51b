//! 周期编排
//!
//! `KnobEngine` 把三个行为评估器和仲裁器组合成驱动层的唯一入口：
//! 一个传感器快照进，一条电机命令出。自身不做任何 IO，
//! 驱动层负责喂入快照并把命令写到电机抽象。

use crate::arbiter::arbitrate;
use crate::click::{ClickPhase, ClickPulser};
use crate::command::{ActiveSource, CycleInput, MotorCommand};
use crate::config::{ConfigError, KnobConfig};
use crate::detent::DetentQuantizer;
use crate::reference::PositionReference;
use crate::wall::BoundaryEnforcer;

/// 一个周期的仲裁结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleOutput {
    /// 发给电机抽象的命令
    pub command: MotorCommand,
    /// 胜出的行为
    pub source: ActiveSource,
    /// 本周期的逻辑角度（点击 rebase 之后的值，遥测用）
    pub logical_angle: f32,
    /// 点击状态机当前阶段
    pub click_phase: ClickPhase,
    /// 点击脉冲是否正在输出（遥测的 click 标志）
    pub click_active: bool,
}

/// 控制仲裁引擎
///
/// 持有全部行为状态与逻辑零点。共享可变状态只有零点偏移：
/// 所有行为经 [`PositionReference`] 读取，只有点击脉冲在
/// Cooldown → Idle 转换处写入（见 `click` 模块）。
#[derive(Debug)]
pub struct KnobEngine {
    config: KnobConfig,
    reference: PositionReference,
    click: ClickPulser,
    wall: BoundaryEnforcer,
    detent: DetentQuantizer,
}

impl KnobEngine {
    /// 创建引擎，以 `initial_raw_angle` 为逻辑零点
    ///
    /// # 错误
    ///
    /// 配置非法时返回 [`ConfigError`]（启动期失败，循环内不再校验）。
    pub fn new(config: KnobConfig, initial_raw_angle: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            reference: PositionReference::new(initial_raw_angle),
            click: ClickPulser::new(),
            wall: BoundaryEnforcer::new(),
            detent: DetentQuantizer::new(),
        })
    }

    /// 当前配置
    pub fn config(&self) -> &KnobConfig {
        &self.config
    }

    /// 当前逻辑角度
    pub fn logical_angle(&self, raw_angle: f32) -> f32 {
        self.reference.logical_angle(raw_angle)
    }

    /// 运行一个控制周期
    ///
    /// 点击评估器先行（它可能在本周期 rebase 零点），随后以更新后的
    /// 逻辑角度评估边界与档位；档位仅在边界不活跃时求值，
    /// 且被抑制期间啮合状态清零。
    pub fn step(&mut self, input: &CycleInput) -> CycleOutput {
        let click = self.click.evaluate(&self.config, input, &mut self.reference);
        let logical = self.reference.logical_angle(input.raw_angle);

        let wall = self.wall.evaluate(&self.config, logical);
        let detent = if wall.is_some() {
            self.detent.reset();
            None
        } else {
            self.detent.evaluate(&self.config, logical)
        };

        let (command, source) = arbitrate(click, wall, detent, self.config.idle_voltage_limit);

        CycleOutput {
            command,
            source,
            logical_angle: logical,
            click_phase: self.click.phase(),
            click_active: self.click.is_active(),
        }
    }
}
