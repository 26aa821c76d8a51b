//! 状态快照与共享上下文
//!
//! 控制线程每周期发布一份 [`RotorState`] 快照，其他线程经
//! `ArcSwap` 无锁读取；控制循环自身不读回快照。

use arc_swap::ArcSwap;
use rotor_core::{ActiveSource, ClickPhase};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 旋钮状态快照
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotorState {
    /// 逻辑角度（弧度）
    pub logical_angle: f32,
    /// 角速度（rad/s）
    pub angular_velocity: f32,
    /// 原始力读数
    pub force: u16,
    /// 点击状态机阶段
    pub click_phase: ClickPhase,
    /// 本周期胜出的行为
    pub source: ActiveSource,
    /// 遥测对端是否已注册
    pub peer_connected: bool,
    /// 已执行的控制周期数
    pub cycles: u64,
}

/// 控制线程与持有者之间的共享上下文
#[derive(Debug)]
pub struct RotorContext {
    /// 最新状态快照
    pub state: ArcSwap<RotorState>,
    /// 运行标志（清零请求循环退出）
    pub is_running: AtomicBool,
}

impl RotorContext {
    pub fn new() -> Self {
        Self {
            state: ArcSwap::from_pointee(RotorState::default()),
            is_running: AtomicBool::new(true),
        }
    }

    /// 读取最新快照（拷贝语义，读方不持有引用）
    pub fn snapshot(&self) -> RotorState {
        **self.state.load()
    }
}

impl Default for RotorContext {
    fn default() -> Self {
        Self::new()
    }
}

// 便于跨线程共享
pub(crate) type SharedContext = Arc<RotorContext>;
