//! 逻辑角度零点
//!
//! 传感器角度减去零点偏移得到逻辑角度。偏移只在一个明确定义的
//! 状态转换处被改写（点击脉冲退出时），其余行为只读。
//!
//! 内部保存的是锚点对 `(anchor_raw, anchor_logical)` 而不是单个偏移量：
//! `logical = (raw - anchor_raw) + anchor_logical`。这样 rebase 之后在锚点处
//! 逻辑角度与期望值按位相等，不受浮点舍入影响。

/// 角度零点参考
///
/// 纯算术，无失败模式。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionReference {
    /// 锚点的原始角度（弧度）
    anchor_raw: f32,
    /// 锚点处的逻辑角度（弧度）
    anchor_logical: f32,
}

impl PositionReference {
    /// 以当前原始角度为逻辑零点创建
    pub fn new(initial_raw: f32) -> Self {
        Self {
            anchor_raw: initial_raw,
            anchor_logical: 0.0,
        }
    }

    /// 当前逻辑角度
    pub fn logical_angle(&self, current_raw: f32) -> f32 {
        (current_raw - self.anchor_raw) + self.anchor_logical
    }

    /// 重设零点，使调用后 `logical_angle(current_raw) == desired_logical` 精确成立
    ///
    /// 用于点击脉冲退出时抵消脉冲造成的净角位移：用户感觉到一次点击，
    /// 但旋钮的逻辑位置不变、不跳变。
    pub fn rebase(&mut self, current_raw: f32, desired_logical: f32) {
        self.anchor_raw = current_raw;
        self.anchor_logical = desired_logical;
    }

    /// 等效零点偏移 `start_angle`（`logical = raw - start_angle`）
    pub fn start_angle(&self) -> f32 {
        self.anchor_raw - self.anchor_logical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initial_logical_angle_is_zero() {
        let reference = PositionReference::new(2.5);
        assert_eq!(reference.logical_angle(2.5), 0.0);
    }

    #[test]
    fn test_logical_angle_tracks_raw() {
        let reference = PositionReference::new(1.0);
        assert_eq!(reference.logical_angle(1.75), 0.75);
        assert_eq!(reference.logical_angle(0.25), -0.75);
    }

    proptest! {
        /// rebase 正确性：任意原始角度序列下，rebase(r, d) 之后
        /// logical_angle(r) 按位等于 d
        #[test]
        fn prop_rebase_exact(
            raws in proptest::collection::vec(-100.0f32..100.0, 1..32),
            desired in -10.0f32..10.0,
        ) {
            let mut reference = PositionReference::new(raws[0]);
            for &raw in &raws {
                reference.rebase(raw, desired);
                prop_assert_eq!(reference.logical_angle(raw), desired);
            }
        }

        /// rebase 之后逻辑角度随原始角度平移，斜率为 1
        #[test]
        fn prop_rebase_preserves_increments(
            raw in -50.0f32..50.0,
            desired in -5.0f32..5.0,
            delta in -1.0f32..1.0,
        ) {
            let mut reference = PositionReference::new(0.0);
            reference.rebase(raw, desired);
            let moved = reference.logical_angle(raw + delta);
            prop_assert!((moved - desired - delta).abs() < 1e-4);
        }
    }
}
