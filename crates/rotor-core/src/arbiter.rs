//! 固定优先级仲裁
//!
//! 每周期从三个行为的运动请求中选出恰好一个（或空闲），
//! 先匹配者胜：点击 > 边界 > 档位 > 空闲。
//!
//! 这个全序是正确性的核心：用户触发的点击手感不会被边界/档位力掩盖，
//! 边界安全又始终压过装饰性的档位吸附。

use crate::command::{ActiveSource, MotionRequest, MotorCommand};

/// 按固定优先级合并行为请求
///
/// 返回电机命令和胜出的行为标签。没有任何请求时返回空闲命令，
/// 电压限制回落到 `idle_voltage_limit` 以减少静止发热。
pub fn arbitrate(
    click: Option<MotionRequest>,
    wall: Option<MotionRequest>,
    detent: Option<MotionRequest>,
    idle_voltage_limit: f32,
) -> (MotorCommand, ActiveSource) {
    let (request, source) = if let Some(request) = click {
        (request, ActiveSource::Click)
    } else if let Some(request) = wall {
        (request, ActiveSource::Wall)
    } else if let Some(request) = detent {
        (request, ActiveSource::Detent)
    } else {
        return (MotorCommand::idle(idle_voltage_limit), ActiveSource::Idle);
    };

    (
        MotorCommand {
            active: true,
            target_velocity: request.target_velocity,
            voltage_limit: request.voltage_limit,
        },
        source,
    )
}
