//! 驱动层错误类型定义

use crate::hal::HalError;
use rotor_core::ConfigError;
use rotor_link::LinkError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 硬件层错误（传感器/电机故障，循环终止）
    #[error("HAL error: {0}")]
    Hal(#[from] HalError),

    /// 遥测链路错误（绑定阶段）
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// 配置校验失败
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 控制线程启动失败
    #[error("Failed to spawn control thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    /// 控制线程异常退出（panic）
    #[error("Control thread panicked")]
    ThreadPanicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DriverError::Hal(HalError::Sensor("SPI timeout".to_string()));
        assert!(format!("{}", error).contains("SPI timeout"));

        let error = DriverError::Config(ConfigError::VoltageOrdering);
        assert!(format!("{}", error).contains("voltage limits"));
    }

    #[test]
    fn test_from_hal_error() {
        let hal_error = HalError::Motor("gate driver".to_string());
        let error: DriverError = hal_error.into();
        assert!(matches!(error, DriverError::Hal(HalError::Motor(_))));
    }
}
