//! 出站遥测报文
//!
//! 规范格式：`T:<angle>:<velocity>:<click>`，角度与角速度保留 3 位小数，
//! click 为 0/1。两端必须使用同一格式；历史上出现过的逗号分隔变体
//! （`angle,velocity`）不在文法内，解码时直接拒绝。

use crate::ProtocolError;

/// 周期性状态报文
///
/// 对端注册后按固定节拍发送，尽力而为、允许丢包乱序。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReport {
    /// 逻辑角度（弧度）
    pub logical_angle: f32,
    /// 角速度（rad/s）
    pub angular_velocity: f32,
    /// 点击脉冲是否正在输出
    pub click_active: bool,
}

impl TelemetryReport {
    /// 编码为线上文本
    pub fn encode(&self) -> String {
        format!(
            "T:{:.3}:{:.3}:{}",
            self.logical_angle,
            self.angular_velocity,
            u8::from(self.click_active)
        )
    }

    /// 从线上文本解码（对端/测试侧使用）
    ///
    /// # 错误
    ///
    /// 字段数不对、前缀不是 `T`、数值解析失败或 click 不是 0/1 时
    /// 返回 [`ProtocolError`]。
    pub fn decode(payload: &str) -> Result<Self, ProtocolError> {
        let mut fields = payload.split(':');

        if fields.next() != Some("T") {
            return Err(ProtocolError::Unrecognized(payload.to_string()));
        }

        let angle = Self::parse_f32(&mut fields, "angle")?;
        let velocity = Self::parse_f32(&mut fields, "velocity")?;

        let click_active = match fields.next() {
            Some("0") => false,
            Some("1") => true,
            other => {
                return Err(ProtocolError::InvalidField {
                    field: "click",
                    value: other.unwrap_or_default().to_string(),
                });
            },
        };

        if fields.next().is_some() {
            return Err(ProtocolError::Unrecognized(payload.to_string()));
        }

        Ok(Self {
            logical_angle: angle,
            angular_velocity: velocity,
            click_active,
        })
    }

    fn parse_f32<'a>(
        fields: &mut impl Iterator<Item = &'a str>,
        field: &'static str,
    ) -> Result<f32, ProtocolError> {
        let raw = fields.next().ok_or(ProtocolError::InvalidField {
            field,
            value: String::new(),
        })?;
        raw.parse().map_err(|_| ProtocolError::InvalidField {
            field,
            value: raw.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_canonical_format() {
        let report = TelemetryReport {
            logical_angle: 1.25,
            angular_velocity: -0.5,
            click_active: true,
        };
        assert_eq!(report.encode(), "T:1.250:-0.500:1");

        let report = TelemetryReport {
            logical_angle: 0.0,
            angular_velocity: 0.0,
            click_active: false,
        };
        assert_eq!(report.encode(), "T:0.000:0.000:0");
    }

    #[test]
    fn test_decode_roundtrip() {
        let report = TelemetryReport {
            logical_angle: -3.142,
            angular_velocity: 7.5,
            click_active: true,
        };
        let decoded = TelemetryReport::decode(&report.encode()).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn test_decode_rejects_comma_variant() {
        // 旧的生产循环用过逗号分隔格式，规范化后不再接受
        assert!(TelemetryReport::decode("1.234,0.500").is_err());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(TelemetryReport::decode("T:1.0:2.0").is_err());
        assert!(TelemetryReport::decode("T:1.0:2.0:2").is_err());
        assert!(TelemetryReport::decode("T:abc:2.0:0").is_err());
        assert!(TelemetryReport::decode("T:1.0:2.0:0:extra").is_err());
        assert!(TelemetryReport::decode("X:1.0:2.0:0").is_err());
    }
}
