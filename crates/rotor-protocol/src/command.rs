//! 入站命令解析
//!
//! 文法刻意收得很紧（无线链路上垃圾包常见，宽松解析会把噪声当命令）：
//!
//! - `HELLO` — 握手/注册
//! - `<X>:<rest>`，`X ∈ {L, S, H}`，分隔符 `:` 固定在偏移 1，总长 ≥ 3
//! - `R` — 单字符复位
//!
//! 其余一律判为无效，由调用方静默丢弃。字母命令解析为带原始参数串的
//! 类型化枚举；除注册发送方之外，核心层不对其赋予任何语义。

use crate::{MAX_DATAGRAM_LEN, ProtocolError};

/// 字母命令指向的子系统
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    /// `L` — 角度边界
    Limits,
    /// `S` — 档位
    Step,
    /// `H` — 点击脉冲
    Haptic,
}

/// 入站命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 握手（仅用于对端注册）
    Hello,
    /// 参数化字母命令，参数串原样保留
    Parameter { subsystem: Subsystem, args: String },
    /// 复位
    Reset,
}

/// 解析一个数据报载荷
///
/// # 错误
///
/// 不匹配文法的载荷返回 [`ProtocolError`]，调用方丢弃即可，
/// 不产生任何状态变化或应答。
pub fn parse_command(payload: &[u8]) -> Result<Command, ProtocolError> {
    if payload.is_empty() {
        return Err(ProtocolError::Empty);
    }
    if payload.len() > MAX_DATAGRAM_LEN {
        return Err(ProtocolError::TooLong { len: payload.len() });
    }
    if !payload.is_ascii() {
        return Err(ProtocolError::NotAscii);
    }

    if payload == b"HELLO" {
        return Ok(Command::Hello);
    }

    if payload.len() >= 3 && payload[1] == b':' {
        let subsystem = match payload[0] {
            b'L' => Some(Subsystem::Limits),
            b'S' => Some(Subsystem::Step),
            b'H' => Some(Subsystem::Haptic),
            _ => None,
        };
        if let Some(subsystem) = subsystem {
            // is_ascii 已校验，from_utf8 不会失败；用 lossy 避免 unwrap
            let args = String::from_utf8_lossy(&payload[2..]).into_owned();
            return Ok(Command::Parameter { subsystem, args });
        }
    }

    if payload == b"R" {
        return Ok(Command::Reset);
    }

    Err(ProtocolError::Unrecognized(
        String::from_utf8_lossy(payload).into_owned(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello() {
        assert_eq!(parse_command(b"HELLO"), Ok(Command::Hello));
    }

    #[test]
    fn test_hello_must_be_exact() {
        assert!(parse_command(b"HELLO!").is_err());
        assert!(parse_command(b"hello").is_err());
        assert!(parse_command(b"HELL").is_err());
    }

    #[test]
    fn test_letter_commands() {
        assert_eq!(
            parse_command(b"L:-4.0:4.0"),
            Ok(Command::Parameter {
                subsystem: Subsystem::Limits,
                args: "-4.0:4.0".to_string(),
            })
        );
        assert_eq!(
            parse_command(b"S:0.52"),
            Ok(Command::Parameter {
                subsystem: Subsystem::Step,
                args: "0.52".to_string(),
            })
        );
        assert_eq!(
            parse_command(b"H:20"),
            Ok(Command::Parameter {
                subsystem: Subsystem::Haptic,
                args: "20".to_string(),
            })
        );
    }

    #[test]
    fn test_letter_command_requires_separator_at_offset_one() {
        // 分隔符位置不对
        assert!(parse_command(b"LS:1").is_err());
        // 长度不足 3
        assert!(parse_command(b"L:").is_err());
        // 未知子系统字母
        assert!(parse_command(b"X:1").is_err());
    }

    #[test]
    fn test_reset_is_single_character() {
        assert_eq!(parse_command(b"R"), Ok(Command::Reset));
        // 原固件只看首字节；规范文法收紧为单字符
        assert!(parse_command(b"RESET").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_command(b"").is_err());
        assert!(parse_command(b"\xff\xfe\x00").is_err());
        assert!(parse_command(b"T:1.0:2.0:0").is_err());
        assert!(parse_command("角".as_bytes()).is_err());
        assert!(parse_command(&[b'A'; 65]).is_err());
    }
}
