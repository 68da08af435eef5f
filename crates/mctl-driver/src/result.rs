//! 结果归一化
//!
//! 把一次交换的所有可能结果映射到统一的 [`CommandResult`]：
//!
//! | 结果 | 映射 |
//! |------|------|
//! | 传输失败 | `Device { status }`（历史状态码 -2/-3/-4） |
//! | 应答消息体为空或超长 | `Decode` |
//! | 帧头畸形、操作码不符 | `Decode` |
//! | 状态码 < 0 | `Device { status }`，不解码载荷 |
//! | 状态码 >= 0 | 按命令解码载荷，失败为 `Decode` |

use crate::error::CommandError;
use mctl_protocol::{Command, ResponseFrame};
use mctl_transport::TransportError;

/// 成功结果：非负状态码 + 类型化载荷
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completed<T> {
    pub status: i32,
    pub value: T,
}

impl<T> Completed<T> {
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Completed<U> {
        Completed {
            status: self.status,
            value: f(self.value),
        }
    }
}

/// 命令执行结果
pub type CommandResult<T> = Result<Completed<T>, CommandError>;

/// 归一化一次交换的结果
pub fn normalize<C: Command>(
    command: &C,
    response: Result<Vec<u8>, TransportError>,
) -> CommandResult<C::Output> {
    let body = response?;
    let frame = ResponseFrame::from_bytes(&body)?;
    frame.expect_opcode(C::OPCODE)?;

    if frame.status < 0 {
        return Err(CommandError::Device {
            status: frame.status,
        });
    }

    let value = command.decode(frame.status, frame.payload())?;
    Ok(Completed {
        status: frame.status,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mctl_protocol::{
        BatteryConvention, BatteryHealth, CheckRtcBattery, GetFpgaVersion, GetMcuVersion, Opcode,
        ProtocolError,
    };

    fn ok_body(opcode: Opcode, status: i32, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        Ok(ResponseFrame::new(opcode, status, payload).to_bytes())
    }

    #[test]
    fn test_success_keeps_status() {
        let result = normalize(&GetMcuVersion, ok_body(Opcode::GetMcuVersion, 3, &[1, 2, 3, 4]));
        let completed = result.unwrap();
        assert_eq!(completed.status, 3);
        assert_eq!(completed.value.to_string(), "1.2.3.4");
    }

    #[test]
    fn test_negative_status_skips_payload() {
        // 载荷畸形也不影响：负状态码优先
        let result = normalize(&GetMcuVersion, ok_body(Opcode::GetMcuVersion, -5, &[1]));
        assert_eq!(result, Err(CommandError::Device { status: -5 }));
    }

    #[test]
    fn test_battery_device_error_regardless_of_payload() {
        for convention in [BatteryConvention::PayloadNonZero, BatteryConvention::StatusPositive] {
            let cmd = CheckRtcBattery { convention };
            let result = normalize(&cmd, ok_body(Opcode::CheckRtcBattery, -1, &[1]));
            assert_eq!(result, Err(CommandError::Device { status: -1 }));
        }

        let cmd = CheckRtcBattery::default();
        let result = normalize(&cmd, ok_body(Opcode::CheckRtcBattery, 0, &[1]));
        assert_eq!(result.unwrap().value, BatteryHealth::Good);
    }

    #[test]
    fn test_opcode_mismatch_is_decode_error() {
        let result = normalize(&GetMcuVersion, ok_body(Opcode::GetFpgaVersion, 0, &[1, 2, 3, 4]));
        assert!(matches!(
            result,
            Err(CommandError::Decode(ProtocolError::UnexpectedOpcode { .. }))
        ));
    }

    #[test]
    fn test_short_header_is_decode_error() {
        let result = normalize(&GetFpgaVersion, Ok(vec![0x02, 0x00]));
        assert!(matches!(
            result,
            Err(CommandError::Decode(ProtocolError::TooShort { .. }))
        ));
    }

    #[test]
    fn test_truncated_payload_is_decode_error() {
        let result = normalize(&GetFpgaVersion, ok_body(Opcode::GetFpgaVersion, 0, &[1, 2]));
        assert!(matches!(result, Err(CommandError::Decode(_))));
    }

    #[test]
    fn test_transport_failure_is_device_error() {
        let err = TransportError::Receive(std::io::Error::from(std::io::ErrorKind::TimedOut));
        let result = normalize(&GetMcuVersion, Err(err));
        assert_eq!(result, Err(CommandError::Device { status: -3 }));
    }

    #[test]
    fn test_completed_map() {
        let c = Completed { status: 1, value: 2u8 };
        assert_eq!(c.map(u32::from), Completed { status: 1, value: 2u32 });
        assert_eq!(c.into_value(), 2);
    }
}
