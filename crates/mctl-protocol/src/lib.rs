//! # MCTL Protocol
//!
//! MCU 硬件控制端点的命令/响应编解码（无 IO 依赖）
//!
//! ## 模块
//!
//! - `ids`: 操作码定义
//! - `types`: 值类型（颜色、版本号、阈值配置、上电原因等）
//! - `timestamp`: RTC 固定宽度时间戳
//! - `frame`: 请求/响应帧（命令边界）
//! - `command`: 每个操作的编码/解码规则
//! - `operation`: 动态分发用的 `Operation` / `Reply`
//!
//! ## 字节序
//!
//! 多字节字段统一使用大端字节序（与 MCU 文档一致）。

pub mod command;
pub mod frame;
pub mod ids;
pub mod operation;
pub mod timestamp;
pub mod types;

// 重新导出常用类型
pub use command::*;
pub use frame::{MAX_PAYLOAD_LEN, Payload, RESPONSE_HEADER_LEN, RequestFrame, ResponseFrame};
pub use ids::Opcode;
pub use operation::{Operation, Reply};
pub use timestamp::{RTC_STRING_SIZE, RTC_TEXT_LEN, RtcTimestamp};
pub use types::*;

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid payload length for {opcode:?}: expected {expected}, got {actual}")]
    InvalidLength {
        opcode: Opcode,
        expected: usize,
        actual: usize,
    },

    #[error("Frame too short: need at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("Payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Response too long: {len} bytes (max {max})")]
    ResponseTooLong { len: usize, max: usize },

    #[error("Invalid opcode: 0x{0:02X}")]
    InvalidOpcode(u8),

    #[error("Unexpected response opcode: expected {expected:?}, got {actual:?}")]
    UnexpectedOpcode { expected: Opcode, actual: Opcode },

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: &'static str, value: u32 },

    #[error("Malformed RTC timestamp {text:?}: {reason}")]
    InvalidTimestamp { text: String, reason: &'static str },

    #[error("RTC timestamp field is not NUL-terminated")]
    Unterminated,
}

/// 校验定长载荷并取出固定数组
///
/// 长度必须完全相等：过短会导致越界读取，过长说明设备响应与约定不符。
pub(crate) fn exact<const N: usize>(opcode: Opcode, payload: &[u8]) -> Result<[u8; N], ProtocolError> {
    payload.try_into().map_err(|_| ProtocolError::InvalidLength {
        opcode,
        expected: N,
        actual: payload.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_accepts_matching_length() {
        let bytes = exact::<4>(Opcode::GetMcuVersion, &[1, 2, 3, 4]).unwrap();
        assert_eq!(bytes, [1, 2, 3, 4]);
    }

    #[test]
    fn test_exact_rejects_truncated() {
        let err = exact::<4>(Opcode::GetMcuVersion, &[1, 2]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::InvalidLength {
                opcode: Opcode::GetMcuVersion,
                expected: 4,
                actual: 2,
            }
        );
    }

    #[test]
    fn test_exact_rejects_overlong() {
        let err = exact::<2>(Opcode::GetRtcCalibrationRegisters, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidLength { actual: 3, .. }));
    }

    #[test]
    fn test_error_display() {
        let msg = ProtocolError::InvalidOpcode(0x7F).to_string();
        assert_eq!(msg, "Invalid opcode: 0x7F");

        let msg = ProtocolError::Unterminated.to_string();
        assert!(msg.contains("NUL"));
    }
}
