//! 请求/响应帧
//!
//! 命令边界上的消息体（不含传输层的长度前缀）：
//!
//! ```text
//! 请求: [opcode: u8][payload ...]
//! 响应: [opcode: u8][status: i32 BE][payload ...]
//! ```

use crate::{Opcode, ProtocolError};
use smallvec::SmallVec;

/// 单个载荷的最大长度
///
/// 最长的载荷是 RTC 时间戳字段（23 字节），留出余量。
pub const MAX_PAYLOAD_LEN: usize = 32;

/// 响应头长度（opcode + status）
pub const RESPONSE_HEADER_LEN: usize = 5;

/// 载荷缓冲区（栈上分配）
pub type Payload = SmallVec<[u8; MAX_PAYLOAD_LEN]>;

/// 请求帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFrame {
    pub opcode: Opcode,
    payload: Payload,
}

impl RequestFrame {
    pub fn new(opcode: Opcode, payload: &[u8]) -> Self {
        Self {
            opcode,
            payload: Payload::from_slice(payload),
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// 编码为消息体
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.payload.len());
        out.push(self.opcode.into());
        out.extend_from_slice(&self.payload);
        out
    }

    /// 从消息体解码（设备侧/测试替身使用）
    pub fn from_bytes(body: &[u8]) -> Result<Self, ProtocolError> {
        let (&raw, payload) = body.split_first().ok_or(ProtocolError::TooShort {
            expected: 1,
            actual: 0,
        })?;
        let opcode = Opcode::try_from(raw).map_err(|_| ProtocolError::InvalidOpcode(raw))?;
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        Ok(Self::new(opcode, payload))
    }
}

/// 响应帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    pub opcode: Opcode,
    /// 设备状态码：非负为成功，负数为设备/传输错误
    pub status: i32,
    payload: Payload,
}

impl ResponseFrame {
    pub fn new(opcode: Opcode, status: i32, payload: &[u8]) -> Self {
        Self {
            opcode,
            status,
            payload: Payload::from_slice(payload),
        }
    }

    /// 成功响应（状态码 0）
    pub fn ok(opcode: Opcode, payload: &[u8]) -> Self {
        Self::new(opcode, 0, payload)
    }

    /// 错误响应（无载荷）
    pub fn error(opcode: Opcode, status: i32) -> Self {
        Self::new(opcode, status, &[])
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(RESPONSE_HEADER_LEN + self.payload.len());
        out.push(self.opcode.into());
        out.extend_from_slice(&self.status.to_be_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    /// 从消息体解码
    ///
    /// 只解析帧头，载荷按原样保留，由对应命令按字段宽度校验。
    pub fn from_bytes(body: &[u8]) -> Result<Self, ProtocolError> {
        if body.len() < RESPONSE_HEADER_LEN {
            return Err(ProtocolError::TooShort {
                expected: RESPONSE_HEADER_LEN,
                actual: body.len(),
            });
        }

        let opcode = Opcode::try_from(body[0]).map_err(|_| ProtocolError::InvalidOpcode(body[0]))?;
        let status = i32::from_be_bytes([body[1], body[2], body[3], body[4]]);
        let payload = &body[RESPONSE_HEADER_LEN..];
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }

        Ok(Self::new(opcode, status, payload))
    }

    /// 校验回显的操作码
    pub fn expect_opcode(&self, expected: Opcode) -> Result<(), ProtocolError> {
        if self.opcode != expected {
            return Err(ProtocolError::UnexpectedOpcode {
                expected,
                actual: self.opcode,
            });
        }
        Ok(())
    }
}
