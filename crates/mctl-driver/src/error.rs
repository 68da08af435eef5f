//! 驱动层错误类型定义

use mctl_protocol::{Opcode, ProtocolError};
use mctl_transport::TransportError;
use thiserror::Error;

/// 命令执行失败的统一分类
///
/// 所有失败都原样返回给直接调用方，执行器不重试也不吞掉错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// 无法建立连接（与设备负状态码空间无关）
    #[error("Hardware control endpoint unavailable")]
    Unavailable,

    /// 设备或传输报告的负状态码
    #[error("Device error (status {status})")]
    Device { status: i32 },

    /// 响应形状不符或本地校验失败
    #[error("Decode error: {0}")]
    Decode(#[from] ProtocolError),

    /// 设备命令集未实现该操作
    #[error("Operation not implemented: {0}")]
    Unimplemented(Opcode),
}

impl CommandError {
    /// 设备负状态码（仅 `Device`）
    pub fn status(&self) -> Option<i32> {
        match self {
            CommandError::Device { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for CommandError {
    /// 应答形状错误归为 `Decode`，其余传输失败沿用历史负状态码
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::MalformedResponse(shape) => CommandError::Decode(shape),
            other => CommandError::Device {
                status: other.status(),
            },
        }
    }
}

/// 执行器构建错误
#[derive(Error, Debug)]
pub enum DriverError {
    /// 端点路径无效
    #[error("Invalid endpoint: {0:?}")]
    InvalidEndpoint(String),

    /// 无效配置
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
