//! # MCTL Transport
//!
//! 硬件控制端点的传输抽象
//!
//! 传输层只负责"建立连接 → 交换一条消息 → 断开"，不理解消息内容。
//! 消息体的编解码由 `mctl-protocol` 完成，会话编排由 `mctl-driver` 完成。
//!
//! ## 后端
//!
//! - [`UnixSocketTransport`]: 本地 Unix 域套接字（每条消息带 u16 大端长度前缀）
//! - `mock::MockTransport`: 录制型假传输（需要 `mock` feature）

pub mod framing;
pub mod unix;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use framing::{MAX_FRAME_LEN, read_frame, write_frame};
pub use unix::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, UnixConnection, UnixSocketTransport};

use mctl_protocol::ProtocolError;
use thiserror::Error;

// ============================================================================
// 历史状态码
// ============================================================================

/// 无法连接端点
pub const STATUS_CONNECT_FAILED: i32 = -1;
/// 发送失败
pub const STATUS_TX_FAILED: i32 = -2;
/// 接收失败
pub const STATUS_RX_FAILED: i32 = -3;
/// 响应形状不符
pub const STATUS_INVALID_RESPONSE: i32 = -4;

/// 传输层错误
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Send failed: {0}")]
    Send(#[source] std::io::Error),

    #[error("Receive failed: {0}")]
    Receive(#[source] std::io::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 对端应答了，但应答帧形状不符（空消息体、超长消息体）
    #[error("Malformed response: {0}")]
    MalformedResponse(#[source] ProtocolError),

    /// 待发送的请求超过最大帧长（仅写路径）
    #[error("Frame too large: {len} bytes (max {max})")]
    FrameTooLarge { len: usize, max: usize },
}

impl TransportError {
    /// 映射到设备负状态码空间
    pub fn status(&self) -> i32 {
        match self {
            TransportError::Send(_) | TransportError::FrameTooLarge { .. } => STATUS_TX_FAILED,
            TransportError::Receive(_) => STATUS_RX_FAILED,
            TransportError::InvalidResponse(_) | TransportError::MalformedResponse(_) => {
                STATUS_INVALID_RESPONSE
            },
        }
    }
}

/// 传输句柄
///
/// 每次操作调用一次 `connect`，结束时调用一次 `disconnect`。
/// `disconnect` 按值消费连接，断开后的连接无法再被使用。
pub trait Transport: Send + Sync {
    type Connection: Connection;

    /// 打开连接；端点不可用时返回 `None`
    fn connect(&self) -> Option<Self::Connection>;

    /// 关闭连接
    fn disconnect(&self, connection: Self::Connection);
}

/// 一个已打开的连接
pub trait Connection {
    /// 发送一条请求消息体，接收一条响应消息体
    fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError>;
}
