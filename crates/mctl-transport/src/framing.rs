//! 流式套接字上的消息分帧
//!
//! ```text
//! [len: u16 BE][body: len bytes]
//! ```

use crate::TransportError;
use mctl_protocol::{MAX_PAYLOAD_LEN, ProtocolError, RESPONSE_HEADER_LEN};
use std::io::{Read, Write};

/// 消息体最大长度（最长的响应：帧头 + 最大载荷）
pub const MAX_FRAME_LEN: usize = RESPONSE_HEADER_LEN + MAX_PAYLOAD_LEN;

/// 写入一条带长度前缀的消息
pub fn write_frame<W: Write>(writer: &mut W, body: &[u8]) -> Result<(), TransportError> {
    if body.len() > MAX_FRAME_LEN {
        return Err(TransportError::FrameTooLarge {
            len: body.len(),
            max: MAX_FRAME_LEN,
        });
    }

    // 长度前缀和消息体合并为一次写入
    let mut buf = Vec::with_capacity(2 + body.len());
    buf.extend_from_slice(&(body.len() as u16).to_be_bytes());
    buf.extend_from_slice(body);
    writer.write_all(&buf).map_err(TransportError::Send)?;
    writer.flush().map_err(TransportError::Send)
}

/// 读取一条带长度前缀的消息
///
/// 空消息体或超长消息体是对端的应答形状错误（`MalformedResponse`），
/// 不是 I/O 失败。
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>, TransportError> {
    let mut len_buf = [0u8; 2];
    reader.read_exact(&mut len_buf).map_err(TransportError::Receive)?;
    let len = u16::from_be_bytes(len_buf) as usize;

    if len == 0 {
        return Err(TransportError::MalformedResponse(ProtocolError::TooShort {
            expected: RESPONSE_HEADER_LEN,
            actual: 0,
        }));
    }
    if len > MAX_FRAME_LEN {
        return Err(TransportError::MalformedResponse(ProtocolError::ResponseTooLong {
            len,
            max: MAX_FRAME_LEN,
        }));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).map_err(TransportError::Receive)?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_frame_layout() {
        let mut out = Vec::new();
        write_frame(&mut out, &[0x05, 0x02]).unwrap();
        assert_eq!(out, vec![0x00, 0x02, 0x05, 0x02]);

        let body = read_frame(&mut Cursor::new(out)).unwrap();
        assert_eq!(body, vec![0x05, 0x02]);
    }

    #[test]
    fn test_write_rejects_oversized() {
        let mut out = Vec::new();
        let body = vec![0u8; MAX_FRAME_LEN + 1];
        assert!(matches!(
            write_frame(&mut out, &body),
            Err(TransportError::FrameTooLarge { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_read_truncated_body() {
        let data = vec![0x00, 0x05, 0x01, 0x00];
        let err = read_frame(&mut Cursor::new(data)).unwrap_err();
        assert!(matches!(err, TransportError::Receive(_)));
    }

    #[test]
    fn test_read_empty_body() {
        let err = read_frame(&mut Cursor::new(vec![0x00, 0x00])).unwrap_err();
        assert!(matches!(
            err,
            TransportError::MalformedResponse(ProtocolError::TooShort { actual: 0, .. })
        ));
    }

    #[test]
    fn test_read_oversized_length() {
        let err = read_frame(&mut Cursor::new(vec![0xFF, 0xFF])).unwrap_err();
        assert!(matches!(
            err,
            TransportError::MalformedResponse(ProtocolError::ResponseTooLong { len: 0xFFFF, .. })
        ));
    }
}
