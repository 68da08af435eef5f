//! RTC 固定宽度时间戳
//!
//! 线上格式为 `YYYY-MM-DD HH:MM:SS.ss` 加一个 NUL 结尾，共 23 字节。
//! 宽度和小数位数都是协议的一部分：设备按固定偏移读取各字段。
//!
//! 本层只校验形状（长度、分隔符、数字位），日期是否真实存在由设备判定。

use crate::ProtocolError;
use std::fmt;
use std::str::FromStr;

/// 线上字段宽度（含 NUL 结尾）
pub const RTC_STRING_SIZE: usize = 23;

/// 可见字符数
pub const RTC_TEXT_LEN: usize = RTC_STRING_SIZE - 1;

/// 分隔符位置及期望字符
const SEPARATORS: [(usize, u8); 6] = [
    (4, b'-'),
    (7, b'-'),
    (10, b' '),
    (13, b':'),
    (16, b':'),
    (19, b'.'),
];

/// RTC 时间戳
///
/// ```rust
/// use mctl_protocol::RtcTimestamp;
///
/// let ts: RtcTimestamp = "2016-03-29 19:09:06.58".parse().unwrap();
/// assert_eq!(ts.year, 2016);
/// assert_eq!(ts.fraction, 58);
/// assert_eq!(ts.to_string(), "2016-03-29 19:09:06.58");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RtcTimestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// 秒的小数部分（两位）
    pub fraction: u8,
}

impl RtcTimestamp {
    /// 编码为 23 字节线上字段
    pub fn to_wire(&self) -> [u8; RTC_STRING_SIZE] {
        let mut out = [0u8; RTC_STRING_SIZE];
        let text = self.to_string();
        // Display 保证 22 个 ASCII 字符（字段均已限定位数）
        let len = text.len().min(RTC_TEXT_LEN);
        out[..len].copy_from_slice(&text.as_bytes()[..len]);
        out
    }

    /// 从 23 字节线上字段解码
    ///
    /// 字段必须恰好 23 字节，且在宽度内以 NUL 结尾；NUL 之前的文本必须是完整格式。
    pub fn from_wire(field: &[u8]) -> Result<Self, ProtocolError> {
        if field.len() != RTC_STRING_SIZE {
            return Err(ProtocolError::InvalidTimestamp {
                text: String::from_utf8_lossy(field).into_owned(),
                reason: "field width must be 23 bytes",
            });
        }

        let nul = field.iter().position(|&b| b == 0).ok_or(ProtocolError::Unterminated)?;
        let text = std::str::from_utf8(&field[..nul]).map_err(|_| ProtocolError::InvalidTimestamp {
            text: String::from_utf8_lossy(&field[..nul]).into_owned(),
            reason: "not ASCII",
        })?;
        text.parse()
    }

    fn invalid(text: &str, reason: &'static str) -> ProtocolError {
        ProtocolError::InvalidTimestamp {
            text: text.to_string(),
            reason,
        }
    }
}

impl fmt::Display for RtcTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:02}",
            self.year % 10000,
            self.month % 100,
            self.day % 100,
            self.hour % 100,
            self.minute % 100,
            self.second % 100,
            self.fraction % 100
        )
    }
}

impl FromStr for RtcTimestamp {
    type Err = ProtocolError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let bytes = text.as_bytes();
        if bytes.len() != RTC_TEXT_LEN {
            return Err(Self::invalid(text, "expected 22 characters"));
        }

        for (pos, sep) in SEPARATORS {
            if bytes[pos] != sep {
                return Err(Self::invalid(text, "missing separator"));
            }
        }

        let is_separator = |i: usize| SEPARATORS.iter().any(|(pos, _)| *pos == i);
        if bytes
            .iter()
            .enumerate()
            .any(|(i, b)| !is_separator(i) && !b.is_ascii_digit())
        {
            return Err(Self::invalid(text, "non-digit in numeric field"));
        }

        // 以上校验保证每个字段都是纯数字
        let num = |range: std::ops::Range<usize>| -> u16 {
            bytes[range].iter().fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
        };

        Ok(Self {
            year: num(0..4),
            month: num(5..7) as u8,
            day: num(8..10) as u8,
            hour: num(11..13) as u8,
            minute: num(14..16) as u8,
            second: num(17..19) as u8,
            fraction: num(20..22) as u8,
        })
    }
}
