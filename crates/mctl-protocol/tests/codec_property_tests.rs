//! 编解码的属性测试
//!
//! 使用 proptest 验证颜色打包、GPIO 掩码和时间戳格式。

use mctl_protocol::{
    Command, FirmwareVersion, GetGpioDebugState, GetLedStatus, GetMcuVersion, Opcode, ProtocolError,
    ResponseFrame, RgbColor, RtcTimestamp, SetGpioDebugState, SetLedValue, mask_gpio_pin,
    mask_gpio_value,
};
use proptest::prelude::*;

proptest! {
    /// 颜色打包/解包在 24 位范围内往返
    #[test]
    fn rgb24_roundtrip(rgb in 0u32..=0xFF_FFFF) {
        let color = RgbColor::from_rgb24(rgb);
        prop_assert_eq!(color.to_rgb24(), rgb);
        prop_assert_eq!(u32::from(RgbColor::from(rgb)), rgb);
    }

    /// 设置 LED 时载荷里的通道与打包值一致
    #[test]
    fn set_led_payload_matches_channels(led in 0u8..=2, brightness: u8, rgb in 0u32..=0xFF_FFFF) {
        let payload = SetLedValue::new(led, brightness, rgb).payload();
        prop_assert_eq!(payload.as_slice(), &[
            led,
            brightness,
            (rgb >> 16) as u8,
            (rgb >> 8) as u8,
            rgb as u8,
        ]);
    }

    /// GPIO 掩码幂等
    #[test]
    fn gpio_mask_idempotent(pin: u32, value: u32) {
        let p = mask_gpio_pin(pin);
        prop_assert_eq!(mask_gpio_pin(u32::from(p)), p);
        let v = mask_gpio_value(value);
        prop_assert_eq!(mask_gpio_value(u32::from(v)), v);
        prop_assert!(v <= 1);
    }

    /// 构造命令时已经完成掩码
    #[test]
    fn gpio_commands_masked(pin: u32, value: u32) {
        let set = SetGpioDebugState::new(pin, value);
        prop_assert_eq!(set.pin, (pin & 0xFFFF) as u16);
        prop_assert_eq!(set.high, value & 1 == 1);
        prop_assert_eq!(GetGpioDebugState::new(pin).pin, (pin & 0xFFFF) as u16);
    }

    /// 版本字符串可以按点号拆回原始字节
    #[test]
    fn version_text_parses_back(bytes: [u8; 4]) {
        let text = FirmwareVersion(bytes).to_string();
        let parts: Vec<u8> = text
            .split('.')
            .map(|p| u8::from_str_radix(p, 16).unwrap())
            .collect();
        prop_assert_eq!(parts, bytes.to_vec());
        prop_assert_eq!(text.to_uppercase(), text);
    }

    /// 合法时间戳文本往返
    #[test]
    fn timestamp_text_roundtrip(
        year in 0u16..=9999,
        month in 0u8..=99,
        day in 0u8..=99,
        hour in 0u8..=99,
        minute in 0u8..=99,
        second in 0u8..=99,
        fraction in 0u8..=99,
    ) {
        let ts = RtcTimestamp { year, month, day, hour, minute, second, fraction };
        let text = ts.to_string();
        prop_assert_eq!(text.len(), 22);
        prop_assert_eq!(text.parse::<RtcTimestamp>().unwrap(), ts);
        prop_assert_eq!(RtcTimestamp::from_wire(&ts.to_wire()).unwrap(), ts);
    }

    /// 长度不是 22 的文本一律拒绝
    #[test]
    fn timestamp_wrong_length_rejected(text in "[0-9: .-]{0,40}") {
        prop_assume!(text.len() != 22);
        prop_assert!(text.parse::<RtcTimestamp>().is_err());
    }

    /// 任意响应体解码不会 panic
    #[test]
    fn response_decode_never_panics(body in proptest::collection::vec(any::<u8>(), 0..64)) {
        if let Ok(frame) = ResponseFrame::from_bytes(&body) {
            let _ = GetMcuVersion.decode(frame.status, frame.payload());
            let _ = GetLedStatus { led: 0 }.decode(frame.status, frame.payload());
        }
    }

    /// 截断的 LED 状态响应是解码错误
    #[test]
    fn truncated_led_status_rejected(len in 0usize..4) {
        let payload = vec![0xAA; len];
        let err = GetLedStatus { led: 1 }.decode(0, &payload).unwrap_err();
        prop_assert_eq!(err, ProtocolError::InvalidLength {
            opcode: Opcode::GetLedStatus,
            expected: 4,
            actual: len,
        });
    }
}

#[test]
fn version_scenarios() {
    assert_eq!(FirmwareVersion([0x01, 0x02, 0x03, 0x04]).to_string(), "1.2.3.4");
    assert_eq!(FirmwareVersion([0xAB, 0x00, 0x01, 0xFF]).to_string(), "AB.0.1.FF");
}

#[test]
fn sample_timestamp_from_device_docs() {
    let ts: RtcTimestamp = "2016-03-29 19:09:06.58".parse().unwrap();
    let wire = ts.to_wire();
    assert_eq!(wire.len(), 23);
    assert_eq!(wire[22], 0);
}
