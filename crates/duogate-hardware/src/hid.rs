//! HID keyboard report decoding.
//!
//! USB barcode scanners usually enumerate as keyboards: every character is
//! sent as an 8-byte boot-protocol report whose third byte carries the key
//! usage ID, followed by an all-zero release report.
//!
//! ```text
//! [modifiers, reserved, key1, key2, key3, key4, key5, key6]
//!                       ^^^^
//!                       usage ID (0x1E = '1' ... 0x27 = '0')
//! ```

/// Offset of the first key usage in a boot keyboard report.
pub const REPORT_KEY_INDEX: usize = 2;

/// Usage ID of the `1` key; `2`..`9` follow contiguously.
const USAGE_DIGIT_ONE: u8 = 0x1E;

/// Usage ID of the `9` key.
const USAGE_DIGIT_NINE: u8 = 0x26;

/// Usage ID of the `0` key, which comes after `9`.
const USAGE_DIGIT_ZERO: u8 = 0x27;

/// Usage ID of the Enter key, which terminates most scanner payloads.
const USAGE_ENTER: u8 = 0x28;

/// Map a keyboard usage ID to the ASCII byte it types.
///
/// Only digits and Enter are mapped; card codes are numeric.
///
/// # Examples
///
/// ```
/// use duogate_hardware::hid::usage_to_ascii;
///
/// assert_eq!(usage_to_ascii(0x1E), Some(b'1'));
/// assert_eq!(usage_to_ascii(0x27), Some(b'0'));
/// assert_eq!(usage_to_ascii(0x00), None);
/// ```
#[must_use]
pub fn usage_to_ascii(usage: u8) -> Option<u8> {
    match usage {
        USAGE_DIGIT_ONE..=USAGE_DIGIT_NINE => Some(b'1' + (usage - USAGE_DIGIT_ONE)),
        USAGE_DIGIT_ZERO => Some(b'0'),
        USAGE_ENTER => Some(b'\r'),
        _ => None,
    }
}

/// Decode one keyboard report into the byte it types, if any.
///
/// Release reports (no key pressed) and short reports yield `None`.
#[must_use]
pub fn decode_report(report: &[u8]) -> Option<u8> {
    report
        .get(REPORT_KEY_INDEX)
        .copied()
        .and_then(usage_to_ascii)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0x1E, b'1')]
    #[case(0x22, b'5')]
    #[case(0x26, b'9')]
    #[case(0x27, b'0')]
    #[case(0x28, b'\r')]
    fn test_usage_to_ascii(#[case] usage: u8, #[case] expected: u8) {
        assert_eq!(usage_to_ascii(usage), Some(expected));
    }

    #[rstest]
    #[case(0x00)]
    #[case(0x04)] // 'a'
    #[case(0x1D)]
    #[case(0x29)] // Escape
    fn test_unmapped_usages(#[case] usage: u8) {
        assert_eq!(usage_to_ascii(usage), None);
    }

    #[test]
    fn test_decode_press_and_release() {
        let press = [0x00, 0x00, 0x21, 0x00, 0x00, 0x00, 0x00, 0x00];
        let release = [0u8; 8];

        assert_eq!(decode_report(&press), Some(b'4'));
        assert_eq!(decode_report(&release), None);
    }

    #[test]
    fn test_decode_short_report() {
        assert_eq!(decode_report(&[0x00, 0x00]), None);
    }
}
