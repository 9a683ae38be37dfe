//! Short command encoding.
//!
//! Equalizer and microphone settings are written as fixed size commands:
//!
//! ```text
//! [0x01] [0x00] [opcode] [payload length] [payload...] [zero padding]
//! ```

use bytes::{BufMut, Bytes, BytesMut};

/// Size of every short command.
pub const COMMAND_SIZE: usize = 16;

/// Header bytes preceding the payload.
const HEADER_SIZE: usize = 4;

/// Maximum payload length fitting into a single command.
pub const MAX_PAYLOAD: usize = COMMAND_SIZE - HEADER_SIZE;

/// Vendor marker at the start of every command.
const MARKER: u8 = 0x01;

// Equalizer band registers.
pub const CMD_REG_EQL_80: u8 = 0x40;
pub const CMD_REG_EQL_280: u8 = 0x41;
pub const CMD_REG_EQL_1K: u8 = 0x42;
pub const CMD_REG_EQL_3_5K: u8 = 0x43;
pub const CMD_REG_EQL_13K: u8 = 0x44;

/// Select equalizer calibration page.
pub const CMD_EQL_SELECT: u8 = 0x46;
/// Write one calibration byte.
pub const CMD_EQL_DATA: u8 = 0x47;
pub const CMD_UNKNOWN_49: u8 = 0x49;
pub const CMD_UNKNOWN_4A: u8 = 0x4a;

/// Microphone automatic optimization.
pub const CMD_MICROPHONE: u8 = 0xf0;

/// Encode a short command.
///
/// # Panics
///
/// Panics if the payload is longer than [`MAX_PAYLOAD`].
pub fn encode(opcode: u8, payload: &[u8]) -> Bytes {
    assert!(
        payload.len() <= MAX_PAYLOAD,
        "command payload too long: {} > {}",
        payload.len(),
        MAX_PAYLOAD
    );

    let mut buf = BytesMut::with_capacity(COMMAND_SIZE);

    buf.put_u8(MARKER);

    // Reserved.
    buf.put_u8(0x00);

    buf.put_u8(opcode);
    buf.put_u8(payload.len() as u8);
    buf.put_slice(payload);

    // Padding.
    buf.put_bytes(0, COMMAND_SIZE - buf.len());

    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_padding() {
        let command = encode(0x83, &[0xde, 0xad, 0xff]);

        assert_eq!(command.len(), COMMAND_SIZE);
        assert_eq!(&command[..7], &[0x01, 0x00, 0x83, 0x03, 0xde, 0xad, 0xff]);
        assert!(command[7..].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn every_payload_length() {
        let payload: Vec<u8> = (0xa0..0xa0 + MAX_PAYLOAD as u8).collect();

        for len in 0..=MAX_PAYLOAD {
            let command = encode(0x47, &payload[..len]);

            assert_eq!(command.len(), COMMAND_SIZE);
            assert_eq!(&command[..4], &[0x01, 0x00, 0x47, len as u8]);
            assert_eq!(&command[4..4 + len], &payload[..len]);
            assert!(command[4 + len..].iter().all(|&byte| byte == 0));
        }
    }

    #[test]
    fn empty_payload() {
        let command = encode(0x4a, &[]);
        assert_eq!(&command[..], &[0x01, 0x00, 0x4a, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "command payload too long")]
    fn oversized_payload() {
        encode(0x47, &[0; MAX_PAYLOAD + 1]);
    }
}
