//! LED color programming.
//!
//! Unlike the other settings, the color is written with a captured sequence
//! of 37 byte reports which do not follow the short command layout. After
//! the sequence, the color is persisted to device memory.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use bytes::{Bytes, BytesMut};

use crate::error::HeadsetError;
use crate::transport::{Channel, Packet};

/// Size of every report in the color sequence.
pub const REPORT_SIZE: usize = 37;

/// Size of the report preceding the save request.
pub const PRE_SAVE_SIZE: usize = 39;

/// Index of the report carrying the color.
pub const COLOR_REPORT: usize = 3;

/// Offset of the RGB bytes inside the color report.
pub const COLOR_OFFSET: usize = 7;

/// Pad a captured report with zeroes.
const fn report<const N: usize>(prefix: &[u8]) -> [u8; N] {
    let mut report = [0; N];
    let mut i = 0;
    while i < prefix.len() {
        report[i] = prefix[i];
        i += 1;
    }
    report
}

/// Captured color sequence.
///
/// The color report was captured while setting `#deadff`.
#[rustfmt::skip]
const SEQUENCE: [[u8; REPORT_SIZE]; 11] = [
    report(&[0x06, 0x81, 0x43, 0x01, 0x22]),
    report(&[0x06, 0x8a, 0x42, 0x00, 0x20, 0x40]),
    report(&[0x06, 0x81, 0x43, 0x01, 0x23]),
    report(&[0x06, 0x8a, 0x42, 0x00, 0x20, 0x41, 0x00, 0xde, 0xea, 0xff, 0xff, 0x52, 0x00, 0xc8]),
    report(&[0x06, 0x81, 0x43, 0x01, 0x23]),
    report(&[0x06, 0x8a, 0x42, 0x00, 0x20, 0x41, 0x08, 0x01, 0x01]),
    report(&[0x06, 0x81, 0x43, 0x01, 0x23]),
    report(&[0x06, 0x8a, 0x42, 0x00, 0x20, 0x60, 0x01]),
    report(&[0x06, 0x81, 0x43, 0x01, 0x23]),
    report(&[0x06, 0x8a, 0x42, 0x00, 0x20, 0x40]),
    report(&[0x06, 0x81, 0x43, 0x01, 0x23]),
];

static PRE_SAVE: [u8; PRE_SAVE_SIZE] = report(&[0x04, 0x40, 0x01, 0x11, 0x54, 0x9b]);

static SAVE: [u8; 2] = [0x21, 0x01];

/// RGB color.
#[derive(PartialEq, Eq, Default, Debug, Copy, Clone)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Reports required to apply and persist this color, in transmission order.
    pub fn packets(&self) -> Vec<Packet> {
        let mut packets = Vec::with_capacity(SEQUENCE.len() + 2);

        for (i, template) in SEQUENCE.iter().enumerate() {
            let mut report = BytesMut::from(&template[..]);

            // Replace the captured color.
            if i == COLOR_REPORT {
                report[COLOR_OFFSET..COLOR_OFFSET + 3].copy_from_slice(&[self.r, self.g, self.b]);
            }

            packets.push(Packet::command(report.freeze()));
        }

        // Persist to device memory.
        packets.push(Packet::with_channel(Bytes::from_static(&PRE_SAVE), Channel::PreSave));
        packets.push(Packet::with_channel(Bytes::from_static(&SAVE), Channel::Save));

        packets
    }
}

impl FromStr for Rgb {
    type Err = HeadsetError;

    /// Parse a color in the `RRGGBB` format, with optional `0x` or `#` prefix.
    fn from_str(s: &str) -> Result<Rgb, HeadsetError> {
        let invalid = || HeadsetError::InvalidArgument(format!("invalid color: {:?}", s));

        let chars = s.strip_prefix("0x").or_else(|| s.strip_prefix('#')).unwrap_or(s);
        if chars.len() != 6 || !chars.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let component = |i: usize| u8::from_str_radix(&chars[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb::new(component(0)?, component(2)?, component(4)?))
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
