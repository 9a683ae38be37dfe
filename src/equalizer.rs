//! Five band equalizer.

use std::convert::TryFrom;
use std::fmt::{self, Display, Formatter};

use crate::command::{self, *};
use crate::error::{HeadsetError, HeadsetResult};
use crate::transport::Packet;

/// Register value for 0 dB.
pub const ZERO_DB: u8 = 0x18;

/// Highest register value, +12 dB.
pub const MAX_VALUE: u8 = 0x30;

/// Supported gain in dB, in both directions.
pub const MAX_GAIN: f32 = 12.;

/// Calibration page selected before and after every band update.
const CALIBRATION_PAGE: u8 = 0x0d;

/// Number of calibration bytes streamed for every band update.
pub const CALIBRATION_LEN: usize = 12;

/// Calibration bytes for each band, indexed by `[band][row]`.
///
/// Rows are used for values below, at and above 0 dB respectively. The bytes
/// were captured from the vendor software and have no known derivation.
#[rustfmt::skip]
const CALIBRATION: [[[u8; CALIBRATION_LEN]; 3]; 5] = [
    // 80 Hz.
    [
        [0x3f, 0xa4, 0x76, 0xd0, 0xe0, 0x5a, 0xa5, 0x0d, 0x00, 0x2d, 0x52, 0x86],
        [0x30, 0x4d, 0xc8, 0x89, 0xe9, 0xb2, 0x7e, 0x76, 0x04, 0xd9, 0x3f, 0x3b],
        [0x3f, 0xcf, 0x01, 0x46, 0xe0, 0x30, 0x1d, 0x01, 0x00, 0x18, 0x0e, 0x80],
    ],
    // 280 Hz.
    [
        [0x3e, 0x5d, 0xf4, 0xfa, 0xe1, 0x97, 0xe2, 0xcc, 0x00, 0xcb, 0xf1, 0x66],
        [0x30, 0x4d, 0xc8, 0x89, 0xe9, 0xb2, 0x7e, 0x76, 0x04, 0xd9, 0x3f, 0x3b],
        [0x3f, 0x2c, 0xbd, 0x6e, 0xe0, 0xc9, 0x40, 0x1f, 0x00, 0x64, 0xa0, 0x0f],
    ],
    // 1 kHz.
    [
        [0x3a, 0xcf, 0xbd, 0x1e, 0xe4, 0xab, 0x5e, 0xfb, 0x02, 0x55, 0xaf, 0x7d],
        [0x3f, 0xa4, 0x76, 0xd0, 0xe0, 0x5a, 0xa5, 0x0d, 0x00, 0x2d, 0x52, 0x86],
        [0x3d, 0x4d, 0x31, 0x77, 0xe2, 0x25, 0x7e, 0x8f, 0x01, 0x12, 0xbf, 0x47],
    ],
    // 3.5 kHz.
    [
        [0x2d, 0x41, 0x3c, 0xcc, 0xed, 0x86, 0x58, 0xba, 0x06, 0xc3, 0x2c, 0x5d],
        [0xf7, 0xb2, 0x05, 0x97, 0xfc, 0x36, 0x69, 0xb4, 0x0e, 0x1b, 0x34, 0xda],
        [0x30, 0x4d, 0xc8, 0x89, 0xe9, 0xb2, 0x7e, 0x76, 0x04, 0xd9, 0x3f, 0x3b],
    ],
    // 13 kHz.
    [
        [0xfd, 0x9f, 0xcc, 0xf6, 0xfd, 0x7b, 0x46, 0x8e, 0x0e, 0xbd, 0xa3, 0x47],
        [0x3d, 0x4d, 0x31, 0x77, 0xe2, 0x25, 0x7e, 0x8f, 0x01, 0x12, 0xbf, 0x47],
        [0xf7, 0xb2, 0x05, 0x97, 0xfc, 0x36, 0x69, 0xb4, 0x0e, 0x1b, 0x34, 0xda],
    ],
];

/// Equalizer frequency band.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum Band {
    Hz80,
    Hz280,
    Khz1,
    Khz3_5,
    Khz13,
}

impl Band {
    /// All bands, from lowest to highest frequency.
    pub const ALL: [Band; 5] = [Band::Hz80, Band::Hz280, Band::Khz1, Band::Khz3_5, Band::Khz13];

    /// Zero-based band index.
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Gain register of this band.
    pub const fn register(self) -> u8 {
        match self {
            Self::Hz80 => CMD_REG_EQL_80,
            Self::Hz280 => CMD_REG_EQL_280,
            Self::Khz1 => CMD_REG_EQL_1K,
            Self::Khz3_5 => CMD_REG_EQL_3_5K,
            Self::Khz13 => CMD_REG_EQL_13K,
        }
    }

    /// Calibration bytes for a register value.
    pub fn calibration(self, value: u8) -> &'static [u8; CALIBRATION_LEN] {
        let row = if value < ZERO_DB {
            0
        } else if value > ZERO_DB {
            2
        } else {
            1
        };

        &CALIBRATION[usize::from(self.index())][row]
    }
}

impl TryFrom<u8> for Band {
    type Error = HeadsetError;

    fn try_from(index: u8) -> HeadsetResult<Self> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or_else(|| HeadsetError::InvalidArgument(format!("unknown equalizer band: {}", index)))
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hz80 => "80 Hz",
            Self::Hz280 => "280 Hz",
            Self::Khz1 => "1 kHz",
            Self::Khz3_5 => "3.5 kHz",
            Self::Khz13 => "13 kHz",
        };
        f.pad(name)
    }
}

/// Validated gain for a single band.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct Setting {
    band: Band,
    value: u8,
}

impl Setting {
    /// Create a setting from a band index and register value.
    ///
    /// The register uses two steps per dB, with [`ZERO_DB`] as 0 dB.
    pub fn new(band: u8, value: u8) -> HeadsetResult<Self> {
        let band = Band::try_from(band)?;

        if value > MAX_VALUE {
            return Err(HeadsetError::InvalidArgument(format!(
                "equalizer value 0x{:02x} exceeds 0x{:02x}",
                value, MAX_VALUE
            )));
        }

        Ok(Self { band, value })
    }

    /// Create a setting from a gain in dB.
    pub fn from_db(band: Band, gain: f32) -> HeadsetResult<Self> {
        if !(-MAX_GAIN..=MAX_GAIN).contains(&gain) {
            return Err(HeadsetError::InvalidArgument(format!(
                "equalizer gain {} dB outside of ±{} dB",
                gain, MAX_GAIN
            )));
        }

        let value = (2. * (gain + MAX_GAIN)) as u8;
        Ok(Self { band, value })
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Gain in dB.
    pub fn gain(&self) -> f32 {
        f32::from(self.value) / 2. - MAX_GAIN
    }

    /// Commands required to apply this setting, in transmission order.
    pub fn packets(&self) -> Vec<Packet> {
        let register = self.band.register();
        let page = self.band.index() + 1;

        // Reset the band and select its calibration page.
        let mut commands = vec![
            command::encode(register, &[ZERO_DB]),
            command::encode(CMD_EQL_SELECT, &[CALIBRATION_PAGE]),
            command::encode(CMD_EQL_SELECT, &[page]),
        ];

        // Stream calibration data one byte at a time.
        for &byte in self.band.calibration(self.value) {
            commands.push(command::encode(CMD_EQL_DATA, &[byte]));
        }

        commands.push(command::encode(CMD_UNKNOWN_4A, &[0x00]));
        commands.push(command::encode(CMD_UNKNOWN_49, &[0x04]));

        // Apply the actual gain.
        commands.push(command::encode(register, &[self.value]));
        commands.push(command::encode(CMD_EQL_SELECT, &[CALIBRATION_PAGE]));

        commands.into_iter().map(Packet::command).collect()
    }
}
