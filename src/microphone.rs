//! Microphone automatic optimization.

use crate::command::{self, CMD_MICROPHONE};
use crate::transport::Packet;

/// Payload enabling automatic optimization.
const AUTO_OPTIMIZATION_ON: u8 = 0xf1;

/// Payload disabling automatic optimization.
const AUTO_OPTIMIZATION_OFF: u8 = 0x00;

/// Command toggling automatic microphone optimization.
pub fn auto_optimization(enabled: bool) -> Packet {
    let payload = if enabled { AUTO_OPTIMIZATION_ON } else { AUTO_OPTIMIZATION_OFF };
    Packet::command(command::encode(CMD_MICROPHONE, &[payload]))
}
