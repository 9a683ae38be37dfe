//! USB transport abstraction.

use std::time::Duration;

use bytes::Bytes;
use rusb::{DeviceHandle, Direction, GlobalContext, Recipient, RequestType};
use tracing::{debug, warn};

use crate::error::{HeadsetError, HeadsetResult};

/// SteelSeries USB vendor ID.
pub const VENDOR_ID: u16 = 0x1038;

/// Siberia 350 USB product ID.
pub const PRODUCT_ID: u16 = 0x12aa;

/// Vendor control interface.
pub const INTERFACE: u8 = 5;

/// HID `SET_REPORT` class request.
const SET_REPORT: u8 = 0x09;

/// Timeout for a single control transfer.
const TIMEOUT: Duration = Duration::from_secs(1);

/// Control transfer `value` a packet is written with.
///
/// The color sequence is only persisted when its final packets arrive on the
/// matching channel.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum Channel {
    /// Regular commands.
    Command,
    /// Packet preceding the save request.
    PreSave,
    /// Commit to device memory.
    Save,
}

impl Channel {
    /// Control transfer `value` field.
    pub const fn value(self) -> u16 {
        match self {
            Self::Command => 0x0206,
            Self::PreSave => 0x0204,
            Self::Save => 0x0221,
        }
    }
}

/// Bytes written in a single control transfer.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Packet {
    pub channel: Channel,
    pub data: Bytes,
}

impl Packet {
    /// Packet on the default command channel.
    pub fn command(data: impl Into<Bytes>) -> Self {
        Self { channel: Channel::Command, data: data.into() }
    }

    pub fn with_channel(data: impl Into<Bytes>, channel: Channel) -> Self {
        Self { channel, data: data.into() }
    }
}

/// Connection to the headset's control interface.
pub trait Transport {
    /// Write one packet using a class control transfer.
    fn send(&mut self, data: &[u8], value: u16) -> Result<(), rusb::Error>;

    /// Release the claimed interface.
    ///
    /// Called exactly once, after which the transport is not used anymore.
    fn close(&mut self);
}

/// libusb backed transport.
pub struct UsbTransport {
    handle: DeviceHandle<GlobalContext>,
    interface: u8,
}

impl UsbTransport {
    /// Open the device and claim its control interface.
    pub fn open(vendor_id: u16, product_id: u16, interface: u8) -> HeadsetResult<Self> {
        let mut handle = rusb::open_device_with_vid_pid(vendor_id, product_id)
            .ok_or(HeadsetError::DeviceNotFound { vendor_id, product_id })?;

        // Kernel driver detaching is only available on Linux.
        match handle.set_auto_detach_kernel_driver(true) {
            Ok(()) | Err(rusb::Error::NotSupported) => (),
            Err(err) => return Err(err.into()),
        }

        // Dropping the handle on failure closes the device again.
        handle
            .claim_interface(interface)
            .map_err(|source| HeadsetError::ClaimFailed { interface, source })?;

        debug!(interface, "Claimed USB interface of {:04x}:{:04x}", vendor_id, product_id);

        Ok(Self { handle, interface })
    }

    /// Read the product string, if the device has one.
    pub fn product_name(&self) -> Option<String> {
        let desc = self.handle.device().device_descriptor().ok()?;
        self.handle.read_product_string_ascii(&desc).ok()
    }
}

impl Transport for UsbTransport {
    fn send(&mut self, data: &[u8], value: u16) -> Result<(), rusb::Error> {
        let request_type =
            rusb::request_type(Direction::Out, RequestType::Class, Recipient::Interface);

        let written = self.handle.write_control(
            request_type,
            SET_REPORT,
            value,
            u16::from(self.interface),
            data,
            TIMEOUT,
        )?;

        if written != data.len() {
            return Err(rusb::Error::Io);
        }

        Ok(())
    }

    fn close(&mut self) {
        if let Err(err) = self.handle.release_interface(self.interface) {
            warn!(interface = self.interface, error = %err, "Unable to release USB interface");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_values() {
        assert_eq!(Channel::Command.value(), 0x0206);
        assert_eq!(Channel::PreSave.value(), 0x0204);
        assert_eq!(Channel::Save.value(), 0x0221);
    }

    #[test]
    fn command_packets_use_default_channel() {
        let packet = Packet::command(vec![0x21, 0x01]);
        assert_eq!(packet.channel, Channel::Command);
        assert_eq!(&packet.data[..], &[0x21, 0x01]);
    }
}
