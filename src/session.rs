//! Headset control session.

use tracing::{debug, info};

use crate::color::Rgb;
use crate::equalizer::Setting;
use crate::error::{HeadsetError, HeadsetResult};
use crate::microphone;
use crate::transport::{self, Packet, Transport, UsbTransport};

/// Exclusive connection to a headset.
///
/// The transport is closed when the session is dropped.
pub struct Session<T: Transport> {
    transport: T,
}

impl Session<UsbTransport> {
    /// Open the Siberia 350 control interface.
    pub fn open() -> HeadsetResult<Self> {
        let transport =
            UsbTransport::open(transport::VENDOR_ID, transport::PRODUCT_ID, transport::INTERFACE)?;

        match transport.product_name() {
            Some(product) => info!(%product, "Opened headset"),
            None => info!("Opened headset"),
        }

        Ok(Self::new(transport))
    }
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Set the LED color and persist it to device memory.
    pub fn set_color(&mut self, color: Rgb) -> HeadsetResult<()> {
        info!(%color, "Setting color");
        self.send_all("color", color.packets())
    }

    /// Enable or disable automatic microphone optimization.
    pub fn set_microphone_optimization(&mut self, enabled: bool) -> HeadsetResult<()> {
        info!(enabled, "Setting microphone auto optimization");
        self.send_all("microphone", vec![microphone::auto_optimization(enabled)])
    }

    /// Set the register value of an equalizer band.
    ///
    /// Bands are indexed from 0 (80 Hz) to 4 (13 kHz), values range from
    /// 0x00 (-12 dB) to 0x30 (+12 dB).
    pub fn set_equalizer(&mut self, band: u8, value: u8) -> HeadsetResult<()> {
        let setting = Setting::new(band, value)?;

        info!(band = %setting.band(), gain = setting.gain(), "Setting equalizer");
        self.send_all("equalizer", setting.packets())
    }

    /// Send packets in order, aborting on the first failure.
    fn send_all(&mut self, operation: &'static str, packets: Vec<Packet>) -> HeadsetResult<()> {
        for (index, packet) in packets.iter().enumerate() {
            let value = packet.channel.value();
            debug!(operation, index, value = value, "Sending {:02x?}", &packet.data[..]);

            self.transport
                .send(&packet.data, value)
                .map_err(|source| HeadsetError::TransferFailed { operation, index, source })?;
        }

        Ok(())
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.transport.close();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::transport::Channel;

    #[derive(Default)]
    struct Log {
        sent: Vec<(Vec<u8>, u16)>,
        closed: usize,
    }

    /// Transport recording all calls.
    struct MockTransport {
        log: Rc<RefCell<Log>>,
        fail_at: Option<usize>,
    }

    impl MockTransport {
        fn new() -> (Self, Rc<RefCell<Log>>) {
            let log = Rc::new(RefCell::new(Log::default()));
            (Self { log: log.clone(), fail_at: None }, log)
        }

        fn failing_at(index: usize) -> (Self, Rc<RefCell<Log>>) {
            let (mut transport, log) = Self::new();
            transport.fail_at = Some(index);
            (transport, log)
        }
    }

    impl Transport for MockTransport {
        fn send(&mut self, data: &[u8], value: u16) -> Result<(), rusb::Error> {
            let mut log = self.log.borrow_mut();
            if self.fail_at == Some(log.sent.len()) {
                return Err(rusb::Error::Pipe);
            }
            log.sent.push((data.to_vec(), value));
            Ok(())
        }

        fn close(&mut self) {
            self.log.borrow_mut().closed += 1;
        }
    }

    #[test]
    fn equalizer_uses_default_channel() {
        let (transport, log) = MockTransport::new();
        let mut session = Session::new(transport);

        session.set_equalizer(1, 0x10).unwrap();
        drop(session);

        let log = log.borrow();
        assert_eq!(log.sent.len(), 19);
        assert!(log.sent.iter().all(|(data, value)| data.len() == 16 && *value == 0x0206));
        assert_eq!(log.sent[17].0[..5], [0x01, 0x00, 0x41, 0x01, 0x10]);
        assert_eq!(log.closed, 1);
    }

    #[test]
    fn color_channels() {
        let (transport, log) = MockTransport::new();
        let mut session = Session::new(transport);

        session.set_color(Rgb::new(0xde, 0xad, 0xff)).unwrap();

        let values: Vec<u16> = log.borrow().sent.iter().map(|(_, value)| *value).collect();
        let mut expected = vec![Channel::Command.value(); 11];
        expected.push(0x0204);
        expected.push(0x0221);
        assert_eq!(values, expected);

        assert_eq!(log.borrow().sent[3].0[7..10], [0xde, 0xad, 0xff]);
        assert_eq!(log.borrow().sent[12].0, vec![0x21, 0x01]);
    }

    #[test]
    fn microphone_single_packet() {
        let (transport, log) = MockTransport::new();
        let mut session = Session::new(transport);

        session.set_microphone_optimization(true).unwrap();
        session.set_microphone_optimization(false).unwrap();

        let log = log.borrow();
        assert_eq!(log.sent.len(), 2);
        assert_eq!(log.sent[0].0[2..5], [0xf0, 0x01, 0xf1]);
        assert_eq!(log.sent[1].0[2..5], [0xf0, 0x01, 0x00]);
        assert_eq!(log.sent[1].1, 0x0206);
    }

    #[test]
    fn invalid_arguments_send_nothing() {
        let (transport, log) = MockTransport::new();
        let mut session = Session::new(transport);

        assert!(matches!(session.set_equalizer(5, 0x18), Err(HeadsetError::InvalidArgument(_))));
        assert!(matches!(session.set_equalizer(0, 0x31), Err(HeadsetError::InvalidArgument(_))));
        assert!(matches!("100ff00".parse::<Rgb>(), Err(HeadsetError::InvalidArgument(_))));
        assert!(log.borrow().sent.is_empty());

        drop(session);
        assert_eq!(log.borrow().closed, 1);
    }

    #[test]
    fn transfer_failure_aborts_sequence() {
        let (transport, log) = MockTransport::failing_at(4);
        let mut session = Session::new(transport);

        match session.set_equalizer(0, 0x30) {
            Err(HeadsetError::TransferFailed { operation, index, source }) => {
                assert_eq!(operation, "equalizer");
                assert_eq!(index, 4);
                assert!(matches!(source, rusb::Error::Pipe));
            },
            result => panic!("unexpected result: {:?}", result),
        }

        assert_eq!(log.borrow().sent.len(), 4);
        assert_eq!(log.borrow().closed, 0);

        drop(session);
        assert_eq!(log.borrow().closed, 1);
    }

    #[test]
    fn close_once_on_early_return() {
        fn configure(transport: MockTransport) -> HeadsetResult<()> {
            let mut session = Session::new(transport);
            session.set_microphone_optimization(true)?;
            session.set_color(Rgb::default())?;
            session.set_equalizer(2, 0x18)
        }

        let (transport, log) = MockTransport::failing_at(5);
        assert!(configure(transport).is_err());

        let log = log.borrow();
        assert_eq!(log.sent.len(), 5);
        assert_eq!(log.closed, 1);
    }

    #[test]
    fn close_once_on_panic() {
        let (transport, log) = MockTransport::new();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _session = Session::new(transport);
            panic!("aborted");
        }));

        assert!(result.is_err());
        assert_eq!(log.borrow().closed, 1);
    }
}
