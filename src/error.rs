//! Headset error types.

use thiserror::Error;

/// Headset error type.
#[derive(Debug, Error)]
pub enum HeadsetError {
    #[error("device {vendor_id:04x}:{product_id:04x} not found")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    #[error("unable to claim interface {interface}: {source} (root permissions required)")]
    ClaimFailed {
        interface: u8,
        #[source]
        source: rusb::Error,
    },

    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    #[error("{operation} failed at packet #{index}: {source}")]
    TransferFailed {
        operation: &'static str,
        index: usize,
        #[source]
        source: rusb::Error,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for headset operations.
pub type HeadsetResult<T> = Result<T, HeadsetError>;
