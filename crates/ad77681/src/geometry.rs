//! Frame lengths derived from the interface configuration.

use crate::config::{ChecksumMode, ConvLen};

/// Longest conversion frame: command + 3 sample bytes + status + checksum.
pub const MAX_CONVERSION_FRAME: usize = 6;

/// The three settings that decide how long a frame is.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameGeometry {
    pub conv_len: ConvLen,
    pub checksum_mode: ChecksumMode,
    pub status_byte: bool,
}

impl FrameGeometry {
    /// Bytes in a register read or write.
    pub const fn register_frame_len(&self) -> usize {
        if self.checksum_mode.is_enabled() {
            3
        } else {
            2
        }
    }

    /// Bytes following the command byte in a conversion read.
    pub const fn conversion_frame_len(&self) -> usize {
        self.conv_len.bytes()
            + self.checksum_mode.is_enabled() as usize
            + self.status_byte as usize
    }

    /// [`conversion_frame_len`](Self::conversion_frame_len) in 16 bit SPI words, rounded up.
    pub const fn conversion_frame_16bit(&self) -> u8 {
        self.conversion_frame_len().div_ceil(2) as u8
    }

    /// Receive length assuming 24 bit samples regardless of `conv_len`.
    pub const fn rx_buf_len(&self) -> usize {
        3 + self.checksum_mode.is_enabled() as usize + self.status_byte as usize
    }
}
