//! Provides a driver for the Analog Devices AD7768-1 delta-sigma ADC via the
//! `embedded-hal` ecosystem.
//!
//! Every register access is a single full-duplex [`SpiDevice`](embedded_hal::spi::SpiDevice)
//! transfer. Depending on the configured [`ChecksumMode`], frames carry a
//! trailing XOR or CRC-8 byte which the driver appends on writes and verifies
//! on reads. Reads hand back their data as [`Checked`] values so a corrupted
//! frame can still be inspected.
//!
//! The driver performs no retries and no locking; callers sharing a device
//! between threads must serialise access themselves.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(test)]
extern crate std;

mod ad77681;
pub mod checksum;
pub mod config;
mod error;
pub mod geometry;
pub mod registers;

pub use ad77681::{Ad77681, Conversion};
pub use config::{ChecksumMode, Config, ConvLen, ConvMode, DiagMux, MclkDiv, PowerMode};
pub use error::{
    Checked, ChecksumMismatch, ConfigError, Error, Field, Integrity, SetupReport, StepFailure,
    StepFailures, MAX_SETTER_STEPS, MAX_SETUP_STEPS,
};
pub use geometry::FrameGeometry;
