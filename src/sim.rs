//! In-process stand-in for an AD7768-1 on the end of an SPI bus.

use ad77681::checksum::{crc8, xor8, INITIAL_CRC};
use ad77681::registers::{self as regs, Reg};
use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};
use log::{debug, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SimError;

impl embedded_hal::spi::Error for SimError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Register file answering SPI frames the way the part does.
///
/// Conversions produce a ramp advancing by `step` codes per read, with a
/// status byte counting reads.
pub struct SimulatedAdc {
    regs: [u8; 64],
    code: i32,
    step: i32,
    reads: u8,
    reset_armed: bool,
}

impl SimulatedAdc {
    pub fn new(start: i32, step: i32) -> Self {
        let mut adc = Self {
            regs: [0; 64],
            code: start,
            step,
            reads: 0,
            reset_armed: false,
        };
        adc.reset();
        adc
    }

    fn reset(&mut self) {
        self.regs = [0; 64];
        self.regs[Reg::ChipType as usize] = 0x07;
        self.regs[Reg::VendorL as usize] = 0x56;
        self.regs[Reg::VendorH as usize] = 0x04;
        self.reset_armed = false;
    }

    pub fn register(&self, reg: Reg) -> u8 {
        self.regs[reg as usize]
    }

    fn format(&self) -> u8 {
        self.regs[Reg::InterfaceFormat as usize]
    }

    fn checksum(&self, data: &[u8]) -> u8 {
        if self.format() & regs::INTERFACE_CRC_TYPE != 0 {
            xor8(data, INITIAL_CRC)
        } else {
            crc8(data, INITIAL_CRC)
        }
    }

    fn write(&mut self, frame: &[u8]) {
        if frame.len() == 3 && frame[2] != crc8(&frame[..2], INITIAL_CRC) {
            warn!("sim: dropping write {frame:02x?} with bad crc");
            return;
        }

        let addr = usize::from(frame[0] & 0x3f);
        let value = frame[1];

        if addr == Reg::SyncReset as usize {
            match value & regs::SYNC_RST_SPI_RESET {
                regs::SPI_RESET_ARM => self.reset_armed = true,
                regs::SPI_RESET_FIRE if self.reset_armed => {
                    debug!("sim: soft reset");
                    self.reset();
                    return;
                }
                _ => self.reset_armed = false,
            }
        }

        self.regs[addr] = value;
    }

    fn read(&mut self, frame: &mut [u8]) {
        let cmd = frame[0];
        let addr = usize::from(cmd & 0x3f);

        frame.fill(0);

        if addr == Reg::AdcData as usize {
            self.conversion(frame);
            return;
        }

        let value = self.regs[addr];
        frame[1] = value;
        if frame.len() > 2 && self.format() & regs::INTERFACE_CRC_EN != 0 {
            frame[2] = self.checksum(&[cmd, value]);
        }
    }

    fn conversion(&mut self, frame: &mut [u8]) {
        let format = self.format();
        let width = if format & regs::INTERFACE_CONVLEN != 0 { 2 } else { 3 };

        let word = (self.code as u32).to_be_bytes();
        let mut out = [0u8; 6];
        let mut len = 1;

        out[len..len + width].copy_from_slice(&word[4 - width..]);
        len += width;

        if format & regs::INTERFACE_STATUS_EN != 0 {
            out[len] = self.reads;
            len += 1;
        }

        if format & regs::INTERFACE_CRC_EN != 0 {
            out[len] = self.checksum(&out[1..1 + width]);
            len += 1;
        }

        let n = frame.len().min(len);
        frame[..n].copy_from_slice(&out[..n]);

        self.reads = self.reads.wrapping_add(1);
        self.code = self.code.wrapping_add(self.step);
    }
}

impl ErrorType for SimulatedAdc {
    type Error = SimError;
}

impl SpiDevice for SimulatedAdc {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        for operation in operations {
            match operation {
                Operation::TransferInPlace(words) if words.len() >= 2 => {
                    if words[0] & 0x40 == 0 {
                        self.write(words);
                        words.fill(0);
                    } else {
                        self.read(words);
                    }
                }
                _ => return Err(SimError),
            }
        }

        Ok(())
    }
}
