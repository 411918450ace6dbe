//! Register map and field masks of the AD7768-1.

/// Register addresses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Reg {
    ChipType = 0x03,
    ProductIdL = 0x04,
    ProductIdH = 0x05,
    ChipGrade = 0x06,
    ScratchPad = 0x0a,
    VendorL = 0x0c,
    VendorH = 0x0d,
    InterfaceFormat = 0x14,
    PowerClock = 0x15,
    Analog = 0x16,
    Analog2 = 0x17,
    Conversion = 0x18,
    DigitalFilter = 0x19,
    SyncReset = 0x1d,
    /// Conversion result
    AdcData = 0x2c,
    MasterStatus = 0x2d,
}

impl Reg {
    /// Six bit address used in the command byte.
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

const READ_BIT: u8 = 1 << 6;
const ADDR_MASK: u8 = 0b0011_1111;

/// First byte of a read transaction.
pub const fn read_cmd(addr: u8) -> u8 {
    READ_BIT | (addr & ADDR_MASK)
}

/// First byte of a write transaction.
pub const fn write_cmd(addr: u8) -> u8 {
    addr & ADDR_MASK
}

// INTERFACE_FORMAT
pub const INTERFACE_CRC_EN: u8 = 1 << 6;
pub const INTERFACE_CRC_TYPE: u8 = 1 << 5;
pub const INTERFACE_STATUS_EN: u8 = 1 << 4;
pub const INTERFACE_CONVLEN: u8 = 1 << 3;
pub const INTERFACE_RDY_EN: u8 = 1 << 2;
pub const INTERFACE_CONT_READ: u8 = 1 << 0;

// POWER_CLOCK
pub const POWER_CLK_PWRMODE: u8 = 0b0000_0011;
pub const POWER_CLK_MOD_OUT: u8 = 1 << 2;
pub const POWER_CLK_POWER_DOWN: u8 = 1 << 3;
pub const POWER_CLK_MCLK_DIV: u8 = 0b0011_0000;
pub const POWER_CLK_CLOCK_SEL: u8 = 0b1100_0000;

// CONVERSION
pub const CONVERSION_DIAG_MUX: u8 = 0b1111_0000;
pub const CONVERSION_DIAG_SEL: u8 = 1 << 3;
pub const CONVERSION_MODE: u8 = 0b0000_0111;

// SYNC_RESET
pub const SYNC_RST_SPI_STARTB: u8 = 1 << 7;
pub const SYNC_RST_SYNCOUT_EDGE: u8 = 1 << 6;
pub const SYNC_RST_GPIO_START_EN: u8 = 1 << 3;
pub const SYNC_RST_SPI_RESET: u8 = 0b0000_0011;

/// First and second pattern written to `SPI_RESET`.
pub const SPI_RESET_ARM: u8 = 0x3;
pub const SPI_RESET_FIRE: u8 = 0x2;

/// Shift `value` into the position described by `mask`.
pub const fn field(mask: u8, value: u8) -> u8 {
    (value << mask.trailing_zeros()) & mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_bytes() {
        assert_eq!(read_cmd(Reg::InterfaceFormat.addr()), 0x54);
        assert_eq!(read_cmd(Reg::AdcData.addr()), 0x6c);
        assert_eq!(write_cmd(Reg::SyncReset.addr()), 0x1d);
        // Out of range addresses never touch the direction bit.
        assert_eq!(write_cmd(0x7f), 0x3f);
        assert_eq!(read_cmd(0xff), 0x7f);
    }

    #[test]
    fn field_shifts_into_mask() {
        assert_eq!(field(POWER_CLK_MCLK_DIV, 0x3), 0x30);
        assert_eq!(field(CONVERSION_DIAG_MUX, 0xa), 0xa0);
        assert_eq!(field(INTERFACE_CRC_EN, 1), 0x40);
        assert_eq!(field(SYNC_RST_SPI_RESET, SPI_RESET_ARM), 0x03);
        assert_eq!(field(INTERFACE_STATUS_EN, 0), 0x00);
    }
}
