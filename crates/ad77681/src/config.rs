//! Typed settings accepted by the AD7768-1.

/// Power consumption mode of the ADC core.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum PowerMode {
    #[default]
    Eco = 0,
    Median = 2,
    Fast = 3,
}

/// MCLK divider.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum MclkDiv {
    #[default]
    Div16 = 0,
    Div8 = 1,
    Div4 = 2,
    Div2 = 3,
}

/// Conversion mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum ConvMode {
    #[default]
    Continuous = 0,
    OneShot = 1,
    Single = 2,
    Periodic = 3,
}

/// Signal routed through the diagnostic mux.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum DiagMux {
    #[default]
    TempSensor = 0x0,
    AinShort = 0x8,
    PositiveFullScale = 0x9,
    NegativeFullScale = 0xa,
}

/// Width of a conversion result word.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum ConvLen {
    #[default]
    Bits24 = 0,
    Bits16 = 1,
}

impl ConvLen {
    /// Number of bytes one sample occupies on the bus.
    pub const fn bytes(self) -> usize {
        match self {
            Self::Bits24 => 3,
            Self::Bits16 => 2,
        }
    }

    /// Number of significant bits in one sample.
    pub const fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }
}

/// Integrity check trailing every SPI transaction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ChecksumMode {
    #[default]
    None,
    Xor,
    Crc8,
}

impl ChecksumMode {
    /// Whether transactions carry a trailing checksum byte.
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Encoding of the `CRC_TYPE` bit, `None` when checksums are off.
    pub(crate) const fn type_bits(self) -> Option<u8> {
        match self {
            Self::None => None,
            Self::Crc8 => Some(0),
            Self::Xor => Some(1),
        }
    }
}

/// Initial parameters applied by [`Ad77681::setup`](crate::Ad77681::setup).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub power_mode: PowerMode,
    /// Divider from MCLK to the modulator clock.
    pub mclk_div: MclkDiv,
    pub conv_mode: ConvMode,
    pub diag_mux: DiagMux,
    /// Convert the diagnostic mux output instead of AIN.
    pub diag_select: bool,
    pub conv_len: ConvLen,
    /// Checksum mode the device is already using when setup starts, kept
    /// as the final setting.
    pub checksum_mode: ChecksumMode,
    /// Append the status byte to conversion results.
    pub status_byte: bool,
}
