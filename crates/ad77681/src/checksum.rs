//! Checksums appended to AD7768-1 SPI frames.

/// CRC-8 polynomial x^8 + x^2 + x + 1.
pub const CRC8_POLY: u8 = 0x07;

/// Seed used outside continuous-read mode.
///
/// Continuous read would carry the CRC state between frames; the driver
/// never enables it, so every frame starts from this seed.
pub const INITIAL_CRC: u8 = 0x00;

/// Longest buffer the XOR checksum is ever computed over.
pub const XOR_MAX_LEN: usize = 3;

/// Bit-serial CRC-8 over `data`, MSB first, starting from `seed`.
pub fn crc8(data: &[u8], seed: u8) -> u8 {
    let mut crc = seed;

    for byte in data {
        let mut bit = 0b1000_0000;
        while bit != 0 {
            if (crc & 0x80 != 0) != (byte & bit != 0) {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
            bit >>= 1;
        }
    }

    crc
}

/// Running XOR of `data`, starting from `seed`.
///
/// `data` must not be longer than [`XOR_MAX_LEN`].
pub fn xor8(data: &[u8], seed: u8) -> u8 {
    debug_assert!(data.len() <= XOR_MAX_LEN);

    data.iter().fold(seed, |acc, byte| acc ^ byte)
}
