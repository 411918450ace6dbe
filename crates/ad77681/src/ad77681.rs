use embedded_hal::spi::SpiDevice;
use log::{debug, info, trace, warn};

use crate::checksum::{crc8, xor8, INITIAL_CRC};
use crate::config::{ChecksumMode, Config, ConvLen, ConvMode, DiagMux, MclkDiv, PowerMode};
use crate::error::{Checked, ConfigError, Error, Field, Integrity, SetupReport, StepFailures};
use crate::geometry::{FrameGeometry, MAX_CONVERSION_FRAME};
use crate::registers::{self as regs, field, read_cmd, write_cmd, Reg};

/// AD7768-1 driver session.
///
/// Holds the SPI device and a mirror of the device configuration. The mirror
/// is only updated after the write that changes a field has gone through, and
/// the frame geometry is recomputed whenever the sample width, checksum mode
/// or status byte changes.
///
/// Operations are not synchronised: masked writes read, modify and write a
/// register in separate SPI transactions. Wrap the whole driver in a mutex if
/// it is shared between threads.
pub struct Ad77681<SPI> {
    spi: SPI,
    power_mode: PowerMode,
    mclk_div: MclkDiv,
    conv_mode: ConvMode,
    diag_mux: DiagMux,
    diag_select: bool,
    geometry: FrameGeometry,
    frame_16bit: u8,
}

impl<SPI: SpiDevice> Ad77681<SPI> {
    /// Creates a driver for a device in its power-on state. No SPI traffic is generated.
    pub fn new(spi: SPI) -> Self {
        Self::new_with_checksum(spi, ChecksumMode::None)
    }

    /// Creates a driver for a device which already has `checksum_mode` enabled.
    pub fn new_with_checksum(spi: SPI, checksum_mode: ChecksumMode) -> Self {
        let defaults = Config::default();
        let geometry = FrameGeometry {
            conv_len: defaults.conv_len,
            checksum_mode,
            status_byte: defaults.status_byte,
        };

        Self {
            spi,
            power_mode: defaults.power_mode,
            mclk_div: defaults.mclk_div,
            conv_mode: defaults.conv_mode,
            diag_mux: defaults.diag_mux,
            diag_select: defaults.diag_select,
            geometry,
            frame_16bit: geometry.conversion_frame_16bit(),
        }
    }

    /// Creates a driver and runs [`configure`](Self::configure) with `config`.
    ///
    /// `config.checksum_mode` is taken as already active on the device: every
    /// transaction of the sequence, including the soft reset, is framed with
    /// it. To turn checksums on from the power-on state, set up with
    /// [`ChecksumMode::None`] and call [`set_checksum_mode`](Self::set_checksum_mode)
    /// afterwards.
    ///
    /// The driver is returned even if some steps failed; check the report.
    pub fn setup(spi: SPI, config: &Config) -> (Self, SetupReport<SPI::Error>) {
        let mut adc = Self::new_with_checksum(spi, config.checksum_mode);
        let report = adc.configure(config);
        (adc, report)
    }

    /// Soft resets the device and applies every field of `config`.
    ///
    /// Steps run in a fixed order with the checksum mode last, so all earlier
    /// transactions are framed with the checksum mode the driver holds when
    /// called. A failed step is logged and the remaining steps still run.
    pub fn configure(&mut self, config: &Config) -> SetupReport<SPI::Error> {
        let mut report = SetupReport::new();

        let steps = [
            self.soft_reset(),
            self.set_power_mode(config.power_mode),
            self.set_mclk_div(config.mclk_div),
            self.set_conv_mode(config.conv_mode, config.diag_mux, config.diag_select),
            self.set_conv_len(config.conv_len),
            self.set_status_byte(config.status_byte),
            self.set_checksum_mode(config.checksum_mode),
        ];

        for step in steps {
            if let Err(failures) = step {
                report.merge(failures);
            }
        }

        for failure in report.failures() {
            warn!("ad77681 setup: {:?} failed: {:?}", failure.field, failure.error);
        }

        if report.is_empty() {
            info!("ad77681 successfully initialized");
        }

        report
    }

    /// Releases the SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }

    fn exchange(&mut self, frame: &mut [u8]) -> Result<(), Error<SPI::Error>> {
        trace!("ad77681 tx {:02x?}", frame);
        self.spi.transfer_in_place(frame).map_err(Error::Spi)?;
        trace!("ad77681 rx {:02x?}", frame);
        Ok(())
    }

    /// Reads a single register.
    ///
    /// With checksums enabled the device appends a checksum of the command
    /// byte and the register value, which is verified with the selected
    /// algorithm.
    pub fn read_register(&mut self, addr: u8) -> Result<Checked<u8>, Error<SPI::Error>> {
        let cmd = read_cmd(addr);
        let mut frame = [cmd, 0x00, 0x00];
        let len = self.geometry.register_frame_len();

        self.exchange(&mut frame[..len])?;

        let value = frame[1];
        let integrity = match self.geometry.checksum_mode {
            ChecksumMode::None => Integrity::Unchecked,
            ChecksumMode::Xor => Integrity::compare(xor8(&[cmd, value], INITIAL_CRC), frame[2]),
            ChecksumMode::Crc8 => Integrity::compare(crc8(&[cmd, value], INITIAL_CRC), frame[2]),
        };

        if let Integrity::Mismatch(mismatch) = integrity {
            warn!("ad77681 register {addr:#04x} read: {mismatch:?}");
        }

        Ok(Checked { value, integrity })
    }

    /// Writes a single register.
    ///
    /// Writes are protected by CRC-8 whenever any checksum mode is active.
    pub fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Error<SPI::Error>> {
        let mut frame = [write_cmd(addr), value, 0x00];
        let len = self.geometry.register_frame_len();

        if self.geometry.checksum_mode.is_enabled() {
            frame[2] = crc8(&frame[..2], INITIAL_CRC);
        }

        self.exchange(&mut frame[..len])
    }

    /// Reads the bits of register `addr` selected by `mask`.
    pub fn read_masked(&mut self, addr: u8, mask: u8) -> Result<Checked<u8>, Error<SPI::Error>> {
        Ok(self.read_register(addr)?.map(|value| value & mask))
    }

    /// Replaces the bits of register `addr` selected by `mask` with `value`.
    ///
    /// `value` must already be shifted into the position of `mask`. The write
    /// goes ahead even when the read back fails its checksum, in which case
    /// the mismatch is returned after the write.
    pub fn write_masked(&mut self, addr: u8, mask: u8, value: u8) -> Result<(), Error<SPI::Error>> {
        let current = self.read_register(addr)?;
        let merged = (current.value & !mask) | (value & mask);

        self.write_register(addr, merged)?;
        current.into_result()?;
        Ok(())
    }

    /// Reads the latest conversion result.
    ///
    /// Only CRC-8 is verified, by comparing the CRC of the first four bytes
    /// received with the byte at offset 3. That lines up with the 24 bit,
    /// no status byte layout only; XOR is never verified here.
    pub fn read_conversion(&mut self) -> Result<Checked<Conversion>, Error<SPI::Error>> {
        let len = self.geometry.conversion_frame_len() + 1;
        let mut frame = [0u8; MAX_CONVERSION_FRAME];
        frame[0] = read_cmd(Reg::AdcData.addr());

        self.exchange(&mut frame[..len])?;

        let integrity = match self.geometry.checksum_mode {
            ChecksumMode::Crc8 => Integrity::compare(crc8(&frame[..4], INITIAL_CRC), frame[3]),
            _ => Integrity::Unchecked,
        };

        if let Integrity::Mismatch(mismatch) = integrity {
            warn!("ad77681 conversion read: {mismatch:?}");
        }

        Ok(Checked {
            value: Conversion {
                frame,
                len: len as u8,
                conv_len: self.geometry.conv_len,
                status_byte: self.geometry.status_byte,
            },
            integrity,
        })
    }

    fn step<const N: usize>(
        &mut self,
        failures: &mut StepFailures<SPI::Error, N>,
        field_id: Field,
        reg: Reg,
        mask: u8,
        value: u8,
    ) -> bool {
        let result = self.write_masked(reg.addr(), mask, field(mask, value));
        failures.record(field_id, result)
    }

    fn update_geometry(&mut self, geometry: FrameGeometry) {
        self.geometry = geometry;
        self.frame_16bit = geometry.conversion_frame_16bit();
        debug!(
            "ad77681 frame geometry {:?}: {} bytes, {} words",
            geometry,
            geometry.conversion_frame_len(),
            self.frame_16bit
        );
    }

    /// Sets the power consumption mode of the ADC core.
    pub fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), ConfigError<SPI::Error>> {
        let mut failures = ConfigError::new();

        if self.step(
            &mut failures,
            Field::PowerMode,
            Reg::PowerClock,
            regs::POWER_CLK_PWRMODE,
            mode as u8,
        ) {
            self.power_mode = mode;
        }

        failures.into_result()
    }

    /// Sets the MCLK divider.
    pub fn set_mclk_div(&mut self, div: MclkDiv) -> Result<(), ConfigError<SPI::Error>> {
        let mut failures = ConfigError::new();

        if self.step(
            &mut failures,
            Field::MclkDiv,
            Reg::PowerClock,
            regs::POWER_CLK_MCLK_DIV,
            div as u8,
        ) {
            self.mclk_div = div;
        }

        failures.into_result()
    }

    /// Selects the conversion mode and the conversion source.
    ///
    /// Issues three masked writes; each cached field follows its own write.
    pub fn set_conv_mode(
        &mut self,
        mode: ConvMode,
        diag_mux: DiagMux,
        diag_select: bool,
    ) -> Result<(), ConfigError<SPI::Error>> {
        let mut failures = ConfigError::new();

        if self.step(
            &mut failures,
            Field::ConvMode,
            Reg::Conversion,
            regs::CONVERSION_MODE,
            mode as u8,
        ) {
            self.conv_mode = mode;
        }
        if self.step(
            &mut failures,
            Field::DiagMux,
            Reg::Conversion,
            regs::CONVERSION_DIAG_MUX,
            diag_mux as u8,
        ) {
            self.diag_mux = diag_mux;
        }
        if self.step(
            &mut failures,
            Field::DiagSelect,
            Reg::Conversion,
            regs::CONVERSION_DIAG_SEL,
            diag_select as u8,
        ) {
            self.diag_select = diag_select;
        }

        failures.into_result()
    }

    /// Sets the conversion result width.
    pub fn set_conv_len(&mut self, conv_len: ConvLen) -> Result<(), ConfigError<SPI::Error>> {
        let mut failures = ConfigError::new();

        if self.step(
            &mut failures,
            Field::ConvLen,
            Reg::InterfaceFormat,
            regs::INTERFACE_CONVLEN,
            conv_len as u8,
        ) {
            self.update_geometry(FrameGeometry {
                conv_len,
                ..self.geometry
            });
        }

        failures.into_result()
    }

    /// Appends the status byte to conversion results.
    pub fn set_status_byte(&mut self, enabled: bool) -> Result<(), ConfigError<SPI::Error>> {
        let mut failures = ConfigError::new();

        if self.step(
            &mut failures,
            Field::StatusByte,
            Reg::InterfaceFormat,
            regs::INTERFACE_STATUS_EN,
            enabled as u8,
        ) {
            self.update_geometry(FrameGeometry {
                status_byte: enabled,
                ..self.geometry
            });
        }

        failures.into_result()
    }

    /// Enables checksums on all SPI transactions and selects the algorithm.
    ///
    /// Enabling takes two writes, enable bit then type bit. The type bit is
    /// written even if enabling failed. The cached mode only changes once
    /// every write went through.
    pub fn set_checksum_mode(&mut self, mode: ChecksumMode) -> Result<(), ConfigError<SPI::Error>> {
        let mut failures = ConfigError::new();

        let ok = match mode.type_bits() {
            None => self.step(
                &mut failures,
                Field::ChecksumEnable,
                Reg::InterfaceFormat,
                regs::INTERFACE_CRC_EN,
                0,
            ),
            Some(type_bits) => {
                let enabled = self.step(
                    &mut failures,
                    Field::ChecksumEnable,
                    Reg::InterfaceFormat,
                    regs::INTERFACE_CRC_EN,
                    1,
                );
                let typed = self.step(
                    &mut failures,
                    Field::ChecksumType,
                    Reg::InterfaceFormat,
                    regs::INTERFACE_CRC_TYPE,
                    type_bits,
                );
                enabled && typed
            }
        };

        if ok {
            self.update_geometry(FrameGeometry {
                checksum_mode: mode,
                ..self.geometry
            });
        }

        failures.into_result()
    }

    /// Resets the device over SPI.
    ///
    /// The reset only registers after two different patterns are written to
    /// the `SPI_RESET` field, arm first.
    pub fn soft_reset(&mut self) -> Result<(), ConfigError<SPI::Error>> {
        let mut failures = ConfigError::new();

        self.step(
            &mut failures,
            Field::ResetArm,
            Reg::SyncReset,
            regs::SYNC_RST_SPI_RESET,
            regs::SPI_RESET_ARM,
        );
        self.step(
            &mut failures,
            Field::ResetFire,
            Reg::SyncReset,
            regs::SYNC_RST_SPI_RESET,
            regs::SPI_RESET_FIRE,
        );

        failures.into_result()
    }

    /// Power mode last written successfully.
    pub fn power_mode(&self) -> PowerMode {
        self.power_mode
    }

    /// MCLK divider last written successfully.
    pub fn mclk_div(&self) -> MclkDiv {
        self.mclk_div
    }

    /// Conversion mode last written successfully.
    pub fn conv_mode(&self) -> ConvMode {
        self.conv_mode
    }

    /// Diagnostic input last written successfully.
    pub fn diag_mux(&self) -> DiagMux {
        self.diag_mux
    }

    /// Whether conversions sample the diagnostic input instead of the analog input.
    pub fn diag_select(&self) -> bool {
        self.diag_select
    }

    /// Sample width used to frame conversion reads.
    pub fn conv_len(&self) -> ConvLen {
        self.geometry.conv_len
    }

    /// Checksum mode used to frame every transaction.
    pub fn checksum_mode(&self) -> ChecksumMode {
        self.geometry.checksum_mode
    }

    /// Whether conversion reads expect a trailing status byte.
    pub fn status_byte(&self) -> bool {
        self.geometry.status_byte
    }

    /// Frame lengths for the cached configuration.
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Conversion frame length in 16 bit SPI words for the current configuration.
    pub fn frame_16bit(&self) -> u8 {
        self.frame_16bit
    }

    /// Receive length of a conversion read, counting a 24 bit sample.
    pub fn rx_buf_len(&self) -> usize {
        self.geometry.rx_buf_len()
    }
}

/// A conversion frame as clocked out of the device.
///
/// Layout: command echo, sample MSB first, status byte if enabled, checksum
/// byte if enabled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Conversion {
    frame: [u8; MAX_CONVERSION_FRAME],
    len: u8,
    conv_len: ConvLen,
    status_byte: bool,
}

impl Conversion {
    /// All bytes exchanged, starting with the byte received during the command.
    pub fn as_bytes(&self) -> &[u8] {
        &self.frame[..usize::from(self.len)]
    }

    /// Sample bytes, most significant first.
    pub fn sample_bytes(&self) -> &[u8] {
        &self.frame[1..1 + self.conv_len.bytes()]
    }

    /// Unsigned sample word.
    pub fn raw(&self) -> u32 {
        self.sample_bytes()
            .iter()
            .fold(0, |acc, byte| (acc << 8) | u32::from(*byte))
    }

    /// Two's complement sample, sign extended.
    pub fn code(&self) -> i32 {
        let shift = 32 - self.conv_len.bits();
        ((self.raw() << shift) as i32) >> shift
    }

    /// Status byte, if the frame carries one.
    pub fn status(&self) -> Option<u8> {
        self.status_byte
            .then(|| self.frame[1 + self.conv_len.bytes()])
    }

    /// Sample width the frame was read with.
    pub fn conv_len(&self) -> ConvLen {
        self.conv_len
    }
}
