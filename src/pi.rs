use std::cell::RefCell;
use std::time::Duration;

use ad77681::{Ad77681, ChecksumMode, Config, ConvMode, PowerMode};
use embedded_hal_bus::spi::RefCellDevice;
use log::{info, warn};
use rppal::gpio::Gpio;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

/// GPIO driving the AD7768-1 chip select.
const CS_PIN: u8 = 24;

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let gpio = Gpio::new()?;

    // The AD7768-1 samples on the rising edge with an idle-high clock.
    let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, 1_000_000, Mode::Mode3)?;

    let spi = RefCell::new(spi);

    let device = RefCellDevice::new_no_delay(&spi, gpio.get(CS_PIN)?.into_output_high());

    let config = Config {
        power_mode: PowerMode::Median,
        conv_mode: ConvMode::Continuous,
        ..Config::default()
    };

    let (mut adc, report) = Ad77681::setup(device, &config);

    if !report.is_empty() {
        warn!("continuing with partial configuration: {report}");
    }

    if let Err(e) = adc.set_checksum_mode(ChecksumMode::Crc8) {
        warn!("running without crc: {e}");
    }

    info!("reading {} byte conversion frames", adc.geometry().conversion_frame_len() + 1);

    loop {
        match adc.read_conversion() {
            Ok(conversion) if conversion.is_trusted() => {
                info!("code: {}", conversion.value.code());
            }
            Ok(conversion) => {
                warn!("crc error, frame {:02x?}", conversion.value.as_bytes());
            }
            Err(e) => warn!("read failed: {e}"),
        }

        std::thread::sleep(Duration::from_millis(500));
    }
}
