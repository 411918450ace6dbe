//! Bring up an AD7768-1 against a simulated register file and log a few conversions.

use ad77681::registers::Reg;
use ad77681::{Ad77681, ChecksumMode, Config, MclkDiv, PowerMode};
use log::{info, warn};

mod sim;

use sim::SimulatedAdc;

const CONVERSIONS: usize = 8;

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config {
        power_mode: PowerMode::Fast,
        mclk_div: MclkDiv::Div2,
        status_byte: true,
        ..Config::default()
    };

    let (mut adc, report) = Ad77681::setup(SimulatedAdc::new(-0x40, 0x21), &config);

    if !report.is_empty() {
        warn!("continuing with partial configuration: {report}");
    }

    // The simulated part powers up without checksums.
    adc.set_checksum_mode(ChecksumMode::Xor)?;

    let geometry = adc.geometry();
    info!(
        "frame: {} register bytes, {} conversion bytes, {} 16 bit words",
        geometry.register_frame_len(),
        geometry.conversion_frame_len(),
        adc.frame_16bit()
    );

    adc.write_register(Reg::ScratchPad.addr(), 0xa5)?;
    let scratch = adc.read_register(Reg::ScratchPad.addr())?.into_result()?;
    info!("scratch pad: {scratch:#04x}");

    for _ in 0..CONVERSIONS {
        let conversion = adc.read_conversion()?;

        if !conversion.is_trusted() {
            warn!("untrusted conversion {:02x?}", conversion.value.as_bytes());
            continue;
        }

        info!(
            "code {:>8} status {:02x?} ({:?})",
            conversion.value.code(),
            conversion.value.status(),
            conversion.integrity
        );
    }

    Ok(())
}
