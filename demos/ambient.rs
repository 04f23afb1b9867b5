//! Plays each noise color in turn, then a binaural tone, on the default output.
//!
//! `cargo run --example ambient`

use std::thread::sleep;
use std::time::Duration;

use rauschen::{BinauralTone, CpalDevice, Generator, NoiseGenerator, NoiseKind};

fn main() -> Result<(), rauschen::Error> {
    tracing_subscriber::fmt::init();

    for device in CpalDevice::list_outputs() {
        println!("{} ({} Hz, {} ch)", device.name(), device.sample_rate(), device.channels());
    }

    for kind in NoiseKind::ALL {
        let mut noise = NoiseGenerator::new(kind).with_volume(0.3)?;
        println!("playing {}", noise.name());
        noise.start()?;
        sleep(Duration::from_secs(3));
        noise.stop();
    }

    let mut tone = BinauralTone::shared().with_frequency(200.0, 10.0)?;
    println!("playing {} at {} Hz + {} Hz", tone.name(), tone.base_frequency(), tone.beat_frequency());
    tone.start()?;
    sleep(Duration::from_secs(3));

    // Shift into theta without stopping
    tone.set_frequency(200.0, 6.0)?;
    sleep(Duration::from_secs(3));

    let mut brown = NoiseGenerator::new(NoiseKind::Brown).with_volume(0.2)?;
    brown.toggle()?;
    sleep(Duration::from_secs(3));
    brown.toggle()?;
    tone.toggle()?;

    Ok(())
}
