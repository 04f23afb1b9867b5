//! Rauschen - ambient noise and binaural tones on a real-time audio graph
//!
//! Design principles:
//! - Each generator is a source node plus a gain node, attached to an output's
//!   master mix only while it plays
//! - Graph changes travel to the audio thread through a ring buffer;
//!   volume and frequency are shared latest-value atomics
//! - No locks, allocation or deallocation on the audio thread
//! - Many generators share one device stream
//!
//! ```no_run
//! use rauschen::{BinauralTone, Generator, NoiseGenerator, NoiseKind};
//!
//! let mut pink = NoiseGenerator::new(NoiseKind::Pink);
//! pink.start()?;
//!
//! let mut tone = BinauralTone::shared().with_frequency(200.0, 10.0)?;
//! tone.toggle()?;
//! tone.set_volume(0.2)?;
//! # Ok::<(), rauschen::Error>(())
//! ```

mod node;
mod graph;
mod render;
mod output;
mod device;
mod error;
mod signal_graph;
mod generator;
pub mod kernel;
pub mod nodes;
pub mod param;

pub use node::{AudioNode, ProcessContext};
pub use render::Renderer;
pub use output::{Output, OutputConfig};
pub use device::{shared_output, CpalDevice};
pub use error::{Error, Result};
pub use generator::{
    BinauralTone, Generator, NoiseGenerator, DEFAULT_BASE_FREQUENCY, DEFAULT_BEAT_FREQUENCY,
    DEFAULT_VOLUME,
};
pub use kernel::NoiseKind;
