//! Audio source nodes (generators with no audio inputs)

mod binaural;
mod noise;

pub use binaural::Binaural;
pub use noise::Noise;
