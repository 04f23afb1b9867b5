//! Effect nodes (inputs → outputs)

mod gain;
mod mixer;

pub use gain::Gain;
pub use mixer::Mixer;
