//! Built-in audio nodes.
//!
//! ## Sources ([`source`])
//!
//! - [`Noise`] - White, pink or brown noise from a [`NoiseKernel`](crate::kernel::NoiseKernel)
//! - [`Binaural`] - Two sine oscillators, hard left and hard right
//!
//! ## Effects ([`effect`])
//!
//! - [`Gain`] - Volume stage, one per generator
//! - [`Mixer`] - Master mix at the end of every render graph
//!
//! Nodes with runtime settings read them from a shared
//! [`param`](crate::param) once per block.

pub mod source;
pub mod effect;

pub use source::{Binaural, Noise};
pub use effect::{Gain, Mixer};
