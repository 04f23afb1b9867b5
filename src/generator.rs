//! Noise and binaural generators with a uniform play/stop/volume contract.

use crate::error::{check_frequencies, Error, Result};
use crate::kernel::NoiseKind;
use crate::nodes::{Binaural, Noise};
use crate::output::Output;
use crate::param::FrequencyPair;
use crate::signal_graph::{SignalGraph, Target};

/// Volume every generator starts with.
pub const DEFAULT_VOLUME: f32 = 0.5;
/// Binaural base frequency before any `set_frequency` call, in Hz.
pub const DEFAULT_BASE_FREQUENCY: f32 = 440.0;
/// Binaural beat before any `set_frequency` call, in Hz (alpha band).
pub const DEFAULT_BEAT_FREQUENCY: f32 = 7.0;

/// Something that can be started, stopped and turned up or down.
///
/// Starting builds everything from scratch: a stopped generator keeps no
/// filter or oscillator state, only its settings.
pub trait Generator {
    /// Display name, e.g. `"PinkNoise"` or `"BinauralTone"`.
    fn name(&self) -> &'static str;

    /// Start playing. Returns the playing state.
    ///
    /// Calling this while already playing changes nothing and returns `Ok(true)`.
    /// Fails with [`Error::DeviceUnavailable`] if the output cannot be reached,
    /// leaving the generator stopped.
    fn start(&mut self) -> Result<bool>;

    /// Stop playing and release the render-side state. Returns the playing
    /// state, which is always `false`.
    fn stop(&mut self) -> bool;

    /// Stop if playing, start if not.
    fn toggle(&mut self) -> Result<bool> {
        if self.is_playing() {
            Ok(self.stop())
        } else {
            self.start()
        }
    }

    /// Set the volume, in `[0, 1]`. Takes effect immediately when playing and
    /// is kept for the next start otherwise.
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    fn volume(&self) -> f32;

    fn is_playing(&self) -> bool;

    /// Set the binaural base and beat frequencies.
    ///
    /// Only binaural generators have frequencies; the rest return
    /// [`Error::UnsupportedOperation`].
    fn set_frequency(&mut self, _base: f32, _beat: f32) -> Result<()> {
        Err(Error::UnsupportedOperation("set_frequency on a noise generator"))
    }
}

/// White, pink or brown noise.
///
/// ```no_run
/// use rauschen::{Generator, NoiseGenerator, NoiseKind};
///
/// let mut brown = NoiseGenerator::new(NoiseKind::Brown);
/// brown.set_volume(0.3)?;
/// brown.start()?;
/// # Ok::<(), rauschen::Error>(())
/// ```
pub struct NoiseGenerator {
    kind: NoiseKind,
    seed: Option<u64>,
    graph: SignalGraph<()>,
}

impl NoiseGenerator {
    /// A generator that plays through the shared default output.
    pub fn new(kind: NoiseKind) -> Self {
        Self::with_target(kind, Target::Shared)
    }

    /// A generator that plays through `output`.
    pub fn with_output(kind: NoiseKind, output: &Output) -> Self {
        Self::with_target(kind, Target::Fixed(output.clone()))
    }

    fn with_target(kind: NoiseKind, target: Target) -> Self {
        Self {
            kind,
            seed: None,
            graph: SignalGraph::new(kind.name(), target, DEFAULT_VOLUME),
        }
    }

    /// Make every start produce the same sample sequence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Result<Self> {
        self.graph.set_volume(volume)?;
        Ok(self)
    }

    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    /// The output this generator is playing through, if playing.
    pub fn output(&self) -> Option<&Output> {
        self.graph.output()
    }
}

impl Generator for NoiseGenerator {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn start(&mut self) -> Result<bool> {
        let (kind, seed) = (self.kind, self.seed);
        self.graph.start(|| {
            let noise = match seed {
                Some(seed) => Noise::seeded(kind, seed),
                None => Noise::new(kind),
            };
            (noise, ())
        })
    }

    fn stop(&mut self) -> bool {
        self.graph.stop()
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.graph.set_volume(volume)
    }

    fn volume(&self) -> f32 {
        self.graph.volume()
    }

    fn is_playing(&self) -> bool {
        self.graph.is_playing()
    }
}

/// Two sine tones, base frequency in the left ear and base + beat in the right.
///
/// ```no_run
/// use rauschen::{BinauralTone, Generator};
///
/// let mut tone = BinauralTone::shared();
/// tone.set_frequency(200.0, 10.0)?;
/// tone.start()?;
/// # Ok::<(), rauschen::Error>(())
/// ```
pub struct BinauralTone {
    base: f32,
    beat: f32,
    graph: SignalGraph<FrequencyPair>,
}

impl BinauralTone {
    const NAME: &'static str = "BinauralTone";

    /// A tone that plays through `output`.
    pub fn new(output: &Output) -> Self {
        Self::with_target(Target::Fixed(output.clone()))
    }

    /// A tone that plays through the shared default output.
    pub fn shared() -> Self {
        Self::with_target(Target::Shared)
    }

    fn with_target(target: Target) -> Self {
        Self {
            base: DEFAULT_BASE_FREQUENCY,
            beat: DEFAULT_BEAT_FREQUENCY,
            graph: SignalGraph::new(Self::NAME, target, DEFAULT_VOLUME),
        }
    }

    pub fn with_frequency(mut self, base: f32, beat: f32) -> Result<Self> {
        self.set_frequency(base, beat)?;
        Ok(self)
    }

    pub fn with_volume(mut self, volume: f32) -> Result<Self> {
        self.graph.set_volume(volume)?;
        Ok(self)
    }

    pub fn base_frequency(&self) -> f32 {
        self.base
    }

    pub fn beat_frequency(&self) -> f32 {
        self.beat
    }

    /// The output this tone is playing through, if playing.
    pub fn output(&self) -> Option<&Output> {
        self.graph.output()
    }
}

impl Generator for BinauralTone {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn start(&mut self) -> Result<bool> {
        let (base, beat) = (self.base, self.beat);
        self.graph.start(|| {
            let frequency = FrequencyPair::new(base, beat);
            (Binaural::with_frequency(frequency.clone()), frequency)
        })
    }

    fn stop(&mut self) -> bool {
        self.graph.stop()
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.graph.set_volume(volume)
    }

    fn volume(&self) -> f32 {
        self.graph.volume()
    }

    fn is_playing(&self) -> bool {
        self.graph.is_playing()
    }

    fn set_frequency(&mut self, base: f32, beat: f32) -> Result<()> {
        let (base, beat) = check_frequencies(base, beat)?;
        self.base = base;
        self.beat = beat;
        if let Some(frequency) = self.graph.control() {
            frequency.set(base, beat);
        }
        Ok(())
    }
}
