//! Per-generator lifecycle: Idle ⇄ Playing.

use tracing::{debug, info, warn};

use crate::device::shared_output;
use crate::error::{check_volume, Error, Result};
use crate::node::AudioNode;
use crate::nodes::Gain;
use crate::output::Output;
use crate::param::Level;
use crate::render::Voice;

/// Where a generator sends its audio.
#[derive(Clone, Debug)]
pub(crate) enum Target {
    /// The process-wide default output, opened on first start
    Shared,
    Fixed(Output),
}

impl Target {
    fn resolve(&self) -> Result<Output> {
        match self {
            Target::Shared => shared_output(),
            Target::Fixed(output) => Ok(output.clone()),
        }
    }
}

/// Everything that exists only while playing.
struct Active<C> {
    output: Output,
    voice: Voice,
    gain: Level,
    /// Whatever live settings the source shares besides its gain
    control: C,
}

/// One generator's slice of the render graph: a source and its gain stage,
/// wired into the output's master mix while playing.
///
/// `active.is_some()` is the playing flag, so playing always implies an
/// attached source and gain, and idle implies neither.
pub(crate) struct SignalGraph<C> {
    name: &'static str,
    target: Target,
    volume: f32,
    active: Option<Active<C>>,
}

impl<C> SignalGraph<C> {
    pub fn new(name: &'static str, target: Target, volume: f32) -> Self {
        Self {
            name,
            target,
            volume,
            active: None,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// The output currently in use, if playing.
    pub fn output(&self) -> Option<&Output> {
        self.active.as_ref().map(|a| &a.output)
    }

    /// Store the volume and, if playing, hand it to the live gain stage.
    pub fn set_volume(&mut self, volume: f32) -> Result<()> {
        let volume = check_volume(volume)?;
        self.volume = volume;
        if let Some(active) = &self.active {
            active.gain.set(volume);
        }
        Ok(())
    }

    /// Build a fresh source with `build` and attach it. No-op when already playing.
    ///
    /// `build` returns the node and the control it shares with it. On failure
    /// nothing is attached and the graph stays idle.
    pub fn start<N>(&mut self, build: impl FnOnce() -> (N, C)) -> Result<bool>
    where
        N: AudioNode,
    {
        if self.is_playing() {
            return Ok(true);
        }

        let output = self.target.resolve()?;
        if !output.is_available() {
            return Err(Error::DeviceUnavailable(format!("{} is not running", output.name())));
        }
        output.collect_retired();

        let (node, control) = build();
        let gain = Level::new(self.volume);
        let source = output.prepare(node);
        let gain_stage = output.prepare(Gain::with_level(gain.clone()));
        let voice = Voice {
            source: source.id(),
            gain: gain_stage.id(),
        };

        if !output.attach(voice, source, gain_stage) {
            warn!(generator = self.name, output = %output.name(), "could not attach to output");
            return Err(Error::DeviceUnavailable(format!("{} is not accepting new voices", output.name())));
        }

        info!(generator = self.name, output = %output.name(), volume = self.volume, "started");
        self.active = Some(Active {
            output,
            voice,
            gain,
            control,
        });
        Ok(true)
    }

    /// Detach and release everything. No-op when idle.
    pub fn stop(&mut self) -> bool {
        match self.active.take() {
            Some(Active { output, voice, .. }) => {
                // The render side owns the nodes; they come back through the retired queue.
                output.detach(voice);
                output.collect_retired();
                info!(generator = self.name, "stopped");
            }
            None => debug!(generator = self.name, "stop while idle"),
        }
        false
    }

    /// The live control shared with the source, if playing.
    pub fn control(&self) -> Option<&C> {
        self.active.as_ref().map(|a| &a.control)
    }
}

impl<C> Drop for SignalGraph<C> {
    fn drop(&mut self) {
        self.stop();
    }
}
