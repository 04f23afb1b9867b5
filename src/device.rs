//! CPAL device discovery and the process-wide shared output.
//!
//! # Example: List and Open a Device
//!
//! ```no_run
//! use rauschen::{CpalDevice, OutputConfig};
//!
//! for (i, device) in CpalDevice::list_outputs().iter().enumerate() {
//!     println!("[{}] {} ({} Hz, {} ch)",
//!         i, device.name(), device.sample_rate(), device.channels());
//! }
//!
//! let device = CpalDevice::default_output().expect("no output device");
//! let output = device.open(&OutputConfig::default()).expect("device busy");
//! ```

use std::sync::{Mutex, PoisonError};

#[cfg(feature = "cpal_sink")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "cpal_sink")]
use std::sync::{mpsc, Arc};

#[cfg(feature = "cpal_sink")]
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::info;
#[cfg(feature = "cpal_sink")]
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
#[cfg(feature = "cpal_sink")]
use crate::output::StreamGuard;
use crate::output::{Output, OutputConfig};
#[cfg(feature = "cpal_sink")]
use crate::render::Renderer;

/// A discovered audio output device.
///
/// Use [`CpalDevice::default_output`] for the system default or
/// [`CpalDevice::list_outputs`] to enumerate, then [`open`](Self::open) it to
/// get an [`Output`].
pub struct CpalDevice {
    #[cfg(feature = "cpal_sink")]
    device: cpal::Device,
    #[cfg(feature = "cpal_sink")]
    config: cpal::SupportedStreamConfig,

    name: String,
    sample_rate: u32,
    channels: u16,
}

impl CpalDevice {
    /// The system's default output device, if there is one.
    #[cfg(feature = "cpal_sink")]
    pub fn default_output() -> Option<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;
        Self::describe(device)
    }

    #[cfg(not(feature = "cpal_sink"))]
    pub fn default_output() -> Option<Self> {
        None
    }

    /// All output devices that report a usable default configuration.
    #[cfg(feature = "cpal_sink")]
    pub fn list_outputs() -> Vec<Self> {
        let host = cpal::default_host();
        host.output_devices()
            .map(|devices| devices.filter_map(Self::describe).collect())
            .unwrap_or_default()
    }

    #[cfg(not(feature = "cpal_sink"))]
    pub fn list_outputs() -> Vec<Self> {
        Vec::new()
    }

    #[cfg(feature = "cpal_sink")]
    fn describe(device: cpal::Device) -> Option<Self> {
        let config = device.default_output_config().ok()?;
        let name = device.name().unwrap_or_else(|_| "Unknown".into());
        Some(Self {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
            name,
            device,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Start a stream on this device and return its [`Output`].
    ///
    /// The stream runs on its own thread (cpal streams are not `Send` on
    /// every platform); this call waits at most `config.init_timeout` for it
    /// to come up. The stream stops when the last clone of the returned
    /// output is dropped.
    #[cfg(feature = "cpal_sink")]
    pub fn open(&self, config: &OutputConfig) -> Result<Output> {
        let sample_format = self.config.sample_format();
        let mut stream_config = self.config.config();
        if let Some(frames) = config.buffer_frames {
            stream_config.buffer_size = cpal::BufferSize::Fixed(frames);
        }

        let (pending, renderer) = Output::split(self.sample_rate, self.channels, config.clone());
        let alive = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = mpsc::sync_channel::<std::result::Result<(), String>>(1);

        let device = self.device.clone();
        let stream_alive = alive.clone();
        let stream_shutdown = shutdown.clone();
        let thread = std::thread::Builder::new()
            .name(format!("rauschen-output ({})", self.name))
            .spawn(move || {
                let stream = match build_stream(&device, sample_format, &stream_config, renderer, stream_alive) {
                    Ok(stream) => stream,
                    Err(reason) => {
                        let _ = ready_tx.send(Err(reason));
                        return;
                    }
                };
                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                // The stream lives as long as this thread
                while !stream_shutdown.load(Ordering::Acquire) {
                    std::thread::park();
                }
                debug!("output stream thread exiting");
            })
            .map_err(|e| Error::DeviceUnavailable(e.to_string()))?;

        match ready_rx.recv_timeout(config.init_timeout) {
            Ok(Ok(())) => {
                info!(
                    device = %self.name,
                    sample_rate = self.sample_rate,
                    channels = self.channels,
                    format = ?sample_format,
                    "opened output stream"
                );
                let guard = StreamGuard::new(shutdown, thread);
                Ok(pending.finish(self.name.clone(), alive, Some(guard)))
            }
            Ok(Err(reason)) => {
                warn!(device = %self.name, %reason, "could not open output stream");
                Err(Error::DeviceUnavailable(reason))
            }
            Err(_) => {
                // Don't join: the thread may still be stuck inside the backend.
                // It exits on its own once the stream comes up.
                shutdown.store(true, Ordering::Release);
                thread.thread().unpark();
                warn!(device = %self.name, timeout = ?config.init_timeout, "output stream did not start in time");
                Err(Error::DeviceUnavailable(format!(
                    "{} did not start within {:?}",
                    self.name, config.init_timeout
                )))
            }
        }
    }

    #[cfg(not(feature = "cpal_sink"))]
    pub fn open(&self, _config: &OutputConfig) -> Result<Output> {
        Err(Error::DeviceUnavailable("built without the cpal_sink feature".into()))
    }
}

#[cfg(feature = "cpal_sink")]
fn build_stream(
    device: &cpal::Device,
    sample_format: cpal::SampleFormat,
    stream_config: &cpal::StreamConfig,
    renderer: Renderer,
    alive: Arc<AtomicBool>,
) -> std::result::Result<cpal::Stream, String> {
    use cpal::SampleFormat;

    let stream = match sample_format {
        SampleFormat::F32 => build_typed(device, stream_config, renderer, alive, |s: f32| s),
        SampleFormat::I16 => build_typed(device, stream_config, renderer, alive, |s: f32| {
            (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
        }),
        SampleFormat::U16 => build_typed(device, stream_config, renderer, alive, |s: f32| {
            ((s.clamp(-1.0, 1.0) + 1.0) * 0.5 * u16::MAX as f32) as u16
        }),
        other => return Err(format!("unsupported sample format: {other:?}")),
    };
    stream.map_err(|e| e.to_string())
}

#[cfg(feature = "cpal_sink")]
fn build_typed<T, F>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    mut renderer: Renderer,
    alive: Arc<AtomicBool>,
    convert: F,
) -> std::result::Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample,
    F: Fn(f32) -> T + Copy + Send + 'static,
{
    device.build_output_stream(
        stream_config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| renderer.render_with(data, convert),
        move |err| {
            error!("output stream error: {err}");
            if matches!(err, cpal::StreamError::DeviceNotAvailable) {
                alive.store(false, Ordering::Release);
            }
        },
        None,
    )
}

static SHARED_OUTPUT: Mutex<Option<Output>> = Mutex::new(None);

/// The process-wide default output, opened on first use.
///
/// Every generator built without an explicit [`Output`] plays through this
/// one stream. It stays open for the life of the process. If opening fails,
/// nothing is cached and the next call tries again; if the device later goes
/// away, the next call reopens it.
pub fn shared_output() -> Result<Output> {
    let mut shared = SHARED_OUTPUT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(output) = shared.as_ref().filter(|o| o.is_available()) {
        return Ok(output.clone());
    }

    let output = open_default()?;
    info!(device = %output.name(), "shared output ready");
    *shared = Some(output.clone());
    Ok(output)
}

fn open_default() -> Result<Output> {
    let device = CpalDevice::default_output()
        .ok_or_else(|| Error::DeviceUnavailable("no default output device".into()))?;
    device.open(&OutputConfig::default())
}
