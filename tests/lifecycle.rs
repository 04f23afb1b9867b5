use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use rauschen::kernel::NoiseKernel;
use rauschen::{BinauralTone, Error, Generator, NoiseGenerator, NoiseKind, Output, OutputConfig, Renderer};

const RATE: u32 = 48_000;
const BLOCK: usize = 64;

fn stereo() -> (Output, Renderer) {
    Output::offline(RATE, 2)
}

fn left(frames: &[f32]) -> impl Iterator<Item = f32> + '_ {
    frames.chunks(2).map(|f| f[0])
}

#[test]
fn volume_is_readable_in_both_states() {
    let (output, mut renderer) = stereo();
    let mut brown = NoiseGenerator::with_output(NoiseKind::Brown, &output);

    brown.set_volume(0.3).unwrap();
    assert_eq!(brown.volume(), 0.3);

    brown.start().unwrap();
    renderer.render_frames(BLOCK);
    brown.set_volume(0.7).unwrap();
    assert_eq!(brown.volume(), 0.7);
    assert!(brown.is_playing());
}

#[test]
fn rejected_volume_changes_nothing() {
    let (output, _renderer) = stereo();
    let mut white = NoiseGenerator::with_output(NoiseKind::White, &output);
    white.set_volume(0.4).unwrap();

    for bad in [-0.1, 1.01, f32::NAN, f32::INFINITY] {
        let err = white.set_volume(bad).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "volume", .. }));
    }
    assert_eq!(white.volume(), 0.4);
    assert!(!white.is_playing());

    white.start().unwrap();
    assert!(white.set_volume(2.0).is_err());
    assert_eq!(white.volume(), 0.4);
    assert!(white.is_playing());
}

#[test]
fn volume_bounds_are_accepted() {
    let (output, _renderer) = stereo();
    let mut pink = NoiseGenerator::with_output(NoiseKind::Pink, &output);
    assert!(pink.set_volume(0.0).is_ok());
    assert!(pink.set_volume(1.0).is_ok());
}

#[test]
fn toggle_twice_returns_to_idle() {
    let (output, mut renderer) = stereo();
    let mut pink = NoiseGenerator::with_output(NoiseKind::Pink, &output);

    assert_eq!(pink.toggle(), Ok(true));
    renderer.render_frames(BLOCK);
    assert_eq!(pink.toggle(), Ok(false));
    assert!(!pink.is_playing());

    let silence = renderer.render_frames(BLOCK);
    assert!(silence.iter().all(|&s| s == 0.0));
}

#[test]
fn stop_while_idle_is_a_no_op() {
    let (output, _renderer) = stereo();
    let mut brown = NoiseGenerator::with_output(NoiseKind::Brown, &output);
    assert!(!brown.stop());
    assert!(!brown.stop());
    assert!(!brown.is_playing());
}

#[test]
fn redundant_start_keeps_the_stream_going() {
    let (output, mut renderer) = stereo();
    let mut pink = NoiseGenerator::with_output(NoiseKind::Pink, &output)
        .with_seed(42)
        .with_volume(1.0)
        .unwrap();
    let mut reference = NoiseKernel::seeded(NoiseKind::Pink, 42);

    assert_eq!(pink.start(), Ok(true));
    let first = renderer.render_frames(100);
    assert_eq!(pink.start(), Ok(true));
    let second = renderer.render_frames(100);

    for sample in left(&first).chain(left(&second)) {
        assert_eq!(sample, reference.next_sample());
    }
}

#[test]
fn restart_begins_from_fresh_filter_state() {
    let (output, mut renderer) = stereo();
    let mut brown = NoiseGenerator::with_output(NoiseKind::Brown, &output)
        .with_seed(9)
        .with_volume(1.0)
        .unwrap();

    brown.start().unwrap();
    let first = renderer.render_frames(BLOCK * 4);
    brown.stop();
    brown.start().unwrap();
    let again = renderer.render_frames(BLOCK * 4);

    // Same seed, filter back at zero: the same sequence from the top
    assert_eq!(first, again);

    let mut reference = NoiseKernel::seeded(NoiseKind::Brown, 9);
    for sample in left(&first) {
        assert_eq!(sample, reference.next_sample());
    }
}

#[test]
fn volume_change_applies_from_the_next_block() {
    let (output, mut renderer) = stereo();
    let mut white = NoiseGenerator::with_output(NoiseKind::White, &output)
        .with_seed(3)
        .with_volume(1.0)
        .unwrap();
    let mut reference = NoiseKernel::seeded(NoiseKind::White, 3);

    white.start().unwrap();
    let loud = renderer.render_frames(BLOCK);
    white.set_volume(0.25).unwrap();
    let quiet = renderer.render_frames(BLOCK);

    for sample in left(&loud) {
        assert_eq!(sample, reference.next_sample());
    }
    for sample in left(&quiet) {
        assert_eq!(sample, reference.next_sample() * 0.25);
    }
}

#[test]
fn volume_set_while_idle_is_used_on_start() {
    let (output, mut renderer) = stereo();
    let mut white = NoiseGenerator::with_output(NoiseKind::White, &output).with_seed(5);
    white.set_volume(0.5).unwrap();
    white.start().unwrap();

    let mut reference = NoiseKernel::seeded(NoiseKind::White, 5);
    for sample in left(&renderer.render_frames(BLOCK)) {
        assert_eq!(sample, reference.next_sample() * 0.5);
    }
}

#[test]
fn generated_noise_stays_in_range() {
    let (output, mut renderer) = stereo();
    let mut white = NoiseGenerator::with_output(NoiseKind::White, &output).with_volume(1.0).unwrap();
    let mut pink = NoiseGenerator::with_output(NoiseKind::Pink, &output).with_volume(0.2).unwrap();

    white.start().unwrap();
    let data = renderer.render_frames(4096);
    assert!(data.iter().all(|s| s.abs() <= 1.0));
    assert!(data.iter().any(|&s| s != 0.0));
    white.stop();

    pink.start().unwrap();
    renderer.render_frames(BLOCK);
    let data = renderer.render_frames(4096);
    assert!(data.iter().all(|s| s.abs() <= 1.0));
}

#[test]
fn generators_on_one_output_are_summed() {
    let (output, mut renderer) = stereo();
    let mut white = NoiseGenerator::with_output(NoiseKind::White, &output)
        .with_seed(1)
        .with_volume(0.5)
        .unwrap();
    let mut brown = NoiseGenerator::with_output(NoiseKind::Brown, &output)
        .with_seed(2)
        .with_volume(0.5)
        .unwrap();

    white.start().unwrap();
    brown.start().unwrap();

    let mut a = NoiseKernel::seeded(NoiseKind::White, 1);
    let mut b = NoiseKernel::seeded(NoiseKind::Brown, 2);
    for frame in renderer.render_frames(BLOCK * 2).chunks(2) {
        let expected = a.next_sample() * 0.5 + b.next_sample() * 0.5;
        assert!((frame[0] - expected).abs() < 1e-6);
        assert!((frame[1] - expected).abs() < 1e-6);
    }
}

#[test]
fn binaural_zero_beat_is_identical_in_both_ears() {
    let (output, mut renderer) = stereo();
    let mut tone = BinauralTone::new(&output).with_frequency(300.0, 0.0).unwrap();
    tone.start().unwrap();

    let data = renderer.render_frames(BLOCK * 8);
    for frame in data.chunks(2) {
        assert_eq!(frame[0], frame[1]);
        assert!(frame[0].abs() <= tone.volume());
    }
}

/// Phase pair of a binaural tone, advanced the way the oscillators do.
struct Phases {
    left: f64,
    right: f64,
}

impl Phases {
    fn step(phase: f64, frequency: f64) -> f64 {
        let next = (phase + TAU * frequency / RATE as f64).rem_euclid(TAU);
        if next >= TAU { 0.0 } else { next }
    }

    /// Check rendered stereo frames against sines at `base` and `base + beat`.
    fn follow(&mut self, frames: &[f32], base: f64, beat: f64) {
        for frame in frames.chunks(2) {
            assert!((frame[0] as f64 - self.left.sin()).abs() < 1e-6);
            assert!((frame[1] as f64 - self.right.sin()).abs() < 1e-6);
            self.left = Self::step(self.left, base);
            self.right = Self::step(self.right, base + beat);
        }
    }
}

fn tone_at(output: &Output, base: f32, beat: f32) -> BinauralTone {
    BinauralTone::new(output)
        .with_frequency(base, beat)
        .unwrap()
        .with_volume(1.0)
        .unwrap()
}

#[test]
fn binaural_frequency_changes_while_playing() {
    let (output, mut renderer) = stereo();
    let mut tone = tone_at(&output, 200.0, 0.0);
    tone.start().unwrap();

    let mut phases = Phases { left: 0.0, right: 0.0 };
    phases.follow(&renderer.render_frames(BLOCK), 200.0, 0.0);

    tone.set_frequency(440.0, 7.0).unwrap();
    assert!(tone.is_playing());
    assert_eq!(tone.base_frequency(), 440.0);
    assert_eq!(tone.beat_frequency(), 7.0);

    // Both ears pick up where they were, left at 440 Hz and right at 447 Hz
    phases.follow(&renderer.render_frames(BLOCK * 4), 440.0, 7.0);
}

#[test]
fn last_frequency_wins_after_a_burst_of_changes() {
    let (output, mut renderer) = stereo();
    let mut tone = tone_at(&output, 200.0, 0.0);
    tone.start().unwrap();

    let mut phases = Phases { left: 0.0, right: 0.0 };
    phases.follow(&renderer.render_frames(BLOCK), 200.0, 0.0);

    for i in 0..1000 {
        tone.set_frequency(100.0 + i as f32, 5.0).unwrap();
    }
    tone.set_frequency(440.0, 7.0).unwrap();

    phases.follow(&renderer.render_frames(BLOCK * 2), 440.0, 7.0);
}

#[test]
fn binaural_frequency_set_while_idle_is_kept() {
    let (output, _renderer) = stereo();
    let mut tone = BinauralTone::new(&output);
    tone.set_frequency(150.0, -4.0).unwrap();
    tone.start().unwrap();
    tone.stop();
    assert_eq!(tone.base_frequency(), 150.0);
    assert_eq!(tone.beat_frequency(), -4.0);
}

#[test]
fn noise_has_no_frequency() {
    let (output, _renderer) = stereo();
    let mut noise: Box<dyn Generator> = Box::new(NoiseGenerator::with_output(NoiseKind::Pink, &output));
    assert!(matches!(noise.set_frequency(100.0, 5.0), Err(Error::UnsupportedOperation(_))));
}

#[test]
fn start_fails_cleanly_without_a_renderer() {
    let (output, renderer) = stereo();
    drop(renderer);

    let mut pink = NoiseGenerator::with_output(NoiseKind::Pink, &output);
    pink.set_volume(0.6).unwrap();
    assert!(matches!(pink.start(), Err(Error::DeviceUnavailable(_))));
    assert!(!pink.is_playing());
    assert_eq!(pink.volume(), 0.6);

    let mut tone = BinauralTone::new(&output);
    assert!(matches!(tone.toggle(), Err(Error::DeviceUnavailable(_))));
    assert!(!tone.is_playing());
}

#[test]
fn stop_after_losing_the_renderer_returns_idle() {
    let (output, renderer) = stereo();
    let mut white = NoiseGenerator::with_output(NoiseKind::White, &output);
    white.start().unwrap();
    drop(renderer);

    assert!(!white.stop());
    assert!(!white.is_playing());
}

#[test]
fn dropping_a_playing_generator_silences_it() {
    let (output, mut renderer) = stereo();
    let mut white = NoiseGenerator::with_output(NoiseKind::White, &output);
    white.start().unwrap();
    renderer.render_frames(BLOCK);
    drop(white);

    let data = renderer.render_frames(BLOCK);
    assert!(data.iter().all(|&s| s == 0.0));
}

#[test]
fn generators_are_usable_as_trait_objects() {
    let (output, mut renderer) = stereo();
    let mut all: Vec<Box<dyn Generator>> = NoiseKind::ALL
        .iter()
        .map(|&kind| Box::new(NoiseGenerator::with_output(kind, &output)) as Box<dyn Generator>)
        .collect();
    all.push(Box::new(BinauralTone::new(&output)));

    let names: Vec<_> = all.iter().map(|g| g.name()).collect();
    assert_eq!(names, ["WhiteNoise", "PinkNoise", "BrownNoise", "BinauralTone"]);

    for g in all.iter_mut() {
        g.set_volume(0.1).unwrap();
        assert_eq!(g.toggle(), Ok(true));
    }
    let data = renderer.render_frames(BLOCK);
    assert!(data.iter().any(|&s| s != 0.0));
    for g in all.iter_mut() {
        assert_eq!(g.toggle(), Ok(false));
    }
}

#[test]
fn last_volume_wins_after_a_burst_of_changes() {
    let (output, mut renderer) = stereo();
    let mut white = NoiseGenerator::with_output(NoiseKind::White, &output)
        .with_seed(21)
        .with_volume(1.0)
        .unwrap();
    let mut reference = NoiseKernel::seeded(NoiseKind::White, 21);

    white.start().unwrap();
    for sample in left(&renderer.render_frames(BLOCK)) {
        assert_eq!(sample, reference.next_sample());
    }

    // Far more changes than fit between two blocks, as from a dragged slider
    for i in 0..1000 {
        white.set_volume((i % 100) as f32 / 100.0).unwrap();
    }
    white.set_volume(0.25).unwrap();
    assert_eq!(white.volume(), 0.25);

    for sample in left(&renderer.render_frames(BLOCK)) {
        assert_eq!(sample, reference.next_sample() * 0.25);
    }
}

#[test]
fn stop_never_waits_and_always_silences() {
    let config = OutputConfig::default()
        .with_command_capacity(2)
        .with_init_timeout(Duration::from_secs(5));
    let (output, mut renderer) = Output::offline_with(RATE, 2, config);
    let mut a = NoiseGenerator::with_output(NoiseKind::White, &output);
    let mut b = NoiseGenerator::with_output(NoiseKind::Brown, &output);

    assert_eq!(a.start(), Ok(true));
    // No room for a second voice plus both detaches until the renderer catches up
    assert!(matches!(b.start(), Err(Error::DeviceUnavailable(_))));
    assert!(!b.is_playing());

    let started = Instant::now();
    assert!(!a.stop());
    assert!(!b.stop());
    assert!(started.elapsed() < Duration::from_secs(1));

    let data = renderer.render_frames(BLOCK * 4);
    assert!(data.iter().all(|&s| s == 0.0));

    // Drained, the queue takes the second voice again
    assert_eq!(b.start(), Ok(true));
    assert!(!b.stop());
    assert!(renderer.render_frames(BLOCK).iter().all(|&s| s == 0.0));
}

#[test]
fn stopping_many_voices_before_any_render_silences_them_all() {
    let config = OutputConfig::default().with_command_capacity(8);
    let (output, mut renderer) = Output::offline_with(RATE, 2, config);

    let mut playing: Vec<NoiseGenerator> = Vec::new();
    for kind in NoiseKind::ALL {
        let mut g = NoiseGenerator::with_output(kind, &output);
        g.start().unwrap();
        playing.push(g);
    }
    renderer.render_frames(BLOCK);

    for g in playing.iter_mut() {
        assert!(!g.stop());
    }
    let data = renderer.render_frames(BLOCK);
    assert!(data.iter().all(|&s| s == 0.0));
}
