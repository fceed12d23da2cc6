//! Sample data for benchmarks and tests.
//!
//! Stand-ins for an external sample provider: deterministic, so every run of a
//! benchmark sees the same input.

use std::f64::consts::TAU;

/// Number of samples in the default audio scenario (4 s at 8 kHz).
pub const AUDIO_SAMPLES: usize = 32_000;

/// Sample rate of the default audio scenario, in Hz.
pub const AUDIO_SAMPLE_RATE: f32 = 8_000.0;

/// Tones (Hz, relative level) mixed into [`audio_clip`].
const CLIP_TONES: [(f64, f64); 3] = [(440.0, 0.5), (1_000.0, 0.3), (2_500.0, 0.15)];

/// Generates a 16-bit audio clip of `len` samples at `sample_rate` Hz.
///
/// The clip mixes a 440 Hz, a 1 kHz and a 2.5 kHz tone and stays within the
/// `i16` range.
///
/// # Example
///
/// ```
/// # use dft_offload::signal::audio_clip;
/// let clip = audio_clip(8_000, 8_000.0);
/// assert_eq!(clip.len(), 8_000);
/// assert!(clip.iter().all(|&s| s.abs() <= i16::MAX as i32));
/// ```
#[must_use]
pub fn audio_clip(len: usize, sample_rate: f32) -> Vec<i32> {
    let rate = f64::from(sample_rate);
    (0..len)
        .map(|n| {
            let t = n as f64 / rate;
            let mix: f64 = CLIP_TONES
                .iter()
                .map(|&(frequency, level)| level * (TAU * frequency * t).sin())
                .sum();
            (mix * f64::from(i16::MAX)).round() as i32
        })
        .collect()
}

/// A pure tone completing `bin` periods over `len` samples, peak `amplitude`.
///
/// Its spectrum peaks at bin `bin` (and at the mirror bin `len - bin`).
///
/// ```
/// # use dft_offload::signal::tone;
/// let s = tone(8, 2, 100);
/// assert_eq!(s, vec![0, 100, 0, -100, 0, 100, 0, -100]);
/// ```
#[must_use]
pub fn tone(len: usize, bin: usize, amplitude: i32) -> Vec<i32> {
    (0..len)
        .map(|t| {
            let phase = ((bin * t) % len) as f64 / len as f64;
            (f64::from(amplitude) * (TAU * phase).sin()).round() as i32
        })
        .collect()
}

/// Inputs of the vector benchmark: `a[i] = i`, `b[i] = 2·i`.
///
/// ```
/// # use dft_offload::signal::ramp_pair;
/// let (a, b) = ramp_pair(3);
/// assert_eq!(a, vec![0.0, 1.0, 2.0]);
/// assert_eq!(b, vec![0.0, 2.0, 4.0]);
/// ```
#[must_use]
pub fn ramp_pair(len: usize) -> (Vec<f32>, Vec<f32>) {
    (0..len).map(|i| (i as f32, (i * 2) as f32)).unzip()
}
