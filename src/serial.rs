use crate::backend::SpectrumBackend;
use crate::bench::{measure, Timed};
use crate::engine;
use crate::error::Result;

/// Runs [`engine`] directly on the calling thread.
///
/// Deterministic: the same input always produces bit-identical output, which
/// makes this backend the reference for checking device results.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl SerialBackend {
    pub fn new() -> Self {
        Self
    }
}

impl SpectrumBackend for SerialBackend {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn timed_amplitudes(&self, signal: &[i32], bins: usize) -> Result<Timed<Vec<f64>>> {
        measure(|| engine::amplitude_spectrum(signal, bins)).transpose()
    }

    fn timed_combine(&self, lhs: &[f32], rhs: &[f32]) -> Result<Timed<Vec<f32>>> {
        measure(|| engine::combine(lhs, rhs)).transpose()
    }
}
