use crate::bench::Timed;
use crate::error::Result;

/// The "compute spectrum" capability shared by the host and device backends.
///
/// Implementors provide the timed variants; `timed_*` reports only the work
/// being compared (see [`bench`](crate::bench)). The untimed variants discard
/// the measurement.
pub trait SpectrumBackend {
    /// Short label used in reports, e.g. `"serial"`.
    fn name(&self) -> &'static str;

    /// Amplitude spectrum of `signal` for bins `0..bins`, with elapsed time.
    fn timed_amplitudes(&self, signal: &[i32], bins: usize) -> Result<Timed<Vec<f64>>>;

    /// Element-wise `lhs + rhs`, with elapsed time.
    fn timed_combine(&self, lhs: &[f32], rhs: &[f32]) -> Result<Timed<Vec<f32>>>;

    fn amplitudes(&self, signal: &[i32], bins: usize) -> Result<Vec<f64>> {
        self.timed_amplitudes(signal, bins).map(|timed| timed.value)
    }

    fn combine(&self, lhs: &[f32], rhs: &[f32]) -> Result<Vec<f32>> {
        self.timed_combine(lhs, rhs).map(|timed| timed.value)
    }
}
