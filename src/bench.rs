//! Wall-clock measurement around backend invocations.
//!
//! Two intervals are kept per run:
//!
//! - `elapsed` — the work being compared. For the serial backend this is the
//!   whole computation; for the offload backend it starts right before kernel
//!   submission and ends when the blocking read-back returns, so device
//!   execution is included but target setup and kernel compilation are not.
//! - `wall` — the complete backend call as seen by the caller.

use std::time::{Duration, Instant};

use crate::backend::SpectrumBackend;
use crate::error::Result;

/// A value together with the time it took to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    pub fn new(value: T, elapsed: Duration) -> Self {
        Self { value, elapsed }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Timed<U> {
        Timed::new(f(self.value), self.elapsed)
    }
}

impl<T, E> Timed<std::result::Result<T, E>> {
    /// Moves the error out so a failed run carries no timing.
    pub fn transpose(self) -> std::result::Result<Timed<T>, E> {
        let elapsed = self.elapsed;
        self.value.map(|value| Timed::new(value, elapsed))
    }
}

/// Runs `f` and records how long it took.
///
/// # Example
///
/// ```
/// # use dft_offload::bench::measure;
/// let timed = measure(|| 2 + 2);
/// assert_eq!(timed.value, 4);
/// ```
pub fn measure<T>(f: impl FnOnce() -> T) -> Timed<T> {
    let start = Instant::now();
    let value = f();
    Timed::new(value, start.elapsed())
}

/// One benchmarked backend invocation.
#[derive(Debug, Clone)]
pub struct Measurement<T> {
    pub backend: &'static str,
    pub values: Vec<T>,
    pub elapsed: Duration,
    pub wall: Duration,
}

impl<T> Measurement<T> {
    /// `elapsed` as fractional seconds.
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Times `backend` computing the amplitude spectrum of `signal`.
pub fn run_amplitudes<B: SpectrumBackend + ?Sized>(
    backend: &B,
    signal: &[i32],
    bins: usize,
) -> Result<Measurement<f64>> {
    let outer = measure(|| backend.timed_amplitudes(signal, bins));
    let inner = outer.value?;
    log::debug!(
        "{} amplitudes: {} bins in {:?} (wall {:?})",
        backend.name(),
        bins,
        inner.elapsed,
        outer.elapsed
    );
    Ok(Measurement {
        backend: backend.name(),
        values: inner.value,
        elapsed: inner.elapsed,
        wall: outer.elapsed,
    })
}

/// Times `backend` computing `lhs + rhs`.
pub fn run_combine<B: SpectrumBackend + ?Sized>(
    backend: &B,
    lhs: &[f32],
    rhs: &[f32],
) -> Result<Measurement<f32>> {
    let outer = measure(|| backend.timed_combine(lhs, rhs));
    let inner = outer.value?;
    log::debug!(
        "{} combine: {} elements in {:?} (wall {:?})",
        backend.name(),
        lhs.len(),
        inner.elapsed,
        outer.elapsed
    );
    Ok(Measurement {
        backend: backend.name(),
        values: inner.value,
        elapsed: inner.elapsed,
        wall: outer.elapsed,
    })
}

/// Formats a duration as `seconds.microseconds`, e.g. `0.004215`.
///
/// ```
/// # use std::time::Duration;
/// # use dft_offload::bench::format_seconds;
/// assert_eq!(format_seconds(Duration::from_micros(1_500_250)), "1.500250");
/// ```
pub fn format_seconds(elapsed: Duration) -> String {
    format!("{}.{:06}", elapsed.as_secs(), elapsed.subsec_micros())
}
