use crate::error::{Error, Result};
use crate::twiddles::Twiddles;

/// Checks a signal length `n` and a bin count `bins` against each other.
///
/// `n` must be non-zero and `bins` must not exceed `n`. `bins == 0` is valid
/// and yields an empty spectrum.
pub fn validate(n: usize, bins: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::InvalidArgument("signal is empty".into()));
    }
    if bins > n {
        return Err(Error::InvalidArgument(format!(
            "requested {bins} frequency bins from a signal of {n} samples"
        )));
    }
    Ok(())
}

/// Computes the amplitude spectrum of `signal` for bins `0..bins`.
///
/// ```text
/// re(f)        =  Σ_t s[t]·cos(2π·f·t / n)
/// im(f)        = −Σ_t s[t]·sin(2π·f·t / n)
/// amplitude(f) =  sqrt(re(f)² + im(f)²)
/// ```
///
/// Every bin starts from zeroed accumulators and visits all `n` samples.
/// Accumulation is done in `f64`. The result is a fresh vector of exactly
/// `bins` values and is bit-identical across calls on the same input.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `signal` is empty or `bins > signal.len()`.
///
/// # Example
///
/// ```
/// # use dft_offload::engine::amplitude_spectrum;
/// let amplitudes = amplitude_spectrum(&[1, 1, 1, 1], 4).unwrap();
/// assert_eq!(amplitudes.len(), 4);
/// assert!((amplitudes[0] - 4.0).abs() < 1e-12);
/// assert!(amplitudes[1..].iter().all(|a| a.abs() < 1e-12));
/// ```
pub fn amplitude_spectrum(signal: &[i32], bins: usize) -> Result<Vec<f64>> {
    validate(signal.len(), bins)?;
    let twiddles = Twiddles::new(signal.len());
    Ok((0..bins)
        .map(|f| bin_amplitude(signal, &twiddles, f))
        .collect())
}

/// Amplitude of a single bin `f`. `twiddles` must have been built for `signal.len()`.
pub fn bin_amplitude(signal: &[i32], twiddles: &Twiddles, f: usize) -> f64 {
    let n = signal.len();
    let mut re = 0.0f64;
    let mut im = 0.0f64;
    // phase == (f * t) mod n, advanced incrementally so it never overflows
    let mut phase = 0usize;
    for &sample in signal {
        let s = f64::from(sample);
        re += s * twiddles.cos(phase);
        im -= s * twiddles.sin(phase);
        phase += f;
        if phase >= n {
            phase -= n;
        }
    }
    re.hypot(im)
}

/// Element-wise sum `lhs[i] + rhs[i]`, the simplified vector benchmark.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if the inputs are empty or differ in length.
///
/// # Example
///
/// ```
/// # use dft_offload::engine::combine;
/// assert_eq!(combine(&[1.0, 2.0], &[10.0, 20.0]).unwrap(), vec![11.0, 22.0]);
/// ```
pub fn combine(lhs: &[f32], rhs: &[f32]) -> Result<Vec<f32>> {
    validate_pair(lhs, rhs)?;
    Ok(lhs.iter().zip(rhs).map(|(a, b)| a + b).collect())
}

pub(crate) fn validate_pair(lhs: &[f32], rhs: &[f32]) -> Result<()> {
    if lhs.is_empty() {
        return Err(Error::InvalidArgument("vectors are empty".into()));
    }
    if lhs.len() != rhs.len() {
        return Err(Error::InvalidArgument(format!(
            "vector lengths differ ({} vs {})",
            lhs.len(),
            rhs.len()
        )));
    }
    Ok(())
}
