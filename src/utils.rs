/// Returns the `n_total / 2 + 1` unique positive-frequency bins (0 Hz … Nyquist) for a
/// real-valued DFT of `n_total` samples at `sample_rate` Hz.
///
/// # Example
///
/// ```
/// # use dft_offload::utils::calculate_one_sided_frequencies;
/// let freqs = calculate_one_sided_frequencies(1000, 200.0);
/// assert_eq!(freqs.len(), 501);       // n/2 + 1
/// assert_eq!(freqs[0], 0.0);          // DC
/// assert!((freqs[500] - 100.0).abs() < 1e-4); // Nyquist = sample_rate / 2
/// ```
#[must_use]
pub fn calculate_one_sided_frequencies(n_total: usize, sample_rate: f32) -> Vec<f32> {
    (0..=n_total / 2)
        .map(|k| k as f32 * sample_rate / n_total as f32)
        .collect()
}

/// Finds the dominant frequencies of an amplitude spectrum by looking for local
/// peaks above a threshold.
///
/// A peak is a bin whose value exceeds both immediate neighbours and the threshold.
/// The first and last bins are never reported (they cannot be local peaks).
/// `frequencies` may be longer than `amplitudes`; only the first
/// `amplitudes.len()` entries are used.
///
/// # Example
///
/// ```
/// # use dft_offload::utils::find_dominant_frequencies;
/// let amplitudes = vec![0.1, 0.5, 0.3, 0.7, 0.2];
/// let frequencies = vec![0.0f32, 100.0, 200.0, 300.0, 400.0];
/// let dominant = find_dominant_frequencies(&amplitudes, &frequencies, 0.4);
/// assert_eq!(dominant, vec![(100.0, 0.5), (300.0, 0.7)]);
/// ```
#[must_use]
pub fn find_dominant_frequencies(
    amplitudes: &[f64],
    frequencies: &[f32],
    threshold: f64,
) -> Vec<(f32, f64)> {
    assert!(
        frequencies.len() >= amplitudes.len(),
        "need a frequency for every amplitude bin"
    );
    (1..amplitudes.len().saturating_sub(1))
        .filter(|&i| {
            amplitudes[i] > amplitudes[i - 1]
                && amplitudes[i] > amplitudes[i + 1]
                && amplitudes[i] > threshold
        })
        .map(|i| (frequencies[i], amplitudes[i]))
        .collect()
}

/// Largest deviation between two spectra, relative to the reference's peak.
///
/// Bins near zero carry mostly rounding noise, so each difference is scaled by
/// the largest reference amplitude rather than by its own bin. Returns
/// `f64::INFINITY` when the lengths differ and `0.0` for an all-zero reference
/// that matches exactly.
///
/// # Example
///
/// ```
/// # use dft_offload::utils::max_relative_deviation;
/// let reference = [100.0, 1.0, 0.0];
/// let candidate = [100.05, 1.0, 0.02];
/// assert!((max_relative_deviation(&reference, &candidate) - 5e-4).abs() < 1e-9);
/// ```
#[must_use]
pub fn max_relative_deviation(reference: &[f64], candidate: &[f64]) -> f64 {
    if reference.len() != candidate.len() {
        return f64::INFINITY;
    }
    let peak = reference.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    let worst = reference
        .iter()
        .zip(candidate)
        .fold(0.0f64, |acc, (r, c)| acc.max((r - c).abs()));
    if worst == 0.0 {
        0.0
    } else if peak == 0.0 {
        f64::INFINITY
    } else {
        worst / peak
    }
}
