use std::f64::consts::TAU;

/// Cosine and sine of the `n` roots of unity, `angle(k) = 2π·k / n`.
///
/// The DFT term for bin `f` and sample `t` has angle `2π·f·t / n`, which only
/// depends on `f·t mod n`. One table of `n` entries therefore covers every bin,
/// and indexing it with an exact integer phase keeps the angle free of the
/// rounding error that `f·t` would accumulate in floating point.
///
/// The same table is uploaded as two read-only input buffers for the device
/// kernel, in the device's precision.
#[derive(Debug, Clone)]
pub struct Twiddles {
    cos: Vec<f64>,
    sin: Vec<f64>,
}

impl Twiddles {
    /// Tabulates the `n` roots of unity.
    ///
    /// # Example
    ///
    /// ```
    /// # use dft_offload::twiddles::Twiddles;
    /// let table = Twiddles::new(4);
    /// assert_eq!(table.len(), 4);
    /// assert!((table.cos(2) + 1.0).abs() < 1e-12);
    /// assert!((table.sin(1) - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn new(n: usize) -> Self {
        let step = TAU / n as f64;
        let (cos, sin) = (0..n)
            .map(|k| {
                let angle = step * k as f64;
                (angle.cos(), angle.sin())
            })
            .unzip();
        Self { cos, sin }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cos.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn cos(&self, phase: usize) -> f64 {
        self.cos[phase]
    }

    #[inline]
    #[must_use]
    pub fn sin(&self, phase: usize) -> f64 {
        self.sin[phase]
    }

    /// The cosine column, `cos(2π·k / n)` for `k` in `0..n`.
    #[must_use]
    pub fn cos_values(&self) -> &[f64] {
        &self.cos
    }

    #[must_use]
    pub fn sin_values(&self) -> &[f64] {
        &self.sin
    }
}
