// Device kernels dispatched by `offload::cube`.
// The grid may span two dimensions (see `offload::cube_grid`); each work-item
// linearises its position to an output index, and work-items past the end of
// the output (grid rounded up to whole cubes) do nothing.
use cubecl::prelude::*;

/// Amplitude of frequency bin `f`, the work-item's linear index.
///
/// ```text
/// phase_t = (f · t) mod n
/// re      =  Σ signal[t] · cos_table[phase_t]
/// im      = −Σ signal[t] · sin_table[phase_t]
/// out[f]  = sqrt(re² + im²)
/// ```
///
/// `n = signal.len()`, the number of bins is `amplitudes.len()`. The phase is
/// advanced by `f` per sample and wrapped once, which is exact because `f < n`.
///
/// Both sums use Neumaier compensated summation. With `F = f64` this is close to
/// exact; with `F = f32` (WebGPU has no f64) it keeps a large DC offset from
/// swamping the small bins, which naive f32 accumulation over tens of thousands
/// of samples does.
#[cube(launch_unchecked)]
pub fn amplitude_kernel<F: Float>(
    signal: &Array<F>,
    cos_table: &Array<F>,
    sin_table: &Array<F>,
    amplitudes: &mut Array<F>,
) {
    let f = ABSOLUTE_POS_Y * CUBE_COUNT_X * CUBE_DIM_X + ABSOLUTE_POS_X;
    if f < amplitudes.len() {
        let n = signal.len();
        let mut re = F::new(0.0);
        let mut re_carry = F::new(0.0);
        let mut im = F::new(0.0);
        let mut im_carry = F::new(0.0);
        let mut phase = 0u32;

        for t in 0..n {
            let sample = signal[t];

            let term_re = sample * cos_table[phase];
            let next_re = re + term_re;
            if F::abs(re) >= F::abs(term_re) {
                re_carry += (re - next_re) + term_re;
            } else {
                re_carry += (term_re - next_re) + re;
            }
            re = next_re;

            let term_im = F::new(0.0) - sample * sin_table[phase];
            let next_im = im + term_im;
            if F::abs(im) >= F::abs(term_im) {
                im_carry += (im - next_im) + term_im;
            } else {
                im_carry += (term_im - next_im) + im;
            }
            im = next_im;

            phase += f;
            if phase >= n {
                phase -= n;
            }
        }

        let re_sum = re + re_carry;
        let im_sum = im + im_carry;
        amplitudes[f] = F::sqrt(re_sum * re_sum + im_sum * im_sum);
    }
}

/// `out[i] = lhs[i] + rhs[i]`.
#[cube(launch_unchecked)]
pub fn combine_kernel<F: Float>(lhs: &Array<F>, rhs: &Array<F>, out: &mut Array<F>) {
    let idx = ABSOLUTE_POS_Y * CUBE_COUNT_X * CUBE_DIM_X + ABSOLUTE_POS_X;
    if idx < out.len() {
        out[idx] = lhs[idx] + rhs[idx];
    }
}
