pub mod backend;
pub mod bench;
pub mod engine;
pub mod error;
pub mod kernels;
pub mod offload;
pub mod serial;
pub mod signal;
pub mod twiddles;
pub mod utils;

pub use backend::SpectrumBackend;
pub use error::{Error, Result};
pub use offload::{CubeDevice, OffloadBackend};
pub use serial::SerialBackend;

// The general advice for WebGPU is to choose a workgroup size of 64
// Common sizes are 32, 64, 128, 256, or 512 threads per workgroup.
// 256 is the default invocation limit of a WebGPU device.
pub(crate) const WORKGROUP_SIZE: u32 = 256;

// WebGPU has no f64; the kernel compensates its f32 sums instead.
#[cfg(feature = "wgpu")]
type Runtime = cubecl::wgpu::WgpuRuntime;
#[cfg(feature = "wgpu")]
type Precision = f32;

#[cfg(all(feature = "cuda", not(feature = "wgpu")))]
type Runtime = cubecl::cuda::CudaRuntime;
#[cfg(all(feature = "cuda", not(feature = "wgpu")))]
type Precision = f64;

/// The device backend on the runtime selected by cargo features
/// (`wgpu` in `f32` by default, `cuda` in `f64` otherwise).
pub type DefaultOffload = OffloadBackend<CubeDevice<Runtime, Precision>>;

/// Creates an [`OffloadBackend`] on the default device of the selected runtime.
///
/// No device work happens here; the target is acquired by each computation.
#[must_use]
pub fn offload_backend() -> DefaultOffload {
    OffloadBackend::new(CubeDevice::default())
}

/// Computes the amplitude spectrum of `signal` for bins `0..bins` on the host.
///
/// # Parameters
///
/// - `signal`: The samples, in time order.
/// - `bins`: How many frequency bins to compute, at most `signal.len()`.
///
/// # Returns
///
/// A vector of `bins` non-negative amplitudes, `amplitude[f] = |X[f]|`.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `signal` is empty or `bins > signal.len()`.
///
/// # Example
///
/// ```
/// use dft_offload::amplitudes;
/// let spectrum = amplitudes(&[3, 0, 0, 0], 4).unwrap();
/// assert!(spectrum.iter().all(|a| (a - 3.0).abs() < 1e-12));
/// ```
pub fn amplitudes(signal: &[i32], bins: usize) -> Result<Vec<f64>> {
    SerialBackend.amplitudes(signal, bins)
}

/// Computes the amplitude spectrum of `signal` on the default accelerator.
///
/// Accumulates in `f64` on CUDA and in compensated `f32` on wgpu; expect
/// agreement with [`amplitudes`] to within about 1e-3 of the spectrum's peak
/// on wgpu, far closer on CUDA.
///
/// # Errors
///
/// [`Error::InvalidArgument`] for bad sizes, otherwise the error of whichever
/// device transition failed. All device resources are released either way.
///
/// # Example
///
/// ```no_run
/// use dft_offload::offload_amplitudes;
/// let spectrum = offload_amplitudes(&[3, 0, 0, 0], 4).unwrap();
/// assert_eq!(spectrum.len(), 4);
/// ```
pub fn offload_amplitudes(signal: &[i32], bins: usize) -> Result<Vec<f64>> {
    offload_backend().amplitudes(signal, bins)
}
