use std::any::Any;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};

use cubecl::client::ComputeClient;
use cubecl::prelude::*;
use cubecl::server::Handle;

use super::device::{Device, Kernel};
use crate::error::{Error, Result};
use crate::kernels::{amplitude_kernel, combine_kernel};
use crate::WORKGROUP_SIZE;

/// Most cubes a WebGPU dispatch accepts along one grid dimension
/// (`maxComputeWorkgroupsPerDimension`). CUDA allows more along `x`, but the
/// same grid shape is used everywhere.
pub const MAX_CUBES_PER_DIM: u32 = 65_535;

/// Element type of device buffers.
pub trait DeviceFloat: Float + CubeElement {
    fn from_host(value: f64) -> Self;
    fn to_host(self) -> f64;
}

impl DeviceFloat for f32 {
    fn from_host(value: f64) -> Self {
        value as f32
    }

    fn to_host(self) -> f64 {
        f64::from(self)
    }
}

impl DeviceFloat for f64 {
    fn from_host(value: f64) -> Self {
        value
    }

    fn to_host(self) -> f64 {
        self
    }
}

/// Shape `(x, y)` of a grid of `cube_size`-wide cubes covering `work_items`.
///
/// Cubes are laid out along `x` up to [`MAX_CUBES_PER_DIM`], then wrap into
/// further rows along `y`. `None` if even that does not fit.
///
/// ```
/// # use dft_offload::offload::cube_grid;
/// assert_eq!(cube_grid(1000, 256), Some((4, 1)));
/// assert_eq!(cube_grid(0, 256), Some((1, 1)));
/// ```
#[must_use]
pub fn cube_grid(work_items: usize, cube_size: u32) -> Option<(u32, u32)> {
    let cubes = work_items.div_ceil(cube_size as usize).max(1);
    let x = cubes.min(MAX_CUBES_PER_DIM as usize);
    let y = cubes.div_ceil(x);
    if y > MAX_CUBES_PER_DIM as usize {
        return None;
    }
    Some((u32::try_from(x).ok()?, u32::try_from(y).ok()?))
}

/// [`Device`] backed by a cubecl runtime (wgpu, CUDA, ...), storing and
/// computing in `F`.
///
/// cubecl reports device failures by panicking; every call into the runtime is
/// guarded and the panic message becomes the error of the failing transition.
pub struct CubeDevice<R: Runtime, F: DeviceFloat = f32> {
    device: R::Device,
    precision: PhantomData<F>,
}

impl<R: Runtime, F: DeviceFloat> CubeDevice<R, F> {
    pub fn new(device: R::Device) -> Self {
        Self {
            device,
            precision: PhantomData,
        }
    }
}

impl<R: Runtime, F: DeviceFloat> Default for CubeDevice<R, F>
where
    R::Device: Default,
{
    fn default() -> Self {
        Self::new(R::Device::default())
    }
}

pub struct CubeTarget<R: Runtime> {
    client: ComputeClient<R::Server, R::Channel>,
}

#[derive(Debug, Clone, Copy)]
pub struct CubeProgram {
    kernel: Kernel,
}

pub struct CubeBuffer {
    handle: Handle,
    len: usize,
}

impl<R: Runtime, F: DeviceFloat> Device for CubeDevice<R, F> {
    type Target = CubeTarget<R>;
    type Program = CubeProgram;
    type Buffer = CubeBuffer;

    fn name(&self) -> &'static str {
        R::name()
    }

    fn acquire_target(&self) -> Result<CubeTarget<R>> {
        let device = self.device.clone();
        let client = guarded(|| R::client(&device)).map_err(Error::TargetUnavailable)?;
        Ok(CubeTarget { client })
    }

    fn build_program(&self, target: &CubeTarget<R>, kernel: Kernel) -> Result<CubeProgram> {
        // cubecl compiles lazily on first launch. A one-cube launch over
        // single-element buffers triggers compilation now, with the same cube
        // dimension, so the real dispatch hits the cache.
        guarded(|| warm_up::<R, F>(&target.client, kernel)).map_err(|log| {
            Error::CompileError {
                kernel: kernel.name(),
                log,
            }
        })?;
        Ok(CubeProgram { kernel })
    }

    fn create_input(&self, target: &CubeTarget<R>, data: &[f64]) -> Result<CubeBuffer> {
        let values: Vec<F> = data.iter().map(|&v| F::from_host(v)).collect();
        let bytes = std::mem::size_of_val(values.as_slice());
        let handle = guarded(|| target.client.create(F::as_bytes(&values)))
            .map_err(|reason| Error::AllocationError { bytes, reason })?;
        Ok(CubeBuffer {
            handle,
            len: data.len(),
        })
    }

    fn create_output(&self, target: &CubeTarget<R>, len: usize) -> Result<CubeBuffer> {
        let bytes = len * core::mem::size_of::<F>();
        let handle = guarded(|| target.client.empty(bytes))
            .map_err(|reason| Error::AllocationError { bytes, reason })?;
        Ok(CubeBuffer { handle, len })
    }

    fn dispatch(
        &self,
        target: &CubeTarget<R>,
        program: &CubeProgram,
        args: &[&CubeBuffer],
    ) -> Result<()> {
        let kernel = program.kernel;
        let grid = cube_grid(kernel.work_items(), WORKGROUP_SIZE).ok_or_else(|| {
            Error::DispatchError(format!(
                "{} work-items exceed the {MAX_CUBES_PER_DIM}x{MAX_CUBES_PER_DIM} cube grid",
                kernel.work_items()
            ))
        })?;
        let args: Vec<(&Handle, usize)> = args.iter().map(|b| (&b.handle, b.len)).collect();
        guarded(|| launch::<R, F>(&target.client, kernel, grid, &args))
            .map_err(Error::DispatchError)
    }

    fn read(&self, target: &CubeTarget<R>, buffer: &CubeBuffer) -> Result<Vec<f64>> {
        let bytes = guarded(|| target.client.read_one(buffer.handle.clone().binding()))
            .map_err(Error::ReadbackError)?;
        let values = F::from_bytes(&bytes);
        if values.len() < buffer.len {
            return Err(Error::ReadbackError(format!(
                "expected {} values, device returned {}",
                buffer.len,
                values.len()
            )));
        }
        Ok(values[..buffer.len].iter().map(|&v| v.to_host()).collect())
    }

    fn release_buffer(&self, _target: &CubeTarget<R>, buffer: CubeBuffer) {
        drop(buffer.handle);
    }

    fn release_program(&self, _target: &CubeTarget<R>, _program: CubeProgram) {
        // Compiled pipelines stay in the client's cache and go away with it.
    }

    fn release_target(&self, target: CubeTarget<R>) {
        drop(target.client);
    }
}

fn launch<R: Runtime, F: DeviceFloat>(
    client: &ComputeClient<R::Server, R::Channel>,
    kernel: Kernel,
    (x, y): (u32, u32),
    args: &[(&Handle, usize)],
) {
    let count = CubeCount::Static(x, y, 1);
    let dim = CubeDim::new(WORKGROUP_SIZE, 1, 1);
    unsafe {
        match kernel {
            Kernel::Amplitude { .. } => amplitude_kernel::launch_unchecked::<F, R>(
                client,
                count,
                dim,
                ArrayArg::from_raw_parts::<F>(args[0].0, args[0].1, 1),
                ArrayArg::from_raw_parts::<F>(args[1].0, args[1].1, 1),
                ArrayArg::from_raw_parts::<F>(args[2].0, args[2].1, 1),
                ArrayArg::from_raw_parts::<F>(args[3].0, args[3].1, 1),
            ),
            Kernel::Combine { .. } => combine_kernel::launch_unchecked::<F, R>(
                client,
                count,
                dim,
                ArrayArg::from_raw_parts::<F>(args[0].0, args[0].1, 1),
                ArrayArg::from_raw_parts::<F>(args[1].0, args[1].1, 1),
                ArrayArg::from_raw_parts::<F>(args[2].0, args[2].1, 1),
            ),
        }
    }
}

fn warm_up<R: Runtime, F: DeviceFloat>(
    client: &ComputeClient<R::Server, R::Channel>,
    kernel: Kernel,
) {
    let zero = [F::from_host(0.0)];
    let handles: Vec<Handle> = (0..kernel.arity())
        .map(|_| client.create(F::as_bytes(&zero)))
        .collect();
    let args: Vec<(&Handle, usize)> = handles.iter().map(|h| (h, 1)).collect();
    launch::<R, F>(client, kernel, (1, 1), &args);
    if let Some(last) = handles.last() {
        let _ = client.read_one(last.clone().binding());
    }
}

/// Runs `f`, turning a panic into its message.
fn guarded<T>(f: impl FnOnce() -> T) -> std::result::Result<T, String> {
    catch_unwind(AssertUnwindSafe(f)).map_err(panic_message)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
