//! Data-parallel execution on an accelerator.
//!
//! A run walks a linear state machine:
//!
//! ```text
//! Uninitialized → TargetAcquired → ProgramBuilt → BuffersCreated
//!   → ArgumentsBound → Dispatched → ResultRead → Released
//! ```
//!
//! Any failing transition moves to `Failed`. Either way every buffer, the
//! program and the target are released in reverse acquisition order, by
//! [`Session::close`] or when the [`Session`] goes out of scope. Nothing is
//! retried.

mod cube;
mod device;
mod session;

pub use cube::{
    cube_grid, CubeBuffer, CubeDevice, CubeProgram, CubeTarget, DeviceFloat, MAX_CUBES_PER_DIM,
};
pub use device::{Device, Kernel};
pub use session::{Arguments, BufferId, Session, Stage};

use crate::backend::SpectrumBackend;
use crate::bench::Timed;
use crate::engine;
use crate::error::Result;
use crate::twiddles::Twiddles;

/// Runs the spectrum computation on a [`Device`], one work-item per output element.
///
/// Each call opens its own [`Session`]; the target is never shared between runs.
pub struct OffloadBackend<D: Device> {
    device: D,
}

impl<D: Device> OffloadBackend<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: Device> SpectrumBackend for OffloadBackend<D> {
    fn name(&self) -> &'static str {
        self.device.name()
    }

    fn timed_amplitudes(&self, signal: &[i32], bins: usize) -> Result<Timed<Vec<f64>>> {
        engine::validate(signal.len(), bins)?;
        if bins == 0 {
            return Ok(Timed::new(Vec::new(), Default::default()));
        }

        let samples: Vec<f64> = signal.iter().map(|&s| f64::from(s)).collect();
        let twiddles = Twiddles::new(signal.len());

        let mut session = Session::open(&self.device)?;
        session.build(Kernel::Amplitude {
            samples: signal.len(),
            bins,
        })?;
        let input = session.create_input(&samples)?;
        let cos_table = session.create_input(twiddles.cos_values())?;
        let sin_table = session.create_input(twiddles.sin_values())?;
        let output = session.create_output(bins)?;
        let args = session.bind(&[input, cos_table, sin_table, output]);
        session.dispatch(&args)?;
        let amplitudes = session.read(output)?;
        session.close();

        Ok(amplitudes)
    }

    fn timed_combine(&self, lhs: &[f32], rhs: &[f32]) -> Result<Timed<Vec<f32>>> {
        engine::validate_pair(lhs, rhs)?;

        let mut session = Session::open(&self.device)?;
        session.build(Kernel::Combine { len: lhs.len() })?;
        let a = session.create_input(&widen(lhs))?;
        let b = session.create_input(&widen(rhs))?;
        let out = session.create_output(lhs.len())?;
        let args = session.bind(&[a, b, out]);
        session.dispatch(&args)?;
        let sums = session.read(out)?;
        session.close();

        Ok(sums.map(|values| values.into_iter().map(|v| v as f32).collect()))
    }
}

fn widen(values: &[f32]) -> Vec<f64> {
    values.iter().copied().map(f64::from).collect()
}
