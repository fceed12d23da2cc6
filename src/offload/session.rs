use std::time::Instant;

use super::device::{Device, Kernel};
use crate::bench::Timed;
use crate::error::{Error, Result};

/// Progress of one offload run.
///
/// Stages only move forward. Any failed transition jumps to [`Stage::Failed`];
/// a session closed without failing finishes in [`Stage::Released`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Uninitialized,
    TargetAcquired,
    ProgramBuilt,
    BuffersCreated,
    ArgumentsBound,
    Dispatched,
    ResultRead,
    Released,
    Failed,
}

/// Index of a buffer created by a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferId(usize);

/// Buffers bound to the built kernel's parameters, in declaration order.
///
/// Only [`Session::bind`] creates this, so a dispatch can never precede binding.
#[derive(Debug)]
pub struct Arguments {
    ids: Vec<BufferId>,
}

/// Scoped ownership of every device resource used by one run.
///
/// Resources are acquired through the session in the order
/// target → program → buffers and are released in the reverse order by
/// [`Session::close`], or by `Drop` when the session goes out of scope early,
/// whatever stage the run reached. Early returns with `?` and panics therefore
/// tear down everything acquired so far.
pub struct Session<'d, D: Device> {
    device: &'d D,
    target: Option<D::Target>,
    program: Option<(Kernel, D::Program)>,
    buffers: Vec<D::Buffer>,
    stage: Stage,
    dispatched_at: Option<Instant>,
}

impl<'d, D: Device> Session<'d, D> {
    /// Selects a compute target on `device`.
    pub fn open(device: &'d D) -> Result<Self> {
        log::debug!("{}: acquiring compute target", device.name());
        let target = device.acquire_target().inspect_err(|err| {
            log::warn!("{}: {err}", device.name());
        })?;
        Ok(Self {
            device,
            target: Some(target),
            program: None,
            buffers: Vec::new(),
            stage: Stage::TargetAcquired,
            dispatched_at: None,
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Releases every resource and returns the terminal stage:
    /// [`Stage::Released`], or [`Stage::Failed`] if a transition failed.
    pub fn close(mut self) -> Stage {
        self.teardown();
        self.stage
    }

    fn target(&self) -> &D::Target {
        self.target
            .as_ref()
            .unwrap_or_else(|| unreachable!("the target is held until teardown"))
    }

    /// Compiles `kernel` for the selected target.
    pub fn build(&mut self, kernel: Kernel) -> Result<()> {
        debug_assert_eq!(self.stage, Stage::TargetAcquired, "program built out of order");
        log::debug!("{}: building {}", self.device.name(), kernel.name());
        match self.device.build_program(self.target(), kernel) {
            Ok(program) => {
                self.program = Some((kernel, program));
                self.advance(Stage::ProgramBuilt);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Uploads `data` into a new read-only buffer.
    pub fn create_input(&mut self, data: &[f64]) -> Result<BufferId> {
        let created = self.device.create_input(self.target(), data);
        self.register(created)
    }

    /// Allocates an uninitialised read-write buffer of `len` elements.
    pub fn create_output(&mut self, len: usize) -> Result<BufferId> {
        let created = self.device.create_output(self.target(), len);
        self.register(created)
    }

    fn register(&mut self, created: Result<D::Buffer>) -> Result<BufferId> {
        debug_assert!(
            matches!(self.stage, Stage::ProgramBuilt | Stage::BuffersCreated),
            "buffer created out of order"
        );
        match created {
            Ok(buffer) => {
                self.buffers.push(buffer);
                self.advance(Stage::BuffersCreated);
                Ok(BufferId(self.buffers.len() - 1))
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Associates `ids` with the kernel parameters, in order.
    ///
    /// # Panics
    ///
    /// If no program was built, or `ids` does not match the kernel's parameter
    /// count. Both are programming errors rather than runtime conditions.
    pub fn bind(&mut self, ids: &[BufferId]) -> Arguments {
        let Some((kernel, _)) = &self.program else {
            panic!("arguments bound before a program was built");
        };
        assert_eq!(
            ids.len(),
            kernel.arity(),
            "{} declares {} buffer parameters",
            kernel.name(),
            kernel.arity()
        );
        assert!(
            ids.iter().all(|id| id.0 < self.buffers.len()),
            "argument refers to a buffer of another session"
        );
        self.advance(Stage::ArgumentsBound);
        Arguments { ids: ids.to_vec() }
    }

    /// Submits the kernel over its work-item grid. Does not wait for completion.
    pub fn dispatch(&mut self, args: &Arguments) -> Result<()> {
        let Some((kernel, program)) = &self.program else {
            unreachable!("Arguments exist only after a program was built");
        };
        log::debug!(
            "{}: dispatching {} over {} work-items",
            self.device.name(),
            kernel.name(),
            kernel.work_items()
        );
        let buffers: Vec<&D::Buffer> = args.ids.iter().map(|id| &self.buffers[id.0]).collect();
        self.dispatched_at = Some(Instant::now());
        match self.device.dispatch(self.target(), program, &buffers) {
            Ok(()) => {
                self.advance(Stage::Dispatched);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Blocking read of `id` back to the host.
    ///
    /// The elapsed time spans from kernel submission to the end of the copy.
    pub fn read(&mut self, id: BufferId) -> Result<Timed<Vec<f64>>> {
        debug_assert_eq!(self.stage, Stage::Dispatched, "read before dispatch");
        match self.device.read(self.target(), &self.buffers[id.0]) {
            Ok(values) => {
                let elapsed = self
                    .dispatched_at
                    .map(|start| start.elapsed())
                    .unwrap_or_default();
                self.advance(Stage::ResultRead);
                Ok(Timed::new(values, elapsed))
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn advance(&mut self, stage: Stage) {
        self.stage = stage;
    }

    fn fail(&mut self, err: Error) -> Error {
        log::warn!(
            "{}: failed after {:?}, tearing down: {err}",
            self.device.name(),
            self.stage
        );
        self.stage = Stage::Failed;
        err
    }
}

impl<D: Device> Session<'_, D> {
    /// Releases whatever is still held. Safe to call more than once.
    fn teardown(&mut self) {
        let Some(target) = self.target.take() else {
            return;
        };
        while let Some(buffer) = self.buffers.pop() {
            log::trace!("{}: releasing buffer {}", self.device.name(), self.buffers.len());
            self.device.release_buffer(&target, buffer);
        }
        if let Some((kernel, program)) = self.program.take() {
            log::trace!("{}: releasing {}", self.device.name(), kernel.name());
            self.device.release_program(&target, program);
        }
        log::trace!("{}: releasing compute target", self.device.name());
        self.device.release_target(target);
        if self.stage != Stage::Failed {
            self.stage = Stage::Released;
        }
        log::debug!("{}: session ended in {:?}", self.device.name(), self.stage);
    }
}

impl<D: Device> Drop for Session<'_, D> {
    fn drop(&mut self) {
        self.teardown();
    }
}
