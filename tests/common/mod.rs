//! Shared test helpers compiled into every integration-test binary.
//! Items may not all be used in every binary, so dead_code is suppressed.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use dft_offload::offload::{Device, Kernel, Stage};
use dft_offload::{DefaultOffload, Error, Result, SpectrumBackend};

/// Maximum deviation tolerated between device (compensated f32) and host (f64)
/// spectra, relative to the spectrum's peak.
pub const TOLERANCE: f64 = 1e-3;

/// Absolute tolerance for values that are analytically exact.
pub const EPSILON: f64 = 1e-6;

pub fn assert_approx(actual: f64, expected: f64, label: &str) {
    assert!(
        (actual - expected).abs() <= EPSILON,
        "{}: got {:.6}, expected {:.6}  (diff {:.2e})",
        label,
        actual,
        expected,
        (actual - expected).abs(),
    );
}

/// Every bin of `actual` within `TOLERANCE · peak(expected)` of `expected`.
pub fn assert_spectrum_close(actual: &[f64], expected: &[f64], label: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{}: length mismatch ({} vs {})",
        label,
        actual.len(),
        expected.len()
    );
    let peak = expected.iter().fold(1.0f64, |acc, v| acc.max(v.abs()));
    for (i, (&a, &e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            (a - e).abs() <= TOLERANCE * peak,
            "{}[{}]: got {:.6}, expected {:.6}  (diff {:.2e}, peak {:.3e})",
            label,
            i,
            a,
            e,
            (a - e).abs(),
            peak,
        );
    }
}

/// Set on machines that have an accelerator, so a missing one fails the GPU
/// tests instead of skipping them.
pub const REQUIRE_GPU_VAR: &str = "DFT_OFFLOAD_REQUIRE_GPU";

/// The default accelerator, or `None` (with a note on stderr) when the machine
/// has none and [`REQUIRE_GPU_VAR`] is unset.
pub fn accelerator() -> Option<DefaultOffload> {
    let backend = dft_offload::offload_backend();
    match backend.amplitudes(&[1], 1) {
        Err(Error::TargetUnavailable(reason)) => {
            if std::env::var_os(REQUIRE_GPU_VAR).is_some() {
                panic!("{REQUIRE_GPU_VAR} is set but no compute target is available: {reason}");
            }
            eprintln!("Skipping: no compute target available ({reason})");
            None
        }
        _ => Some(backend),
    }
}

// ── Mock device ──────────────────────────────────────────────────────────────

/// A resource handed out by [`MockDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Target,
    Program,
    Buffer(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Acquire(Resource),
    Release(Resource),
    Dispatch(&'static str, usize),
    Read(usize),
}

/// Host-emulated [`Device`] that records every acquire/release and can be
/// told to fail the transition into a given [`Stage`].
///
/// Buffers hold `f32` like the wgpu device, and dispatch repeats the kernels'
/// arithmetic operation for operation, compensated sums included.
#[derive(Default)]
pub struct MockDevice {
    fail_at: Option<Stage>,
    fail_on_buffer: usize,
    next_buffer: Cell<usize>,
    created_buffers: Cell<usize>,
    memory: RefCell<HashMap<usize, Vec<f32>>>,
    events: RefCell<Vec<Event>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the transition into `stage`. For `BuffersCreated` the first buffer
    /// request fails unless [`failing_on_buffer`](Self::failing_on_buffer) says otherwise.
    pub fn failing_at(mut self, stage: Stage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    pub fn failing_on_buffer(mut self, index: usize) -> Self {
        self.fail_on_buffer = index;
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn acquired(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Acquire(_)))
            .count()
    }

    pub fn released(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Release(_)))
            .count()
    }

    /// Resources acquired and not yet released.
    pub fn live(&self) -> Vec<Resource> {
        let mut live = Vec::new();
        for event in self.events() {
            match event {
                Event::Acquire(r) => live.push(r),
                Event::Release(r) => {
                    let pos = live
                        .iter()
                        .position(|&l| l == r)
                        .unwrap_or_else(|| panic!("{r:?} released without being acquired"));
                    live.remove(pos);
                }
                _ => {}
            }
        }
        live
    }

    fn fails(&self, stage: Stage) -> bool {
        self.fail_at == Some(stage)
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn store(&self, values: Vec<f32>) -> Result<usize> {
        let index = self.created_buffers.get();
        self.created_buffers.set(index + 1);
        if self.fails(Stage::BuffersCreated) && index == self.fail_on_buffer {
            return Err(Error::AllocationError {
                bytes: values.len() * 4,
                reason: "mock device out of memory".into(),
            });
        }
        let id = self.next_buffer.get();
        self.next_buffer.set(id + 1);
        self.memory.borrow_mut().insert(id, values);
        self.record(Event::Acquire(Resource::Buffer(id)));
        Ok(id)
    }
}

impl Device for MockDevice {
    type Target = ();
    type Program = Kernel;
    type Buffer = usize;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn acquire_target(&self) -> Result<()> {
        if self.fails(Stage::TargetAcquired) {
            return Err(Error::TargetUnavailable("mock device has no platforms".into()));
        }
        self.record(Event::Acquire(Resource::Target));
        Ok(())
    }

    fn build_program(&self, _target: &(), kernel: Kernel) -> Result<Kernel> {
        if self.fails(Stage::ProgramBuilt) {
            return Err(Error::CompileError {
                kernel: kernel.name(),
                log: "error: expected ';' at line 12".into(),
            });
        }
        self.record(Event::Acquire(Resource::Program));
        Ok(kernel)
    }

    fn create_input(&self, _target: &(), data: &[f64]) -> Result<usize> {
        self.store(data.iter().map(|&v| v as f32).collect())
    }

    fn create_output(&self, _target: &(), len: usize) -> Result<usize> {
        // Garbage rather than zeros, so an unwritten element shows up.
        self.store(vec![f32::NAN; len])
    }

    fn dispatch(&self, _target: &(), program: &Kernel, args: &[&usize]) -> Result<()> {
        if self.fails(Stage::Dispatched) {
            return Err(Error::DispatchError("mock queue rejected the kernel".into()));
        }
        assert_eq!(args.len(), program.arity(), "mock: argument count");
        self.record(Event::Dispatch(program.name(), program.work_items()));

        let mut memory = self.memory.borrow_mut();
        let input = |i: usize| memory[args[i]].clone();
        let result: Vec<f32> = match *program {
            Kernel::Amplitude { samples, bins } => {
                let (signal, cos, sin) = (input(0), input(1), input(2));
                assert_eq!(signal.len(), samples);
                (0..bins)
                    .map(|f| {
                        let (mut re, mut im) = (Compensated::default(), Compensated::default());
                        let mut phase = 0;
                        for (t, &sample) in signal.iter().enumerate() {
                            debug_assert_eq!(phase, (f * t) % samples);
                            re.add(sample * cos[phase]);
                            im.add(0.0 - sample * sin[phase]);
                            phase += f;
                            if phase >= samples {
                                phase -= samples;
                            }
                        }
                        let (re, im) = (re.total(), im.total());
                        (re * re + im * im).sqrt()
                    })
                    .collect()
            }
            Kernel::Combine { len } => {
                let (lhs, rhs) = (input(0), input(1));
                (0..len).map(|i| lhs[i] + rhs[i]).collect()
            }
        };
        let out = *args[program.arity() - 1];
        memory.insert(out, result);
        Ok(())
    }

    fn read(&self, _target: &(), buffer: &usize) -> Result<Vec<f64>> {
        if self.fails(Stage::ResultRead) {
            return Err(Error::ReadbackError("mock device lost".into()));
        }
        self.record(Event::Read(*buffer));
        Ok(self.memory.borrow()[buffer].iter().map(|&v| f64::from(v)).collect())
    }

    fn release_buffer(&self, _target: &(), buffer: usize) {
        self.memory.borrow_mut().remove(&buffer);
        self.record(Event::Release(Resource::Buffer(buffer)));
    }

    fn release_program(&self, _target: &(), _program: Kernel) {
        self.record(Event::Release(Resource::Program));
    }

    fn release_target(&self, _target: ()) {
        self.record(Event::Release(Resource::Target));
    }
}

/// Neumaier running sum in `f32`, as `amplitude_kernel` keeps it.
#[derive(Default)]
struct Compensated {
    sum: f32,
    carry: f32,
}

impl Compensated {
    fn add(&mut self, term: f32) {
        let next = self.sum + term;
        if self.sum.abs() >= term.abs() {
            self.carry += (self.sum - next) + term;
        } else {
            self.carry += (term - next) + self.sum;
        }
        self.sum = next;
    }

    fn total(&self) -> f32 {
        self.sum + self.carry
    }
}
