use crate::error::Result;

/// A kernel together with the problem size it is dispatched over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    /// One work-item per frequency bin.
    ///
    /// Buffers, in order: `signal`, `cos_table`, `sin_table` (inputs, `samples`
    /// elements each) and `amplitudes` (output, `bins` elements).
    Amplitude { samples: usize, bins: usize },
    /// One work-item per element.
    ///
    /// Buffers, in order: `lhs`, `rhs` (inputs) and `out` (output), `len` elements each.
    Combine { len: usize },
}

impl Kernel {
    pub fn name(self) -> &'static str {
        match self {
            Self::Amplitude { .. } => "amplitude_kernel",
            Self::Combine { .. } => "combine_kernel",
        }
    }

    /// Number of buffer parameters the kernel declares.
    pub fn arity(self) -> usize {
        match self {
            Self::Amplitude { .. } => 4,
            Self::Combine { .. } => 3,
        }
    }

    /// Size of the work-item grid.
    pub fn work_items(self) -> usize {
        match self {
            Self::Amplitude { bins, .. } => bins,
            Self::Combine { len } => len,
        }
    }
}

/// A unified compute-offload interface.
///
/// Every `acquire`/`build`/`create` call hands out a resource that the caller
/// must return through the matching `release_*` call exactly once.
/// [`Session`](super::Session) takes care of that; nothing else should drive a
/// `Device` directly.
pub trait Device {
    /// Context plus command queue on one selected device.
    type Target;
    /// A kernel compiled for a target.
    type Program;
    /// Device-resident storage of floating-point values. The element
    /// precision on the device is the implementation's choice; host data
    /// crosses the interface as `f64`.
    type Buffer;

    /// Short label used in reports, e.g. `"wgpu"`.
    fn name(&self) -> &'static str;

    fn acquire_target(&self) -> Result<Self::Target>;

    fn build_program(&self, target: &Self::Target, kernel: Kernel) -> Result<Self::Program>;

    /// Read-only storage initialised from `data`.
    fn create_input(&self, target: &Self::Target, data: &[f64]) -> Result<Self::Buffer>;

    /// Read-write storage for `len` elements, contents unspecified.
    fn create_output(&self, target: &Self::Target, len: usize) -> Result<Self::Buffer>;

    /// Submits `program` over its work-item grid with `args` bound in
    /// declaration order. May return before the work completes.
    fn dispatch(
        &self,
        target: &Self::Target,
        program: &Self::Program,
        args: &[&Self::Buffer],
    ) -> Result<()>;

    /// Blocks until all submitted work finished, then copies `buffer` to the host.
    fn read(&self, target: &Self::Target, buffer: &Self::Buffer) -> Result<Vec<f64>>;

    fn release_buffer(&self, target: &Self::Target, buffer: Self::Buffer);

    fn release_program(&self, target: &Self::Target, program: Self::Program);

    fn release_target(&self, target: Self::Target);
}
