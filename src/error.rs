use thiserror::Error;

/// Failure kinds of a spectrum computation.
///
/// [`SerialBackend`](crate::serial::SerialBackend) can only fail with
/// [`Error::InvalidArgument`]. Every other variant belongs to one transition of
/// the offload state machine (see [`Stage`](crate::offload::Stage)) and is
/// reported after everything acquired so far has been released.
#[derive(Debug, Error)]
pub enum Error {
    /// Signal length or bin count out of range, or mismatched input lengths.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No compute target (device + queue) could be acquired.
    #[error("no compute target available: {0}")]
    TargetUnavailable(String),

    /// The device compiler rejected the kernel. `log` is its diagnostic, verbatim.
    #[error("failed to build kernel `{kernel}`:\n{log}")]
    CompileError { kernel: &'static str, log: String },

    /// Device memory could not satisfy a buffer request.
    #[error("failed to allocate {bytes} bytes of device memory: {reason}")]
    AllocationError { bytes: usize, reason: String },

    /// The kernel could not be submitted for execution.
    #[error("kernel dispatch failed: {0}")]
    DispatchError(String),

    /// The blocking read of the output buffer failed.
    #[error("result read-back failed: {0}")]
    ReadbackError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
