//! Error types for host kernel execution.

use snafu::Snafu;

/// Result type for runtime operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur during kernel execution.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Codegen error occurred.
    #[snafu(display("Codegen error: {source}"), context(false))]
    Codegen { source: strata_codegen::Error },

    /// Thread id outside the kernel's thread dim.
    #[snafu(display("Thread id {thread_id} out of range for {count} partitions"))]
    ThreadIdOutOfRange { thread_id: u64, count: u64 },

    /// Wrong number of argument buffers.
    #[snafu(display("Kernel '{kernel}' expects {expected} argument buffers, got {actual}"))]
    BufferCount { kernel: String, expected: usize, actual: usize },

    /// Argument buffer length differs from its shape's element count.
    #[snafu(display("Argument {index} holds {actual} elements, shape requires {expected}"))]
    BufferSize { index: usize, expected: usize, actual: usize },

    /// Two invocations wrote the same result element.
    #[snafu(display("Result {result} element {offset} written by more than one invocation"))]
    OverlappingWrite { result: usize, offset: usize },

    /// No invocation wrote this result element.
    #[snafu(display("Result {result} element {offset} was not written by any invocation"))]
    UnwrittenElement { result: usize, offset: usize },

    /// Kernel reads a value, loop variable or global that is not bound.
    #[snafu(display("Unbound value '{name}'"))]
    UnboundValue { name: String },

    /// Element access outside the buffer's shape.
    #[snafu(display("Index {index:?} out of bounds for shape {shape}"))]
    IndexOutOfBounds { index: Vec<i64>, shape: String },

    /// Element expression used where an index was expected.
    #[snafu(display("Expected an index expression, found {found}"))]
    NotAnIndex { found: &'static str },
}
