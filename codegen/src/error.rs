//! Error types for code generation.

use snafu::Snafu;
use strata_ir::{ElementType, Opcode};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur during kernel emission.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Node produces several results but its opcode cannot share one loop nest between them.
    #[snafu(display("Multi-output host kernels are not supported for {opcode} instruction"))]
    UnsupportedMultiOutput { opcode: Opcode },

    /// The elemental generator has no lowering for this opcode.
    #[snafu(display("Unsupported elemental opcode: {opcode}"))]
    UnsupportedOpcode { opcode: Opcode },

    /// The opcode has no lowering for this element type.
    #[snafu(display("Opcode {opcode} does not support element type {element_type}"))]
    UnsupportedElementType { opcode: Opcode, element_type: ElementType },

    /// A generator referenced a kernel argument that the prototype does not have.
    #[snafu(display("Kernel argument {index} out of range ({count} arguments)"))]
    MissingArgument { index: usize, count: usize },

    /// Fusion node has no fused root for the requested output.
    #[snafu(display("Fusion '{node}' has no fused root for output {output}"))]
    MissingFusedRoot { node: String, output: usize },

    /// Node lacks data it needs to be lowered.
    #[snafu(display("Node '{node}' is missing {what}"))]
    Missing { node: String, what: &'static str },

    /// Operand dimensions differ from the dimensions of the elementwise result.
    #[snafu(display("Operand {operand} of '{node}' has shape {actual}, expected dimensions of {expected}"))]
    OperandShape { node: String, operand: usize, expected: String, actual: String },

    /// Results of a multi-result loop do not share dimensions.
    #[snafu(display("Kernel '{kernel}' result {result} has shape {actual}, expected dimensions of {expected}"))]
    ResultShapeMismatch { kernel: String, result: usize, expected: String, actual: String },

    /// Kernel prototype declares no result buffers.
    #[snafu(display("Kernel '{kernel}' has no result buffers"))]
    NoResults { kernel: String },

    /// Error from IR layer.
    #[snafu(display("IR error: {source}"), context(false))]
    Ir { source: strata_ir::Error },
}
