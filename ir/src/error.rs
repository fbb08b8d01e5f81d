use snafu::Snafu;

use crate::Dims;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Array dimensions must be strictly positive.
    #[snafu(display("invalid dimensions {dims:?}: every dimension must be positive"))]
    NonPositiveDimension { dims: Dims },

    /// Tuple shapes must hold at least one element.
    #[snafu(display("tuple shape must contain at least one element"))]
    EmptyTuple,

    /// Nested tuples are not addressable by the kernel ABI.
    #[snafu(display("nested tuple shapes are not supported"))]
    NestedTuple,

    /// An array shape was required but a tuple was found.
    #[snafu(display("expected array shape, got {shape}"))]
    ExpectedArray { shape: String },

    /// Backend configuration could not be serialized.
    #[snafu(display("failed to serialize backend config: {source}"))]
    SerializeBackendConfig { source: serde_json::Error },
}
