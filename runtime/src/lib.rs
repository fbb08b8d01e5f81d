//! Host reference execution for elemental kernels.
//!
//! Runs the kernel modules produced by `strata-codegen` without a JIT: every
//! thread id of a kernel's thread dim is one invocation, and invocations are
//! executed in parallel on rayon's thread pool. Used to check that partitioned
//! kernels write every output element exactly once.

pub mod error;
pub mod executor;


pub use error::*;
pub use executor::{HostKernel, Write};
