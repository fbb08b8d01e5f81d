//! Elemental host kernel emission.
//!
//! Turns a single elementwise node, or a loop fusion of elementwise nodes,
//! into a host kernel: a loop nest over the output shape whose body evaluates
//! each output element. Kernels may be partitioned along their outer
//! dimensions so that a runtime can execute partitions in parallel.
//!
//! # Architecture
//!
//! - **Partitioning**: [`partition`] splits outer dimensions into contiguous chunks
//! - **Kernel IR**: [`kernel`] is the structured form loop emitters build
//! - **Emission**: [`emitter`] selects a loop strategy and drives emission
//! - **LLVM**: [`llvm`] renders kernel modules as textual LLVM IR
//!
//! # Usage
//!
//! ```ignore
//! use strata_codegen::ElementalKernelEmitter;
//!
//! let spec = ElementalKernelEmitter::new(node).emit_kernel_spec()?;
//! println!("{}", spec.source().to_llvm_ir());
//! ```

pub mod bounds;
pub mod elemental;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod kernel;
pub mod kernel_api;
pub mod llvm;
pub mod loops;
pub mod partition;
pub mod spec;


pub use bounds::{BoundsTable, ParallelPartitionBounds, emit_parallel_partition_bounds};
pub use elemental::ElementalGenerator;
pub use emitter::{ElementalKernelEmitter, LoopStrategy, emit_elemental_loops, select_strategy};
pub use error::*;
pub use generator::{ElementGenerator, GeneratorContext, OperandReader};
pub use kernel_api::{KernelApiIrBuilder, KernelApiOptions, KernelPrototype, ThreadId};
pub use partition::{ShapePartitionAssigner, ShapePartitionIterator, assign_outer_dimension_partitions};
pub use spec::{BufferAllocation, BufferUse, KernelSource, KernelSpec, MemoryAccess, ThreadDim};
