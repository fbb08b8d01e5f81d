//! Kernel specification: the packaged result of emitting one node.

use crate::kernel::KernelModule;
use crate::llvm;

/// Number of parallel invocations a kernel expects, per thread id axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadDim {
    pub x: u64,
    pub y: u64,
    pub z: u64,
}

impl ThreadDim {
    /// One-dimensional thread dim of `x` invocations.
    pub const fn new(x: u64) -> Self {
        Self { x, y: 1, z: 1 }
    }

    /// Total number of invocations.
    pub const fn total(&self) -> u64 {
        self.x * self.y * self.z
    }
}

impl Default for ThreadDim {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Buffer allocation backing kernel parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferAllocation {
    pub index: usize,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAccess {
    Read,
    Write,
}

/// One slice of an allocation touched by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferUse {
    pub allocation: usize,
    pub offset: u64,
    pub size: u64,
    pub access: MemoryAccess,
}

/// Generated kernel module and its entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelSource {
    module: KernelModule,
    entry_point: String,
}

impl KernelSource {
    pub fn new(module: KernelModule) -> Self {
        let entry_point = module.function.name.clone();
        Self { module, entry_point }
    }

    pub fn module(&self) -> &KernelModule {
        &self.module
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Render the module as textual LLVM IR.
    pub fn to_llvm_ir(&self) -> String {
        llvm::render(&self.module)
    }
}

/// Everything needed to launch a generated kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelSpec {
    thread_dim: ThreadDim,
    buffer_allocations: Vec<BufferAllocation>,
    buffer_uses: Vec<BufferUse>,
    source: KernelSource,
}

impl KernelSpec {
    pub fn new(
        thread_dim: ThreadDim,
        buffer_allocations: Vec<BufferAllocation>,
        buffer_uses: Vec<BufferUse>,
        source: KernelSource,
    ) -> Self {
        Self { thread_dim, buffer_allocations, buffer_uses, source }
    }

    pub fn thread_dim(&self) -> ThreadDim {
        self.thread_dim
    }

    pub fn buffer_allocations(&self) -> &[BufferAllocation] {
        &self.buffer_allocations
    }

    pub fn buffer_uses(&self) -> &[BufferUse] {
        &self.buffer_uses
    }

    pub fn source(&self) -> &KernelSource {
        &self.source
    }
}
