//! Render context for LLVM IR text generation.
//!
//! Maps kernel values and loop variables to LLVM names and hands out fresh
//! temporaries and loop ids.

use crate::bounds::BoundsTable;
use crate::kernel::{KernelFunction, KernelModule, ValueId, VarId};

/// Per-module naming state.
pub struct RenderContext<'a> {
    module: &'a KernelModule,
    counter: usize,
    loops: usize,
}

impl<'a> RenderContext<'a> {
    pub fn new(module: &'a KernelModule) -> Self {
        Self { module, counter: 0, loops: 0 }
    }

    pub fn function(&self) -> &'a KernelFunction {
        &self.module.function
    }

    pub fn globals(&self) -> &'a [BoundsTable] {
        &self.module.globals
    }

    /// Fresh temporary. Temporaries start with a dot, which kernel names never do.
    pub fn temp(&mut self) -> String {
        let name = format!("%.t{}", self.counter);
        self.counter += 1;
        name
    }

    /// Fresh loop id for block labels.
    pub fn next_loop(&mut self) -> usize {
        let id = self.loops;
        self.loops += 1;
        id
    }

    pub fn value(&self, value: ValueId) -> String {
        format!("%{}", self.module.function.value_names[value.0])
    }

    pub fn var(&self, var: VarId) -> String {
        format!("%{}", self.module.function.var_names[var.0])
    }

    /// Current variable counter.
    pub fn counter(&self) -> usize {
        self.counter
    }
}
