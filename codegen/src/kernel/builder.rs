//! Incremental construction of a [`KernelModule`].
//!
//! The builder plays the role of an IR builder with an insertion point: it
//! keeps a stack of open statement blocks, so loop bodies are emitted into the
//! innermost open loop and everything else into the function entry.

use std::collections::HashSet;

use super::ir_array::sanitize;
use super::{Expr, FunctionAttributes, GlobalId, KernelFunction, KernelModule, Stmt, ValueId, VarId};
use crate::Result;
use crate::bounds::BoundsTable;
use crate::kernel_api::KernelPrototype;

/// Names the LLVM renderer uses for kernel parameters and buffer pointers.
fn is_reserved(name: &str) -> bool {
    let numbered = |prefix: &str| name.strip_prefix(prefix).is_some_and(|n| n.bytes().all(|b| b.is_ascii_digit()));
    matches!(name, "args" | "results" | "thread" | "entry") || name.starts_with("thread_id_") || numbered("arg") || numbered("result")
}

/// Builder for one kernel module.
pub struct KernelBuilder {
    module_name: String,
    globals: Vec<BoundsTable>,
    value_names: Vec<String>,
    var_names: Vec<String>,
    names: HashSet<String>,
    blocks: Vec<Vec<Stmt>>,
}

impl KernelBuilder {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            globals: Vec::new(),
            value_names: Vec::new(),
            var_names: Vec::new(),
            names: HashSet::new(),
            blocks: vec![Vec::new()],
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Register a read-only global and return its id.
    pub fn add_global(&mut self, table: BoundsTable) -> GlobalId {
        self.globals.push(table);
        GlobalId(self.globals.len() - 1)
    }

    pub fn globals(&self) -> &[BoundsTable] {
        &self.globals
    }

    /// Bind `expr` to a fresh named value at the insertion point.
    pub fn emit_let(&mut self, name: &str, expr: Expr) -> Expr {
        let value = ValueId(self.value_names.len());
        let name = self.unique_name(name);
        self.value_names.push(name);
        self.emit(Stmt::Let { value, expr });
        Expr::Value(value)
    }

    /// Allocate a fresh loop variable.
    pub fn new_loop_var(&mut self, name: &str) -> VarId {
        let var = VarId(self.var_names.len());
        let name = self.unique_name(name);
        self.var_names.push(name);
        var
    }

    /// Append a statement at the insertion point.
    pub fn emit(&mut self, stmt: Stmt) {
        // The entry block is never popped.
        if let Some(block) = self.blocks.last_mut() {
            block.push(stmt);
        }
    }

    /// Emit a loop over `[lower, upper)`; `body` emits into the loop.
    pub fn emit_for(
        &mut self,
        var: VarId,
        lower: Expr,
        upper: Expr,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        self.blocks.push(Vec::new());
        let status = body(self);
        let stmts = self.blocks.pop().unwrap_or_default();
        status?;
        self.emit(Stmt::For { var, lower, upper, body: stmts });
        Ok(())
    }

    /// Close the builder into a module whose entry function has `prototype`'s signature.
    pub fn finish(mut self, prototype: &KernelPrototype) -> KernelModule {
        let body = self.blocks.drain(..).next().unwrap_or_default();
        let options = prototype.options();
        KernelModule {
            name: self.module_name,
            globals: self.globals,
            function: KernelFunction {
                name: prototype.function_name().to_string(),
                arguments: prototype.arguments().to_vec(),
                results: prototype.results().to_vec(),
                body,
                value_names: self.value_names,
                var_names: self.var_names,
                attributes: FunctionAttributes {
                    prefer_vector_width: options.prefer_vector_width,
                    invariant_argument_loads: options.enable_invariant_load_metadata,
                },
            },
        }
    }

    fn unique_name(&mut self, hint: &str) -> String {
        let base = sanitize(hint);
        let mut name = base.clone();
        let mut n = 1;
        while is_reserved(&name) || self.names.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        self.names.insert(name.clone());
        name
    }
}
