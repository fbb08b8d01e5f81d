//! Host reference executor for elemental kernels.
//!
//! Interprets the kernel module of a [`KernelSpec`] directly. Each invocation
//! runs the kernel for one thread id and returns the element writes it made;
//! [`HostKernel::run`] dispatches every thread id in parallel using rayon and
//! merges the writes, rejecting any element written twice or never written.
//!
//! All element values are carried as `f64`. Integer element types are
//! truncated toward zero after every operation and on store, and `f32`
//! values are rounded to single precision.

use std::sync::Arc;

use rayon::prelude::*;
use smallvec::SmallVec;
use snafu::{OptionExt, ensure};
use strata_codegen::kernel::{
    ArrayKind, BinaryOp, BoundSide, Expr, IrArray, KernelFunction, KernelModule, Stmt, ThreadAxis, UnaryOp,
};
use strata_codegen::{
    ElementalKernelEmitter, KernelApiOptions, KernelSpec, ThreadDim, assign_outer_dimension_partitions,
};
use strata_ir::{ElementType, Node};

use crate::error::*;

/// One element written by a kernel invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Write {
    /// Result buffer index.
    pub result: usize,
    /// Row-major element offset within the result.
    pub offset: usize,
    pub value: f64,
}

/// Executable view of an emitted kernel.
#[derive(Debug, Clone)]
pub struct HostKernel {
    spec: KernelSpec,
}

impl HostKernel {
    pub fn new(spec: KernelSpec) -> Self {
        Self { spec }
    }

    /// Emit the elemental kernel of `node` and wrap it for execution.
    pub fn compile(node: Arc<Node>, options: KernelApiOptions) -> Result<Self> {
        Ok(Self::new(ElementalKernelEmitter::with_options(node, options).emit_kernel_spec()?))
    }

    /// Like [`HostKernel::compile`], partitioning nodes without a directive
    /// for the threads of the current rayon pool.
    pub fn compile_parallel(node: Arc<Node>, options: KernelApiOptions) -> Result<Self> {
        let node = assign_outer_dimension_partitions(&node, rayon::current_num_threads() as i64)?;
        Self::compile(node, options)
    }

    pub fn spec(&self) -> &KernelSpec {
        &self.spec
    }

    pub fn thread_dim(&self) -> ThreadDim {
        self.spec.thread_dim()
    }

    fn module(&self) -> &KernelModule {
        self.spec.source().module()
    }

    /// Run the kernel for one thread id and return its writes in program order.
    pub fn invoke(&self, thread_id: u64, args: &[&[f64]]) -> Result<Vec<Write>> {
        let count = self.thread_dim().x;
        ensure!(thread_id < count, ThreadIdOutOfRangeSnafu { thread_id, count });
        self.check_arguments(args)?;

        let mut frame = Frame::new(self.module(), thread_id as i64, args);
        frame.exec_block(&self.module().function.body)?;
        Ok(frame.writes)
    }

    /// Run every thread id in parallel and assemble the result buffers.
    ///
    /// # Errors
    /// [`Error::OverlappingWrite`] if two invocations write the same element,
    /// [`Error::UnwrittenElement`] if no invocation writes some element.
    pub fn run(&self, args: &[&[f64]]) -> Result<Vec<Vec<f64>>> {
        let function = &self.module().function;
        let count = self.thread_dim().x;
        tracing::debug!(kernel = %function.name, partitions = count, "dispatching host kernel");

        let writes = (0..count).into_par_iter().map(|t| self.invoke(t, args)).collect::<Result<Vec<_>>>()?;

        let mut results: Vec<Vec<f64>> =
            function.results.iter().map(|r| vec![0.0; r.shape().element_count() as usize]).collect();
        let mut written: Vec<Vec<bool>> = results.iter().map(|r| vec![false; r.len()]).collect();

        for Write { result, offset, value } in writes.into_iter().flatten() {
            ensure!(!written[result][offset], OverlappingWriteSnafu { result, offset });
            written[result][offset] = true;
            results[result][offset] = value;
        }

        for (result, flags) in written.iter().enumerate() {
            if let Some(offset) = flags.iter().position(|&w| !w) {
                return UnwrittenElementSnafu { result, offset }.fail();
            }
        }

        tracing::debug!(kernel = %function.name, results = results.len(), "host kernel finished");
        Ok(results)
    }

    fn check_arguments(&self, args: &[&[f64]]) -> Result<()> {
        let function = &self.module().function;
        ensure!(
            args.len() == function.arguments.len(),
            BufferCountSnafu { kernel: function.name.clone(), expected: function.arguments.len(), actual: args.len() }
        );
        for (index, (arg, array)) in args.iter().zip(&function.arguments).enumerate() {
            let expected = array.shape().element_count() as usize;
            ensure!(arg.len() == expected, BufferSizeSnafu { index, expected, actual: arg.len() });
        }
        Ok(())
    }
}

/// Interpreter state of one invocation.
struct Frame<'a> {
    module: &'a KernelModule,
    thread_id: i64,
    args: &'a [&'a [f64]],
    vars: Vec<Option<i64>>,
    values: Vec<Option<i64>>,
    writes: Vec<Write>,
}

impl<'a> Frame<'a> {
    fn new(module: &'a KernelModule, thread_id: i64, args: &'a [&'a [f64]]) -> Self {
        let function = &module.function;
        Self {
            module,
            thread_id,
            args,
            vars: vec![None; function.var_names.len()],
            values: vec![None; function.value_names.len()],
            writes: Vec::new(),
        }
    }

    fn function(&self) -> &'a KernelFunction {
        &self.module.function
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Result<()> {
        stmts.iter().try_for_each(|stmt| self.exec(stmt))
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Let { value, expr } => {
                let v = self.eval_index(expr)?;
                let slot = self.values.get_mut(value.0).context(UnboundValueSnafu { name: format!("{value:?}") })?;
                *slot = Some(v);
            }

            Stmt::For { var, lower, upper, body } => {
                let (lower, upper) = (self.eval_index(lower)?, self.eval_index(upper)?);
                for i in lower..upper {
                    let slot = self.vars.get_mut(var.0).context(UnboundValueSnafu { name: format!("{var:?}") })?;
                    *slot = Some(i);
                    self.exec_block(body)?;
                }
            }

            Stmt::Store { array, index, value } => {
                let value = self.eval(value)?;
                let offset = self.offset(array, index)?;
                if let ArrayKind::Result(result) = array.kind() {
                    let value = round_to(value, array.shape().element_type());
                    self.writes.push(Write { result, offset, value });
                }
            }
        }
        Ok(())
    }

    fn eval_index(&self, expr: &Expr) -> Result<i64> {
        match expr {
            Expr::Index(i) => Ok(*i),
            Expr::Var(var) => self.vars.get(var.0).copied().flatten().context(UnboundValueSnafu {
                name: self.function().var_names.get(var.0).cloned().unwrap_or_else(|| format!("{var:?}")),
            }),
            Expr::Value(value) => self.values.get(value.0).copied().flatten().context(UnboundValueSnafu {
                name: self.function().value_names.get(value.0).cloned().unwrap_or_else(|| format!("{value:?}")),
            }),
            Expr::ThreadId(axis) => Ok(if *axis == ThreadAxis::X { self.thread_id } else { 0 }),
            Expr::LoadBound { table, partition, dim, side } => {
                let global = self.module.global(*table).context(UnboundValueSnafu { name: format!("{table:?}") })?;
                let partition = self.eval_index(partition)?;
                let (lower, upper) = global.get(partition as usize, *dim).context(ThreadIdOutOfRangeSnafu {
                    thread_id: partition as u64,
                    count: global.num_partitions() as u64,
                })?;
                Ok(match side {
                    BoundSide::Lower => lower,
                    BoundSide::Upper => upper,
                })
            }
            Expr::Const { .. } => NotAnIndexSnafu { found: "constant" }.fail(),
            Expr::Read { .. } => NotAnIndexSnafu { found: "read" }.fail(),
            Expr::Unary { .. } | Expr::Binary { .. } => NotAnIndexSnafu { found: "arithmetic" }.fail(),
        }
    }

    fn eval(&self, expr: &Expr) -> Result<f64> {
        match expr {
            Expr::Const { value, element_type } => Ok(round_to(*value, *element_type)),
            Expr::Read { array, index } => {
                let offset = self.offset(array, index)?;
                match array.kind() {
                    ArrayKind::Argument(i) => {
                        let arg = self.args.get(i).context(UnboundValueSnafu { name: format!("arg{i}") })?;
                        Ok(arg[offset])
                    }
                    // Results are write-only.
                    ArrayKind::Result(i) => UnboundValueSnafu { name: format!("result{i}") }.fail(),
                }
            }
            Expr::Unary { op, element_type, operand } => {
                let x = self.eval(operand)?;
                let y = match op {
                    UnaryOp::Neg => -x,
                    UnaryOp::Abs => x.abs(),
                    UnaryOp::Exp => x.exp(),
                    UnaryOp::Sqrt => x.sqrt(),
                };
                Ok(round_to(y, *element_type))
            }
            Expr::Binary { op, element_type, lhs, rhs } => {
                let (a, b) = (self.eval(lhs)?, self.eval(rhs)?);
                let y = match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Max => a.max(b),
                    BinaryOp::Min => a.min(b),
                };
                Ok(round_to(y, *element_type))
            }
            index => self.eval_index(index).map(|i| i as f64),
        }
    }

    fn offset(&self, array: &IrArray, index: &[Expr]) -> Result<usize> {
        let index = index.iter().map(|e| self.eval_index(e)).collect::<Result<SmallVec<[i64; 4]>>>()?;
        let shape = array.shape();
        let offset = shape
            .linear_index(&index)
            .context(IndexOutOfBoundsSnafu { index: index.to_vec(), shape: shape.to_string() })?;
        Ok(offset as usize)
    }
}

/// Round `value` to what `element_type` can hold.
fn round_to(value: f64, element_type: ElementType) -> f64 {
    match element_type {
        ElementType::F64 => value,
        ElementType::F32 => value as f32 as f64,
        ElementType::S32 => value.trunc() as i32 as f64,
        ElementType::S64 => value.trunc() as i64 as f64,
    }
}
