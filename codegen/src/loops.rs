//! Loop nest emission.
//!
//! Loops are emitted in row-major order: dimension 0 is the outermost loop and
//! the last dimension the innermost, so consecutive iterations touch
//! consecutive elements. Loop variables are named `<name>.invar_dim.<d>`.

use snafu::{OptionExt, ensure};

use crate::bounds::ParallelPartitionBounds;
use crate::error::*;
use crate::generator::{ElementGenerator, GeneratorContext};
use crate::kernel::{Expr, IrArray, IrIndex, KernelBuilder, VarId};
use crate::kernel_api::KernelPrototype;

/// Emits one loop nest over the full shape of its targets.
///
/// With a single target this is the whole-shape loop; with several targets
/// every iteration evaluates and stores each output, so all results are
/// produced in one pass. Targets must share dimensions.
pub struct LoopEmitter<'a> {
    generator: &'a dyn ElementGenerator,
    prototype: &'a KernelPrototype,
    targets: &'a [IrArray],
}

impl<'a> LoopEmitter<'a> {
    pub fn new(generator: &'a dyn ElementGenerator, prototype: &'a KernelPrototype, targets: &'a [IrArray]) -> Self {
        Self { generator, prototype, targets }
    }

    /// # Errors
    /// [`Error::NoResults`] without targets, [`Error::ResultShapeMismatch`]
    /// when a target's dimensions differ from the first target's.
    pub fn emit_loop(&self, b: &mut KernelBuilder, name: &str) -> Result<()> {
        let kernel = self.prototype.function_name();
        let first = self.targets.first().context(NoResultsSnafu { kernel })?;
        for (result, target) in self.targets.iter().enumerate().skip(1) {
            ensure!(
                target.shape().same_dimensions(first.shape()),
                ResultShapeMismatchSnafu {
                    kernel,
                    result,
                    expected: first.shape().to_string(),
                    actual: target.shape().to_string()
                }
            );
        }
        let bounds: Vec<_> = first.shape().dims().iter().map(|&size| (Expr::Index(0), Expr::Index(size))).collect();
        emit_loop_nest(b, self.generator, self.prototype, self.targets, name, &bounds)
    }
}

/// Emits the loop nest of one partition.
///
/// The leading dimensions iterate over the partition bounds loaded at run
/// time; the remaining dimensions cover their whole range.
pub struct ParallelLoopEmitter<'a> {
    generator: &'a dyn ElementGenerator,
    prototype: &'a KernelPrototype,
    target: &'a IrArray,
    parallel_bounds: &'a ParallelPartitionBounds,
}

impl<'a> ParallelLoopEmitter<'a> {
    pub fn new(
        generator: &'a dyn ElementGenerator,
        prototype: &'a KernelPrototype,
        target: &'a IrArray,
        parallel_bounds: &'a ParallelPartitionBounds,
    ) -> Self {
        Self { generator, prototype, target, parallel_bounds }
    }

    pub fn emit_loop(&self, b: &mut KernelBuilder, name: &str) -> Result<()> {
        let bounds: Vec<_> = self
            .target
            .shape()
            .dims()
            .iter()
            .enumerate()
            .map(|(d, &size)| self.parallel_bounds.get(d).cloned().unwrap_or((Expr::Index(0), Expr::Index(size))))
            .collect();
        emit_loop_nest(b, self.generator, self.prototype, std::slice::from_ref(self.target), name, &bounds)
    }
}

fn emit_loop_nest(
    b: &mut KernelBuilder,
    generator: &dyn ElementGenerator,
    prototype: &KernelPrototype,
    targets: &[IrArray],
    name: &str,
    bounds: &[(Expr, Expr)],
) -> Result<()> {
    let vars: Vec<VarId> = (0..bounds.len()).map(|d| b.new_loop_var(&format!("{name}.invar_dim.{d}"))).collect();
    let index = IrIndex::new(vars.iter().map(|&v| Expr::Var(v)));

    let body = |b: &mut KernelBuilder| -> Result<()> {
        let ctx = GeneratorContext::new(prototype);
        for (output, target) in targets.iter().enumerate() {
            let value = generator.generate(&ctx, output, &index)?;
            b.emit(target.emit_write_array_element(&index, value));
        }
        Ok(())
    };

    emit_nest_level(b, &vars, bounds, &body)
}

fn emit_nest_level(
    b: &mut KernelBuilder,
    vars: &[VarId],
    bounds: &[(Expr, Expr)],
    body: &dyn Fn(&mut KernelBuilder) -> Result<()>,
) -> Result<()> {
    let (Some(&var), Some((lower, upper))) = (vars.first(), bounds.first()) else {
        return body(b);
    };
    b.emit_for(var, lower.clone(), upper.clone(), |b| emit_nest_level(b, &vars[1..], &bounds[1..], body))
}
