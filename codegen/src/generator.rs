//! Element generator capability.
//!
//! A generator produces the value of one output element at a multi-dimensional
//! index. It does not capture its build context: the loop emitter lends it a
//! [`GeneratorContext`] for each call.

use snafu::OptionExt;

use crate::kernel::{Expr, IrArray, IrIndex};
use crate::kernel_api::KernelPrototype;
use crate::{MissingArgumentSnafu, Result};

/// Build context borrowed by generators during emission.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext<'a> {
    prototype: &'a KernelPrototype,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(prototype: &'a KernelPrototype) -> Self {
        Self { prototype }
    }

    pub fn prototype(&self) -> &'a KernelPrototype {
        self.prototype
    }

    /// Argument buffer `index`.
    pub fn argument(&self, index: usize) -> Result<&'a IrArray> {
        let arguments = self.prototype.arguments();
        arguments.get(index).context(MissingArgumentSnafu { index, count: arguments.len() })
    }
}

/// Produces the value of output `output` at `index`.
pub trait ElementGenerator {
    fn generate(&self, ctx: &GeneratorContext<'_>, output: usize, index: &IrIndex) -> Result<Expr>;
}

/// Reads argument `argument` at the requested index, for every output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandReader {
    pub argument: usize,
}

impl ElementGenerator for OperandReader {
    fn generate(&self, ctx: &GeneratorContext<'_>, _output: usize, index: &IrIndex) -> Result<Expr> {
        Ok(ctx.argument(self.argument)?.emit_read_array_element(index))
    }
}
