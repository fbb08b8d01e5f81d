//! Elemental generator for elementwise nodes and loop fusions.
//!
//! Top-level operands are kernel arguments in operand order. Inside a fusion,
//! `Parameter(n)` leaves of the fused roots read kernel argument `n`. A rank-0
//! argument is read at the scalar index regardless of the loop rank, which
//! broadcasts it.

use snafu::{OptionExt, ensure};
use strata_ir::{Node, Opcode};

use crate::error::*;
use crate::generator::{ElementGenerator, GeneratorContext};
use crate::kernel::{BinaryOp, Expr, IrIndex, UnaryOp};

/// Element generator for one node.
#[derive(Debug, Clone, Copy)]
pub struct ElementalGenerator<'n> {
    node: &'n Node,
}

impl<'n> ElementalGenerator<'n> {
    pub fn new(node: &'n Node) -> Self {
        Self { node }
    }

    fn read_argument(&self, ctx: &GeneratorContext<'_>, argument: usize, index: &IrIndex) -> Result<Expr> {
        let array = ctx.argument(argument)?;
        let shape = array.shape();
        if shape.rank() == 0 {
            return Ok(array.emit_read_array_element(&IrIndex::scalar()));
        }

        let expected = &self.node.shape().leaves()[0];
        ensure!(
            shape.rank() == index.rank() && shape.same_dimensions(expected),
            OperandShapeSnafu {
                node: self.node.name(),
                operand: argument,
                expected: expected.to_string(),
                actual: shape.to_string(),
            }
        );
        Ok(array.emit_read_array_element(index))
    }

    fn emit_fused(&self, ctx: &GeneratorContext<'_>, node: &Node, index: &IrIndex) -> Result<Expr> {
        if node.opcode() == Opcode::Parameter {
            let number =
                node.parameter_number().context(MissingSnafu { node: node.name(), what: "parameter number" })?;
            return self.read_argument(ctx, number, index);
        }

        let operands =
            node.operands().iter().map(|operand| self.emit_fused(ctx, operand, index)).collect::<Result<Vec<_>>>()?;
        combine(node, operands)
    }
}

impl ElementGenerator for ElementalGenerator<'_> {
    fn generate(&self, ctx: &GeneratorContext<'_>, output: usize, index: &IrIndex) -> Result<Expr> {
        if self.node.opcode() == Opcode::Fusion {
            let root = self
                .node
                .fused_roots()
                .get(output)
                .context(MissingFusedRootSnafu { node: self.node.name(), output })?;
            return self.emit_fused(ctx, root, index);
        }

        let operands = (0..self.node.operand_count())
            .map(|i| self.read_argument(ctx, i, index))
            .collect::<Result<Vec<_>>>()?;
        combine(self.node, operands)
    }
}

/// Combine already generated operand values according to `node`'s opcode.
fn combine(node: &Node, operands: Vec<Expr>) -> Result<Expr> {
    let opcode = node.opcode();
    ensure!(
        opcode == Opcode::Constant || opcode.is_elementwise(),
        UnsupportedOpcodeSnafu { opcode }
    );
    let element_type = node.shape().as_array()?.element_type();

    if opcode == Opcode::Constant {
        let value = node.literal().context(MissingSnafu { node: node.name(), what: "literal" })?;
        return Ok(Expr::Const { value, element_type });
    }

    if let Some(op) = unary_op(opcode) {
        ensure!(
            element_type.is_float() || !matches!(op, UnaryOp::Exp | UnaryOp::Sqrt),
            UnsupportedElementTypeSnafu { opcode, element_type }
        );
        let [operand] = arity::<1>(node, operands)?;
        return Ok(Expr::unary(op, element_type, operand));
    }

    if let Some(op) = binary_op(opcode) {
        let [lhs, rhs] = arity::<2>(node, operands)?;
        return Ok(Expr::binary(op, element_type, lhs, rhs));
    }

    UnsupportedOpcodeSnafu { opcode }.fail()
}

fn arity<const N: usize>(node: &Node, operands: Vec<Expr>) -> Result<[Expr; N]> {
    operands.try_into().ok().context(MissingSnafu { node: node.name(), what: "operands" })
}

fn unary_op(opcode: Opcode) -> Option<UnaryOp> {
    Some(match opcode {
        Opcode::Negate => UnaryOp::Neg,
        Opcode::Abs => UnaryOp::Abs,
        Opcode::Exponential => UnaryOp::Exp,
        Opcode::Sqrt => UnaryOp::Sqrt,
        _ => return None,
    })
}

fn binary_op(opcode: Opcode) -> Option<BinaryOp> {
    Some(match opcode {
        Opcode::Add => BinaryOp::Add,
        Opcode::Subtract => BinaryOp::Sub,
        Opcode::Multiply => BinaryOp::Mul,
        Opcode::Divide => BinaryOp::Div,
        Opcode::Maximum => BinaryOp::Max,
        Opcode::Minimum => BinaryOp::Min,
        _ => return None,
    })
}

