use std::sync::Arc;

use strata_ir::{ElementType, Node, Opcode, Shape};

use crate::elemental::ElementalGenerator;
use crate::generator::{ElementGenerator, GeneratorContext};
use crate::kernel::{BinaryOp, Expr, IrArray, IrIndex, UnaryOp, VarId};
use crate::test::helpers::{add_node, f32_shape, param, prototype};
use crate::{Error, Result};

fn index(rank: usize) -> IrIndex {
    IrIndex::new((0..rank).map(|d| Expr::Var(VarId(d))))
}

fn generate(node: &Node, output: usize, rank: usize) -> Result<Expr> {
    let proto = prototype(node);
    let ctx = GeneratorContext::new(&proto);
    ElementalGenerator::new(node).generate(&ctx, output, &index(rank))
}

fn read(argument: usize, dims: &[i64], rank: usize) -> Expr {
    IrArray::argument(argument, f32_shape(dims).as_array().unwrap().clone()).emit_read_array_element(&index(rank))
}

fn unary(opcode: Opcode, operand: Arc<Node>) -> Arc<Node> {
    let shape = operand.shape().clone();
    Node::builder().name(format!("{opcode}")).opcode(opcode).shape(shape).operands(vec![operand]).build()
}

fn binary(opcode: Opcode, lhs: Arc<Node>, rhs: Arc<Node>) -> Arc<Node> {
    let shape = lhs.shape().clone();
    Node::builder().name(format!("{opcode}")).opcode(opcode).shape(shape).operands(vec![lhs, rhs]).build()
}

fn fusion(roots: Vec<Arc<Node>>, operands: Vec<Arc<Node>>) -> Arc<Node> {
    let shape = if roots.len() == 1 {
        roots[0].shape().clone()
    } else {
        Shape::tuple(roots.iter().map(|r| r.shape().clone()).collect()).unwrap()
    };
    Node::builder().name("fusion").opcode(Opcode::Fusion).shape(shape).operands(operands).fused_roots(roots).build()
}

#[test]
fn test_binary_reads_operands() {
    let expr = generate(&add_node(&[4, 3], None), 0, 2).unwrap();
    assert_eq!(expr, Expr::binary(BinaryOp::Add, ElementType::F32, read(0, &[4, 3], 2), read(1, &[4, 3], 2)));
}

#[test]
fn test_scalar_operand_is_broadcast() {
    let scalar = Node::constant("two", 2.0, ElementType::F32);
    let node = binary(Opcode::Multiply, param(0, &[8]), scalar);
    let Expr::Binary { rhs, .. } = generate(&node, 0, 1).unwrap() else { panic!("expected binary") };
    let Expr::Read { index, .. } = *rhs else { panic!("expected read") };
    assert!(index.is_empty());
}

#[test]
fn test_fusion_outputs_use_their_roots() {
    let p0 = param(0, &[8]);
    let p1 = param(1, &[8]);
    let sum = binary(Opcode::Add, p0.clone(), p1.clone());
    let neg = unary(Opcode::Negate, p0.clone());
    let node = fusion(vec![sum, neg], vec![param(0, &[8]), param(1, &[8])]);

    assert_eq!(generate(&node, 1, 1).unwrap(), Expr::unary(UnaryOp::Neg, ElementType::F32, read(0, &[8], 1)));
    assert!(matches!(generate(&node, 0, 1).unwrap(), Expr::Binary { op: BinaryOp::Add, .. }));
}

#[test]
fn test_fusion_embeds_constants() {
    let scaled = binary(Opcode::Multiply, param(0, &[8]), Node::constant("c", 0.5, ElementType::F32));
    let node = fusion(vec![scaled], vec![param(0, &[8])]);
    let Expr::Binary { rhs, .. } = generate(&node, 0, 1).unwrap() else { panic!("expected binary") };
    assert_eq!(*rhs, Expr::Const { value: 0.5, element_type: ElementType::F32 });
}

#[test]
fn test_missing_fused_root() {
    let node = fusion(vec![unary(Opcode::Abs, param(0, &[8]))], vec![param(0, &[8])]);
    assert!(matches!(generate(&node, 1, 1), Err(Error::MissingFusedRoot { output: 1, .. })));
}

#[test]
fn test_integer_exp_rejected() {
    let p = Node::parameter(0, "p", Shape::array(ElementType::S32, &[4]).unwrap());
    let node = unary(Opcode::Exponential, p);
    assert!(matches!(
        generate(&node, 0, 1),
        Err(Error::UnsupportedElementType { opcode: Opcode::Exponential, element_type: ElementType::S32 })
    ));
}

#[test]
fn test_integer_abs_allowed() {
    let p = Node::parameter(0, "p", Shape::array(ElementType::S64, &[4]).unwrap());
    let expr = generate(&unary(Opcode::Abs, p), 0, 1).unwrap();
    assert!(matches!(expr, Expr::Unary { op: UnaryOp::Abs, element_type: ElementType::S64, .. }));
}

#[test]
fn test_non_elementwise_opcode_rejected() {
    let node = unary(Opcode::Reduce, param(0, &[8]));
    assert!(matches!(generate(&node, 0, 1), Err(Error::UnsupportedOpcode { opcode: Opcode::Reduce })));
}

#[test]
fn test_operand_shape_mismatch() {
    let node = binary(Opcode::Add, param(0, &[8]), param(1, &[4]));
    assert!(matches!(generate(&node, 0, 1), Err(Error::OperandShape { operand: 1, .. })));
}
