//! LLVM text renderer tests.

use strata_ir::{ElementType, Node, Opcode, Shape};

use crate::llvm::common::lconst;
use crate::test::helpers::{add_node, f32_shape, param};
use crate::{ElementalKernelEmitter, KernelApiOptions};

fn render(node: std::sync::Arc<Node>, options: KernelApiOptions) -> String {
    ElementalKernelEmitter::with_options(node, options).emit_kernel_spec().unwrap().source().to_llvm_ir()
}

#[test]
fn test_whole_shape_add() {
    let ir = render(add_node(&[16], None), KernelApiOptions::default());

    assert!(ir.contains("; ModuleID = 'add_elemental_kernel_module'"));
    assert!(ir.contains("define void @add_kernel(ptr noalias %args, ptr noalias %results, ptr noalias %thread) #0"));
    assert!(ir.contains("%thread_id_x = load i64"));
    assert!(ir.contains("%arg0 = load ptr"));
    assert!(ir.contains("%arg1 = load ptr"));
    assert!(ir.contains("%result0 = load ptr"));
    assert!(ir.contains("loop_entry_0:"));
    assert!(ir.contains("loop_latch_0:"));
    assert!(ir.contains("%add.invar_dim.0 = phi i64 [ 0, %loop_entry_0 ]"));
    assert!(ir.contains("icmp slt i64 %add.invar_dim.0, 16"));
    assert!(ir.contains("fadd float"));
    assert!(ir.contains("store float"));
    assert!(ir.contains("loop_exit_0:"));
    assert!(ir.contains("ret void"));
    assert!(!ir.contains("_parallel_bounds"));
}

#[test]
fn test_partitioned_bounds_global() {
    let ir = render(add_node(&[16], Some(&[4])), KernelApiOptions::default());

    assert!(ir.contains(
        "@add_parallel_bounds = private unnamed_addr constant [4 x [1 x [2 x i64]]] \
         [[1 x [2 x i64]] [[2 x i64] [i64 0, i64 4]], [1 x [2 x i64]] [[2 x i64] [i64 4, i64 8]], \
         [1 x [2 x i64]] [[2 x i64] [i64 8, i64 12]], [1 x [2 x i64]] [[2 x i64] [i64 12, i64 16]]], align 8"
    ));
    assert!(ir.contains(
        "getelementptr inbounds [4 x [1 x [2 x i64]]], ptr @add_parallel_bounds, i64 0, i64 %thread_id_x, i64 0, i64 0"
    ));
    assert!(ir.contains("%lo_dim_0 = add i64"));
    assert!(ir.contains("%up_dim_0 = add i64"));
    assert!(ir.contains("phi i64 [ %lo_dim_0, %loop_entry_0 ]"));
    assert!(ir.contains(", %up_dim_0\n"));
}

#[test]
fn test_row_major_addressing() {
    let ir = render(add_node(&[4, 3], None), KernelApiOptions::default());
    assert!(ir.contains("mul nsw i64 %add.invar_dim.0, 3"));
    assert!(ir.contains("getelementptr inbounds float, ptr %arg0"));
    assert!(ir.contains("getelementptr inbounds float, ptr %result0"));
}

#[test]
fn test_invariant_loads_follow_options() {
    let ir = render(add_node(&[8], None), KernelApiOptions::default());
    assert!(ir.contains("align 4, !invariant.load !0"));
    assert!(ir.contains("!0 = !{}"));

    let options = KernelApiOptions::builder().enable_invariant_load_metadata(false).build();
    let ir = render(add_node(&[8], None), options);
    assert!(!ir.contains("!invariant.load"));
}

#[test]
fn test_prefer_vector_width_attribute() {
    let options = KernelApiOptions::builder().prefer_vector_width(512).build();
    let ir = render(add_node(&[8], None), options);
    assert!(ir.contains(r#""prefer-vector-width"="512""#));
}

#[test]
fn test_intrinsic_declarations() {
    let p = param(0, &[8]);
    let sqrt = Node::builder().name("sqrt").opcode(Opcode::Sqrt).shape(f32_shape(&[8])).operands(vec![p]).build();
    let ir = render(sqrt, KernelApiOptions::default());
    assert!(ir.contains("call float @llvm.sqrt.f32(float"));
    assert!(ir.contains("declare float @llvm.sqrt.f32(float)"));
    assert!(!ir.contains("declare float @llvm.exp.f32"));
}

#[test]
fn test_integer_ops() {
    let shape = Shape::array(ElementType::S32, &[8]).unwrap();
    let operands = vec![Node::parameter(0, "a", shape.clone()), Node::parameter(1, "b", shape.clone())];
    let max = Node::builder().name("max").opcode(Opcode::Maximum).shape(shape).operands(operands).build();
    let ir = render(max, KernelApiOptions::default());
    assert!(ir.contains("call i32 @llvm.smax.i32(i32"));
    assert!(ir.contains("declare i32 @llvm.smax.i32(i32, i32)"));
    assert!(ir.contains("store i32"));
}

#[test]
fn test_float_constants_are_hex() {
    assert_eq!(lconst(1.0, ElementType::F64), "0x3FF0000000000000");
    assert_eq!(lconst(0.1, ElementType::F32), "0x3FB99999A0000000");
    assert_eq!(lconst(-3.0, ElementType::S32), "-3");
    assert_eq!(lconst(f64::NAN, ElementType::F32), "0x7FF8000000000000");
}
