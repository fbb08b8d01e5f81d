use strata_ir::ParallelConfig;

use crate::bounds::emit_parallel_partition_bounds;
use crate::kernel::{Expr, KernelModule, Stmt};
use crate::loops::{LoopEmitter, ParallelLoopEmitter};
use crate::test::helpers::{add_node, builder, prototype};
use crate::{Error, OperandReader};

/// Bounds of each loop along the first path of nested loops.
fn loop_bounds(module: &KernelModule) -> Vec<(Expr, Expr)> {
    let mut bounds = Vec::new();
    let mut stmts = module.function.body.as_slice();
    while let Some(Stmt::For { lower, upper, body, .. }) = stmts.iter().find(|s| matches!(s, Stmt::For { .. })) {
        bounds.push((lower.clone(), upper.clone()));
        stmts = body;
    }
    bounds
}

#[test]
fn test_whole_shape_nest() {
    let node = add_node(&[4, 3, 2], None);
    let proto = prototype(&node);
    let mut b = builder(&node);
    LoopEmitter::new(&OperandReader { argument: 0 }, &proto, proto.results()).emit_loop(&mut b, "add").unwrap();
    let module = b.finish(&proto);

    assert_eq!(
        loop_bounds(&module),
        vec![
            (Expr::Index(0), Expr::Index(4)),
            (Expr::Index(0), Expr::Index(3)),
            (Expr::Index(0), Expr::Index(2)),
        ]
    );
    assert_eq!(module.function.var_names, vec!["add.invar_dim.0", "add.invar_dim.1", "add.invar_dim.2"]);
}

#[test]
fn test_innermost_body_stores_result() {
    let node = add_node(&[5], None);
    let proto = prototype(&node);
    let mut b = builder(&node);
    LoopEmitter::new(&OperandReader { argument: 1 }, &proto, proto.results()).emit_loop(&mut b, "add").unwrap();
    let module = b.finish(&proto);

    let [Stmt::For { body, .. }] = module.function.body.as_slice() else { panic!("expected one loop") };
    let [Stmt::Store { array, value, .. }] = body.as_slice() else { panic!("expected one store") };
    assert_eq!(array, &proto.results()[0]);
    assert!(matches!(value, Expr::Read { array, .. } if array == &proto.arguments()[1]));
}

#[test]
fn test_partitioned_nest_uses_loaded_bounds() {
    let node = add_node(&[8, 6, 2], None);
    let proto = prototype(&node);
    let mut b = builder(&node);
    let config = ParallelConfig::new(&[2, 3], 3).unwrap();
    let result = &proto.results()[0];

    let bounds = emit_parallel_partition_bounds(&mut b, &proto, &config, result.shape(), "add");
    ParallelLoopEmitter::new(&OperandReader { argument: 0 }, &proto, result, &bounds).emit_loop(&mut b, "add").unwrap();
    let module = b.finish(&proto);

    let nest = loop_bounds(&module);
    assert_eq!(nest.len(), 3);
    assert_eq!(nest[0], bounds[0]);
    assert_eq!(nest[1], bounds[1]);
    assert_eq!(nest[2], (Expr::Index(0), Expr::Index(2)));
    assert!(matches!(nest[0].0, Expr::Value(_)));
}

#[test]
fn test_loop_names_avoid_collisions() {
    let node = add_node(&[3], None);
    let proto = prototype(&node);
    let mut b = builder(&node);
    let reader = OperandReader { argument: 0 };
    LoopEmitter::new(&reader, &proto, proto.results()).emit_loop(&mut b, "add").unwrap();
    LoopEmitter::new(&reader, &proto, proto.results()).emit_loop(&mut b, "add").unwrap();
    let module = b.finish(&proto);
    assert_eq!(module.function.var_names, vec!["add.invar_dim.0", "add.invar_dim.0.1"]);
}

#[test]
fn test_empty_targets_rejected() {
    let node = add_node(&[4], None);
    let proto = prototype(&node);
    let mut b = builder(&node);
    let err = LoopEmitter::new(&OperandReader { argument: 0 }, &proto, &[]).emit_loop(&mut b, "add").unwrap_err();
    assert!(matches!(err, Error::NoResults { ref kernel } if kernel == "add_kernel"));
}
