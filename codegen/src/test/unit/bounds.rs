use strata_ir::ParallelConfig;

use crate::bounds::{BoundsTable, emit_parallel_partition_bounds};
use crate::kernel::{BoundSide, Expr, GlobalId, Stmt, ThreadAxis};
use crate::partition::ShapePartitionIterator;
use crate::test::helpers::{add_node, builder, prototype};

#[test]
fn test_table_layout() {
    let table = BoundsTable::build("t", &ShapePartitionIterator::new(&[16], &[4]));
    assert_eq!(table.num_partitions(), 4);
    assert_eq!(table.num_dimensions(), 1);
    assert_eq!(table.values(), &[0, 4, 4, 8, 8, 12, 12, 16]);
    assert_eq!(table.get(2, 0), Some((8, 12)));
}

#[test]
fn test_offsets() {
    let table = BoundsTable::build("t", &ShapePartitionIterator::new(&[16, 6], &[2, 3]));
    assert_eq!(table.offset(0, 0, BoundSide::Lower), 0);
    assert_eq!(table.offset(0, 1, BoundSide::Upper), 3);
    assert_eq!(table.offset(4, 1, BoundSide::Lower), 18);
    assert_eq!(table.get(4, 1), Some((2, 4)));
}

#[test]
fn test_lookup_matches_direct_computation() {
    let iter = ShapePartitionIterator::new(&[13, 7, 4], &[3, 2]);
    let table = BoundsTable::build("t", &iter);
    for p in 0..iter.total_partition_count() {
        let direct = iter.partition(p);
        for (d, bounds) in direct.iter().enumerate() {
            assert_eq!(table.get(p as usize, d), Some(*bounds), "partition {p}, dim {d}");
        }
    }
}

#[test]
fn test_out_of_range_lookup() {
    let table = BoundsTable::build("t", &ShapePartitionIterator::new(&[16], &[4]));
    assert_eq!(table.get(4, 0), None);
    assert_eq!(table.get(0, 1), None);
}

#[test]
fn test_emit_registers_global_and_loads() {
    let node = add_node(&[16, 8], None);
    let proto = prototype(&node);
    let mut b = builder(&node);
    let config = ParallelConfig::new(&[4, 2], 2).unwrap();

    let bounds = emit_parallel_partition_bounds(&mut b, &proto, &config, proto.results()[0].shape(), "add");

    assert_eq!(bounds.len(), 2);
    assert_eq!(b.globals().len(), 1);
    assert_eq!(b.globals()[0].name(), "add_parallel_bounds");
    assert_eq!(b.globals()[0].num_partitions(), 8);

    let module = b.finish(&proto);
    assert_eq!(module.function.value_names, vec!["lo_dim_0", "up_dim_0", "lo_dim_1", "up_dim_1"]);
    let Stmt::Let { expr, .. } = &module.function.body[3] else { panic!("expected let") };
    assert_eq!(
        expr,
        &Expr::LoadBound {
            table: GlobalId(0),
            partition: Box::new(Expr::ThreadId(ThreadAxis::X)),
            dim: 1,
            side: BoundSide::Upper,
        }
    );
}
