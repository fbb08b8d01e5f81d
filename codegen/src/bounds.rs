//! Parallel partition bounds table.
//!
//! All partition bounds of a node are materialized once, at emission time, as
//! a read-only constant of shape `[partitions][parallel dims][2]`. The kernel
//! selects its row with the runtime thread id, so a single compiled kernel
//! serves every partition.

use smallvec::SmallVec;
use strata_ir::{ArrayShape, ParallelConfig};

use crate::kernel::{BoundSide, Expr, GlobalId, KernelBuilder};
use crate::kernel_api::KernelPrototype;
use crate::partition::{DimBounds, ShapePartitionIterator};

/// Lower/upper bound expressions for each parallelized outer dimension.
pub type ParallelPartitionBounds = SmallVec<[(Expr, Expr); 4]>;

/// Flat, immutable `[partitions][dims][2]` table of `i64` bounds.
///
/// Entry `(partition, dim, side)` lives at `(partition * dims + dim) * 2 + side`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundsTable {
    name: String,
    num_partitions: usize,
    num_dimensions: usize,
    values: Vec<i64>,
}

impl BoundsTable {
    /// Materialize every partition of `partitions` in id order.
    pub fn build(name: impl Into<String>, partitions: &ShapePartitionIterator) -> Self {
        let num_partitions = partitions.total_partition_count() as usize;
        let num_dimensions = partitions.num_parallel_dimensions();

        let mut values = Vec::with_capacity(num_partitions * num_dimensions * 2);
        for bounds in partitions.partitions() {
            for (lower, upper) in bounds {
                values.push(lower);
                values.push(upper);
            }
        }

        Self { name: name.into(), num_partitions, num_dimensions, values }
    }

    /// Global symbol name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    pub fn num_dimensions(&self) -> usize {
        self.num_dimensions
    }

    /// Flat offset of one entry.
    pub fn offset(&self, partition: usize, dim: usize, side: BoundSide) -> usize {
        (partition * self.num_dimensions + dim) * 2 + side as usize
    }

    /// Bounds of `dim` in `partition`, or `None` if either is out of range.
    pub fn get(&self, partition: usize, dim: usize) -> Option<DimBounds> {
        if partition >= self.num_partitions || dim >= self.num_dimensions {
            return None;
        }
        let lower = self.values[self.offset(partition, dim, BoundSide::Lower)];
        let upper = self.values[self.offset(partition, dim, BoundSide::Upper)];
        Some((lower, upper))
    }

    /// Raw table contents in layout order.
    pub fn values(&self) -> &[i64] {
        &self.values
    }
}

/// Emit the bounds table for `shape` and the loads of the current partition's bounds.
///
/// Registers one global named `<name>_parallel_bounds` in the module and, for
/// each parallel dimension `i`, loads `lo_dim_i` and `up_dim_i` indexed by the
/// kernel's `thread_id.x`.
pub fn emit_parallel_partition_bounds(
    b: &mut KernelBuilder,
    prototype: &KernelPrototype,
    parallel_config: &ParallelConfig,
    shape: &ArrayShape,
    name: &str,
) -> ParallelPartitionBounds {
    let partitions = ShapePartitionIterator::new(shape.dims(), parallel_config.outer_dimension_partitions());
    let num_parallel_dimensions = parallel_config.num_parallel_dimensions();

    let table = BoundsTable::build(format!("{name}_parallel_bounds"), &partitions);
    tracing::debug!(
        table = table.name(),
        partitions = table.num_partitions(),
        dims = num_parallel_dimensions,
        "emitting parallel partition bounds"
    );
    let table = b.add_global(table);

    let partition = prototype.thread_id().x.clone();
    (0..num_parallel_dimensions)
        .map(|i| {
            let lower = b.emit_let(&format!("lo_dim_{i}"), load_bound(table, &partition, i, BoundSide::Lower));
            let upper = b.emit_let(&format!("up_dim_{i}"), load_bound(table, &partition, i, BoundSide::Upper));
            (lower, upper)
        })
        .collect()
}

fn load_bound(table: GlobalId, partition: &Expr, dim: usize, side: BoundSide) -> Expr {
    Expr::LoadBound { table, partition: Box::new(partition.clone()), dim, side }
}
