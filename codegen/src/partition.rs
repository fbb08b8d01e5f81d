//! Partitioning of a static iteration space into contiguous sub-rectangles.
//!
//! The leading `k` dimensions of a row-major shape are split according to a
//! per-dimension partition count. Partitions are enumerated lexicographically
//! over the per-dimension partition indices, outermost dimension slowest:
//!
//! ```text
//! shape [16, 6], counts [2, 3]  ->  6 partitions
//!   id 0: [0, 8) x [0, 2)    id 1: [0, 8) x [2, 4)    id 2: [0, 8) x [4, 6)
//!   id 3: [8,16) x [0, 2)    id 4: [8,16) x [2, 4)    id 5: [8,16) x [4, 6)
//! ```
//!
//! Each dimension of size `n` with count `c` is cut into chunks of
//! `max(1, n / c)` elements and the last chunk absorbs the remainder. When
//! `c > n` the surplus trailing partitions are empty (`[n, n)`), so the chunks
//! of every dimension still tile `[0, n)` exactly.

use std::sync::Arc;

use smallvec::{SmallVec, smallvec};
use strata_ir::{BackendConfig, Node, Shape, parallel_config};

use crate::Result;

/// Half-open `[lower, upper)` range of one dimension.
pub type DimBounds = (i64, i64);

/// Per-parallel-dimension bounds of one partition.
pub type PartitionBounds = SmallVec<[DimBounds; 4]>;

/// Product of the per-dimension partition counts (1 for an empty list).
pub fn total_partition_count(dimension_partition_counts: &[i64]) -> i64 {
    dimension_partition_counts.iter().product()
}

/// Enumerates the partitions of a shape for given per-dimension counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapePartitionIterator {
    /// Sizes of the partitioned (leading) dimensions.
    dim_sizes: SmallVec<[i64; 4]>,
    counts: SmallVec<[i64; 4]>,
    /// Nominal chunk size per partitioned dimension.
    chunk_sizes: SmallVec<[i64; 4]>,
    /// Partition-id stride per partitioned dimension.
    strides: SmallVec<[i64; 4]>,
}

impl ShapePartitionIterator {
    /// Partition the leading `counts.len()` dimensions of `dims`.
    ///
    /// `counts` must hold at most `dims.len()` entries, each at least 1.
    pub fn new(dims: &[i64], counts: &[i64]) -> Self {
        debug_assert!(counts.len() <= dims.len(), "more partition counts than dimensions");
        debug_assert!(counts.iter().all(|&c| c >= 1), "partition counts must be positive");

        let k = counts.len();
        let dim_sizes: SmallVec<[i64; 4]> = dims[..k].iter().copied().collect();
        let chunk_sizes = dim_sizes.iter().zip(counts).map(|(&size, &count)| (size / count).max(1)).collect();

        let mut strides: SmallVec<[i64; 4]> = smallvec![1; k];
        for i in (0..k.saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * counts[i + 1];
        }

        Self { dim_sizes, counts: SmallVec::from_slice(counts), chunk_sizes, strides }
    }

    pub fn num_parallel_dimensions(&self) -> usize {
        self.counts.len()
    }

    pub fn total_partition_count(&self) -> i64 {
        total_partition_count(&self.counts)
    }

    /// Bounds of partition `index`, one `[lower, upper)` per partitioned dimension.
    ///
    /// `index` must lie in `[0, total_partition_count())`.
    pub fn partition(&self, index: i64) -> PartitionBounds {
        debug_assert!((0..self.total_partition_count()).contains(&index), "partition {index} out of range");

        let mut remaining = index;
        let mut bounds = PartitionBounds::with_capacity(self.counts.len());
        for i in 0..self.counts.len() {
            let partition_index = remaining / self.strides[i];
            remaining -= partition_index * self.strides[i];

            let size = self.dim_sizes[i];
            let chunk = self.chunk_sizes[i];
            let lower = (partition_index * chunk).min(size);
            let upper = if partition_index == self.counts[i] - 1 { size } else { ((partition_index + 1) * chunk).min(size) };
            bounds.push((lower, upper));
        }
        bounds
    }

    /// All partitions in id order.
    pub fn partitions(&self) -> impl Iterator<Item = PartitionBounds> + '_ {
        (0..self.total_partition_count()).map(|i| self.partition(i))
    }
}

/// Chooses per-outer-dimension partition counts for a target parallelism.
///
/// Gathers outer dimensions until their combined size reaches the target,
/// spreads the target evenly over them (clipped to each dimension size), then
/// greedily grows the outer dimensions while the product stays within the
/// target.
#[derive(Debug, Clone)]
pub struct ShapePartitionAssigner<'a> {
    dims: &'a [i64],
}

impl<'a> ShapePartitionAssigner<'a> {
    pub fn new(dims: &'a [i64]) -> Self {
        Self { dims }
    }

    /// Per-outer-dimension partition counts for `target_partition_count` parallel units.
    ///
    /// Returns an empty list for rank-0 shapes. Non-positive targets are
    /// treated as 1.
    pub fn run(&self, target_partition_count: i64) -> Vec<i64> {
        let mut target = target_partition_count.max(1);

        let mut outer_dims = 0;
        let mut outer_dim_size = 1i64;
        for &size in self.dims {
            outer_dims += 1;
            outer_dim_size = outer_dim_size.saturating_mul(size);
            if outer_dim_size >= target {
                break;
            }
        }
        if outer_dims == 0 {
            return Vec::new();
        }

        target = target.min(outer_dim_size);

        // Factor the target into `outer_dims` roughly equal terms.
        let per_dim = ((target as f64).powf(1.0 / outer_dims as f64) as i64).max(1);
        let mut counts: Vec<i64> = self.dims[..outer_dims].iter().map(|&size| size.min(per_dim)).collect();

        if total_partition_count(&counts) < target {
            for i in 0..counts.len() {
                let current = counts[i];
                let others = total_partition_count(&counts) / current;
                let additional = (target / others - current).min(self.dims[i] - current);
                if additional > 0 {
                    counts[i] += additional;
                }
            }
        }

        counts
    }
}

/// Attach a partition directive sized for `target_partition_count` parallel units.
///
/// Nodes that already carry a directive, tuple-shaped nodes and nodes for
/// which the assigner picks a single partition are returned unchanged.
pub fn assign_outer_dimension_partitions(node: &Arc<Node>, target_partition_count: i64) -> Result<Arc<Node>> {
    let Shape::Array(shape) = node.shape() else {
        return Ok(Arc::clone(node));
    };
    if parallel_config(node).is_some() {
        return Ok(Arc::clone(node));
    }

    let counts = ShapePartitionAssigner::new(shape.dims()).run(target_partition_count);
    if total_partition_count(&counts) <= 1 {
        return Ok(Arc::clone(node));
    }

    tracing::debug!(node = node.name(), ?counts, "assigned outer dimension partitions");
    Ok(node.with_backend_config(&BackendConfig::with_outer_dimension_partitions(counts))?)
}
