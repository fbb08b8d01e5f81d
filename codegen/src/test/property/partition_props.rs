use proptest::prelude::*;
use strata_ir::ParallelConfig;

use super::generators::arb_partitioned_shape;
use crate::bounds::BoundsTable;
use crate::partition::ShapePartitionIterator;

proptest! {
    /// The partition count is the product of the per-dimension counts.
    #[test]
    fn total_is_product((dims, counts) in arb_partitioned_shape()) {
        let config = ParallelConfig::new(&counts, dims.len()).expect("generated counts are valid");
        let iter = ShapePartitionIterator::new(&dims, &counts);
        prop_assert_eq!(iter.total_partition_count(), counts.iter().product::<i64>());
        prop_assert_eq!(config.total_partition_count(), iter.total_partition_count());
        prop_assert_eq!(iter.partitions().count() as i64, iter.total_partition_count());
    }

    /// Along each dimension the chunks are disjoint and tile [0, size) in order.
    #[test]
    fn chunks_tile_each_dimension((dims, counts) in arb_partitioned_shape()) {
        let iter = ShapePartitionIterator::new(&dims, &counts);
        let total = iter.total_partition_count();

        for (d, (&size, &count)) in dims.iter().zip(counts.iter()).enumerate() {
            // Partition ids that differ only in dimension d's index.
            let stride: i64 = counts[d + 1..].iter().product();
            let mut next = 0;
            for p in 0..count {
                let (lower, upper) = iter.partition(p * stride)[d];
                prop_assert_eq!(lower, next);
                prop_assert!(lower <= upper);
                next = upper;
            }
            prop_assert_eq!(next, size);
            prop_assert!(total % count == 0);
        }
    }

    /// Every element of the partitioned dimensions belongs to exactly one partition.
    #[test]
    fn partitions_cover_exactly_once((dims, counts) in arb_partitioned_shape()) {
        let iter = ShapePartitionIterator::new(&dims, &counts);
        let outer = &dims[..counts.len()];
        let mut hits = vec![0u32; outer.iter().product::<i64>() as usize];

        for bounds in iter.partitions() {
            for_each_index(&bounds, |index| {
                let offset = index.iter().zip(outer).fold(0, |acc, (&i, &size)| acc * size + i);
                hits[offset as usize] += 1;
            });
        }

        prop_assert!(hits.iter().all(|&h| h == 1), "hits: {:?}", hits);
    }

    /// Table lookups agree with the direct computation.
    #[test]
    fn table_matches_iterator((dims, counts) in arb_partitioned_shape()) {
        let iter = ShapePartitionIterator::new(&dims, &counts);
        let table = BoundsTable::build("t", &iter);
        for p in 0..iter.total_partition_count() {
            for (d, bounds) in iter.partition(p).iter().enumerate() {
                prop_assert_eq!(table.get(p as usize, d), Some(*bounds));
            }
        }
    }

    /// Building twice yields identical tables.
    #[test]
    fn table_is_deterministic((dims, counts) in arb_partitioned_shape()) {
        let first = BoundsTable::build("t", &ShapePartitionIterator::new(&dims, &counts));
        let second = BoundsTable::build("t", &ShapePartitionIterator::new(&dims, &counts));
        prop_assert_eq!(first, second);
    }
}

/// Visit every index of the rectangle `bounds`, innermost dimension fastest.
fn for_each_index(bounds: &[(i64, i64)], mut f: impl FnMut(&[i64])) {
    if bounds.iter().any(|&(lower, upper)| lower >= upper) {
        return;
    }
    let mut index: Vec<i64> = bounds.iter().map(|&(lower, _)| lower).collect();
    loop {
        f(&index);
        let mut d = bounds.len();
        loop {
            if d == 0 {
                return;
            }
            d -= 1;
            index[d] += 1;
            if index[d] < bounds[d].1 {
                break;
            }
            index[d] = bounds[d].0;
        }
    }
}
