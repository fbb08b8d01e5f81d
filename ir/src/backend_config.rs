//! Backend configuration attached to nodes and the parallel partition directive.
//!
//! Nodes carry their backend configuration as a serialized JSON string. The
//! only field the host-kernel emitter reads is `outer_dimension_partitions`:
//! one partition count per leading dimension of the node shape.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use snafu::ResultExt;

use crate::{Node, Result, error::*};

/// Serialized per-node backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Number of partitions for each outer dimension, outermost first.
    pub outer_dimension_partitions: Vec<i64>,
}

impl BackendConfig {
    pub fn with_outer_dimension_partitions(partitions: impl Into<Vec<i64>>) -> Self {
        Self { outer_dimension_partitions: partitions.into() }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context(SerializeBackendConfigSnafu)
    }

    /// Parse a serialized configuration.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Validated parallel partition directive.
///
/// Entry `i` splits dimension `i` into that many contiguous partitions.
/// Every entry is at least 1, there are never more entries than the rank
/// of the shape it was read for, and the bounds table of all partitions
/// (`total * entries * 2` values) is addressable with `i64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParallelConfig {
    outer_dimension_partitions: SmallVec<[i64; 4]>,
}

impl ParallelConfig {
    /// Build a directive for a shape of rank `rank`.
    ///
    /// Returns `None` when the list is empty, longer than `rank`, holds an
    /// entry below 1, or its partition count overflows.
    pub fn new(partitions: &[i64], rank: usize) -> Option<Self> {
        if partitions.is_empty() || partitions.len() > rank || partitions.iter().any(|&p| p < 1) {
            return None;
        }
        let total = partitions.iter().try_fold(1i64, |acc, &p| acc.checked_mul(p))?;
        total.checked_mul(partitions.len() as i64)?.checked_mul(2)?;
        Some(Self { outer_dimension_partitions: SmallVec::from_slice(partitions) })
    }

    pub fn outer_dimension_partitions(&self) -> &[i64] {
        &self.outer_dimension_partitions
    }

    /// Number of partitioned leading dimensions.
    pub fn num_parallel_dimensions(&self) -> usize {
        self.outer_dimension_partitions.len()
    }

    /// Product of all per-dimension counts.
    pub fn total_partition_count(&self) -> i64 {
        self.outer_dimension_partitions.iter().product()
    }
}

/// Read the parallel partition directive of `node`.
///
/// Absence is the normal case: a node without backend configuration, with a
/// configuration that does not parse, or with an empty partition list has no
/// directive. Malformed lists (non-positive entries, more entries than the
/// rank of the node shape, an overflowing partition count) are also treated
/// as absent.
pub fn parallel_config(node: &Node) -> Option<ParallelConfig> {
    let raw = node.raw_backend_config()?;

    let config = match BackendConfig::from_json(raw) {
        Ok(config) => config,
        Err(error) => {
            tracing::debug!(node = node.name(), %error, "backend config did not parse; no parallel directive");
            return None;
        }
    };

    if config.outer_dimension_partitions.is_empty() {
        return None;
    }

    let rank = node.shape().rank();
    let parallel = ParallelConfig::new(&config.outer_dimension_partitions, rank);
    if parallel.is_none() {
        tracing::warn!(
            node = node.name(),
            partitions = ?config.outer_dimension_partitions,
            rank,
            "ignoring malformed outer dimension partitions"
        );
    }
    parallel
}
