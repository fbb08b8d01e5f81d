//! Elemental host kernel emission.
//!
//! Chooses how the loops of a node are emitted and drives the full pipeline
//! from a node to a [`KernelSpec`].
//!
//! | results | opcode multi-output capable | directive | strategy | thread dim |
//! |---|---|---|---|---|
//! | > 1 | no | any | error | - |
//! | > 1 | yes | any | [`LoopStrategy::MultiResult`] | 1 |
//! | 1 | - | yes | [`LoopStrategy::Partitioned`] | partitions |
//! | 1 | - | no | [`LoopStrategy::WholeShape`] | 1 |

use std::sync::Arc;

use snafu::{OptionExt, ensure};
use strata_ir::{Node, Opcode, ParallelConfig, parallel_config};

use crate::bounds::emit_parallel_partition_bounds;
use crate::elemental::ElementalGenerator;
use crate::error::*;
use crate::generator::ElementGenerator;
use crate::kernel::{KernelBuilder, ir_name};
use crate::kernel_api::{KernelApiIrBuilder, KernelApiOptions, KernelPrototype};
use crate::loops::{LoopEmitter, ParallelLoopEmitter};
use crate::spec::{KernelSource, KernelSpec, ThreadDim};

/// Loop emission strategy for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStrategy {
    /// One loop nest over the whole output.
    WholeShape,
    /// One loop nest over the partition selected by the thread id.
    Partitioned(ParallelConfig),
    /// One loop nest writing every result; never partitioned.
    MultiResult,
}

/// Select the loop strategy.
///
/// # Errors
/// [`Error::UnsupportedMultiOutput`] when there are several results and
/// `opcode` is not one of fusion, reduce or reduce-window.
pub fn select_strategy(
    opcode: Opcode,
    num_results: usize,
    parallel_config: Option<ParallelConfig>,
) -> Result<LoopStrategy> {
    let multiple_results = num_results > 1;
    ensure!(!multiple_results || opcode.supports_multiple_results(), UnsupportedMultiOutputSnafu { opcode });

    // Multi-result loops ignore the partition directive.
    Ok(match (multiple_results, parallel_config) {
        (true, _) => LoopStrategy::MultiResult,
        (false, Some(config)) => LoopStrategy::Partitioned(config),
        (false, None) => LoopStrategy::WholeShape,
    })
}

/// Emit the loops of `node` into `b` and return the thread dim the kernel expects.
pub fn emit_elemental_loops(
    b: &mut KernelBuilder,
    node: &Node,
    prototype: &KernelPrototype,
    generator: &dyn ElementGenerator,
) -> Result<ThreadDim> {
    let strategy = select_strategy(node.opcode(), prototype.results().len(), parallel_config(node))?;
    tracing::debug!(node = node.name(), ?strategy, "selected loop strategy");

    let name = ir_name(node);
    if strategy == LoopStrategy::MultiResult {
        LoopEmitter::new(generator, prototype, prototype.results()).emit_loop(b, &name)?;
        return Ok(ThreadDim::default());
    }

    let result = prototype.results().first().context(NoResultsSnafu { kernel: prototype.function_name() })?;

    if let LoopStrategy::Partitioned(config) = &strategy {
        let parallel_bounds = emit_parallel_partition_bounds(b, prototype, config, result.shape(), &name);
        ParallelLoopEmitter::new(generator, prototype, result, &parallel_bounds).emit_loop(b, &name)?;
        return Ok(ThreadDim::new(config.total_partition_count() as u64));
    }

    LoopEmitter::new(generator, prototype, std::slice::from_ref(result)).emit_loop(b, &name)?;
    Ok(ThreadDim::default())
}

/// Emits a complete host kernel for one elementwise node or loop fusion.
pub struct ElementalKernelEmitter {
    node: Arc<Node>,
    kernel_api_ir_builder: KernelApiIrBuilder,
}

impl ElementalKernelEmitter {
    /// Emitter configured from the environment (see [`KernelApiOptions::from_env`]).
    pub fn new(node: Arc<Node>) -> Self {
        Self::with_options(node, KernelApiOptions::from_env())
    }

    pub fn with_options(node: Arc<Node>, options: KernelApiOptions) -> Self {
        Self { node, kernel_api_ir_builder: KernelApiIrBuilder::new(options) }
    }

    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    #[tracing::instrument(skip_all, fields(node = self.node.name()))]
    pub fn emit_kernel_spec(&self) -> Result<KernelSpec> {
        tracing::debug!("emit elemental host kernel");

        let name = ir_name(&self.node);
        let mut b = KernelBuilder::new(format!("{name}_elemental_kernel_module"));
        let prototype = self.kernel_api_ir_builder.emit_kernel_prototype(&self.node, "_kernel")?;

        let generator = ElementalGenerator::new(&self.node);
        let thread_dim = emit_elemental_loops(&mut b, &self.node, &prototype, &generator)?;

        let source = KernelSource::new(b.finish(&prototype));

        // Buffer allocations and uses come from buffer assignment, which binds
        // kernels after emission.
        Ok(KernelSpec::new(thread_dim, Vec::new(), Vec::new(), source))
    }
}
