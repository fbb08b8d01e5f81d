//! Kernel ABI: options, thread id and the kernel prototype.
//!
//! Every host kernel has the same entry signature: a pointer to the argument
//! buffer table, a pointer to the result buffer table, and a pointer to the
//! `{x, y, z}` thread id of the invocation. The prototype binds typed
//! [`IrArray`] accessors to those tables.

use bon::bon;
use strata_ir::Node;

use crate::Result;
use crate::kernel::{Expr, IrArray, ThreadAxis, ir_name};

/// Options applied to every emitted kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelApiOptions {
    /// Mark argument loads `!invariant.load`.
    pub enable_invariant_load_metadata: bool,
    /// Preferred vector width in bits, forwarded as a function attribute.
    pub prefer_vector_width: u32,
}

impl Default for KernelApiOptions {
    fn default() -> Self {
        Self { enable_invariant_load_metadata: true, prefer_vector_width: 256 }
    }
}

#[bon]
impl KernelApiOptions {
    /// Create options with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(default = true)] enable_invariant_load_metadata: bool,
        #[builder(default = 256)] prefer_vector_width: u32,
    ) -> Self {
        Self { enable_invariant_load_metadata, prefer_vector_width }
    }

    /// Create options from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `STRATA_INVARIANT_LOADS=0` - Disable `!invariant.load` metadata (default: enabled)
    /// * `STRATA_PREFER_VECTOR_WIDTH=N` - Preferred vector width in bits (default: 256)
    pub fn from_env() -> Self {
        let enable_invariant_load_metadata = std::env::var("STRATA_INVARIANT_LOADS").map_or(true, |v| v != "0");
        let prefer_vector_width =
            std::env::var("STRATA_PREFER_VECTOR_WIDTH").ok().and_then(|s| s.parse().ok()).unwrap_or(256);

        Self { enable_invariant_load_metadata, prefer_vector_width }
    }
}

/// Runtime thread id of a kernel invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadId {
    pub x: Expr,
    pub y: Expr,
    pub z: Expr,
}

impl Default for ThreadId {
    fn default() -> Self {
        Self {
            x: Expr::ThreadId(ThreadAxis::X),
            y: Expr::ThreadId(ThreadAxis::Y),
            z: Expr::ThreadId(ThreadAxis::Z),
        }
    }
}

/// Kernel entry point: name, bound buffers and thread id.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelPrototype {
    function_name: String,
    arguments: Vec<IrArray>,
    results: Vec<IrArray>,
    thread_id: ThreadId,
    options: KernelApiOptions,
}

impl KernelPrototype {
    pub fn new(
        function_name: impl Into<String>,
        arguments: Vec<IrArray>,
        results: Vec<IrArray>,
        options: KernelApiOptions,
    ) -> Self {
        Self { function_name: function_name.into(), arguments, results, thread_id: ThreadId::default(), options }
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn arguments(&self) -> &[IrArray] {
        &self.arguments
    }

    pub fn results(&self) -> &[IrArray] {
        &self.results
    }

    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    pub fn options(&self) -> KernelApiOptions {
        self.options
    }
}

/// Builds kernel prototypes for nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelApiIrBuilder {
    options: KernelApiOptions,
}

impl KernelApiIrBuilder {
    pub fn new(options: KernelApiOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> KernelApiOptions {
        self.options
    }

    /// Prototype named `<node><suffix>` with one argument per operand and one
    /// result per leaf of the node shape.
    ///
    /// # Errors
    /// Fails if an operand has a tuple shape.
    pub fn emit_kernel_prototype(&self, node: &Node, suffix: &str) -> Result<KernelPrototype> {
        let arguments = node
            .operands()
            .iter()
            .enumerate()
            .map(|(i, operand)| Ok(IrArray::argument(i, operand.shape().as_array()?.clone())))
            .collect::<Result<Vec<_>>>()?;

        let results =
            node.shape().leaves().iter().enumerate().map(|(i, shape)| IrArray::result(i, shape.clone())).collect();

        Ok(KernelPrototype::new(format!("{}{suffix}", ir_name(node)), arguments, results, self.options))
    }
}
