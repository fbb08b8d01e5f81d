//! IR nodes.
//!
//! A [`Node`] is immutable once built and shared through `Arc`. Operands are
//! other nodes; fusion nodes additionally own a fused computation expressed as
//! one root per output, whose leaves are `Parameter` nodes numbered after the
//! fusion operands.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bon::bon;

use crate::{BackendConfig, ElementType, Opcode, Result, Shape};

// Monotonic, never reused. Relaxed ordering only needs uniqueness.
static NODE_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_node_id() -> u64 {
    NODE_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// One unit of computation.
#[derive(Debug)]
pub struct Node {
    /// Stable unique id.
    pub id: u64,
    name: String,
    opcode: Opcode,
    shape: Shape,
    operands: Vec<Arc<Node>>,
    fused_roots: Vec<Arc<Node>>,
    parameter_number: Option<usize>,
    literal: Option<f64>,
    backend_config: Option<String>,
}

#[bon]
impl Node {
    /// Generic node constructor.
    ///
    /// ```rust
    /// # use strata_ir::{ElementType, Node, Opcode, Shape};
    /// let shape = Shape::array(ElementType::F32, &[16]).unwrap();
    /// let p0 = Node::parameter(0, "p0", shape.clone());
    /// let p1 = Node::parameter(1, "p1", shape.clone());
    /// let add = Node::builder().name("add").opcode(Opcode::Add).shape(shape).operands(vec![p0, p1]).build();
    /// assert_eq!(add.operands().len(), 2);
    /// ```
    #[builder]
    pub fn new(
        #[builder(into)] name: String,
        opcode: Opcode,
        shape: Shape,
        #[builder(default)] operands: Vec<Arc<Node>>,
        #[builder(default)] fused_roots: Vec<Arc<Node>>,
        parameter_number: Option<usize>,
        literal: Option<f64>,
        #[builder(into)] backend_config: Option<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: next_node_id(),
            name,
            opcode,
            shape,
            operands,
            fused_roots,
            parameter_number,
            literal,
            backend_config,
        })
    }

    /// Function parameter `number`.
    pub fn parameter(number: usize, name: impl Into<String>, shape: Shape) -> Arc<Self> {
        Self::builder().name(name).opcode(Opcode::Parameter).shape(shape).parameter_number(number).build()
    }

    /// Scalar constant broadcast to whatever index it is read at.
    pub fn constant(name: impl Into<String>, value: f64, element_type: ElementType) -> Arc<Self> {
        Self::builder()
            .name(name)
            .opcode(Opcode::Constant)
            .shape(Shape::Array(crate::ArrayShape::scalar(element_type)))
            .literal(value)
            .build()
    }

    /// Copy of `self` with a different backend configuration.
    ///
    /// The copy gets a fresh id.
    pub fn with_backend_config(&self, config: &BackendConfig) -> Result<Arc<Self>> {
        Ok(Arc::new(Self {
            id: next_node_id(),
            name: self.name.clone(),
            opcode: self.opcode,
            shape: self.shape.clone(),
            operands: self.operands.clone(),
            fused_roots: self.fused_roots.clone(),
            parameter_number: self.parameter_number,
            literal: self.literal,
            backend_config: Some(config.to_json()?),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn operands(&self) -> &[Arc<Node>] {
        &self.operands
    }

    pub fn operand(&self, i: usize) -> Option<&Arc<Node>> {
        self.operands.get(i)
    }

    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// Fused computation roots, one per output. Empty for non-fusion nodes.
    pub fn fused_roots(&self) -> &[Arc<Node>] {
        &self.fused_roots
    }

    pub fn parameter_number(&self) -> Option<usize> {
        self.parameter_number
    }

    pub fn literal(&self) -> Option<f64> {
        self.literal
    }

    /// Raw serialized backend configuration, if any.
    pub fn raw_backend_config(&self) -> Option<&str> {
        self.backend_config.as_deref()
    }
}
