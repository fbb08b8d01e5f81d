//! Buffer accessors for kernel arguments and results.

use smallvec::SmallVec;
use strata_ir::{ArrayShape, Node};

use super::{Expr, Stmt};

/// Which kernel parameter a buffer is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    Argument(usize),
    Result(usize),
}

/// Typed view of one kernel buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IrArray {
    kind: ArrayKind,
    shape: ArrayShape,
}

impl IrArray {
    pub fn argument(index: usize, shape: ArrayShape) -> Self {
        Self { kind: ArrayKind::Argument(index), shape }
    }

    pub fn result(index: usize, shape: ArrayShape) -> Self {
        Self { kind: ArrayKind::Result(index), shape }
    }

    pub fn kind(&self) -> ArrayKind {
        self.kind
    }

    pub fn shape(&self) -> &ArrayShape {
        &self.shape
    }

    pub fn emit_read_array_element(&self, index: &IrIndex) -> Expr {
        Expr::Read { array: self.clone(), index: index.multidim().to_vec() }
    }

    pub fn emit_write_array_element(&self, index: &IrIndex, value: Expr) -> Stmt {
        Stmt::Store { array: self.clone(), index: index.multidim().to_vec(), value }
    }
}

/// Multi-dimensional element index, one index expression per dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct IrIndex {
    multidim: SmallVec<[Expr; 4]>,
}

impl IrIndex {
    pub fn new(multidim: impl IntoIterator<Item = Expr>) -> Self {
        Self { multidim: multidim.into_iter().collect() }
    }

    /// Index of a rank-0 array.
    pub fn scalar() -> Self {
        Self { multidim: SmallVec::new() }
    }

    pub fn multidim(&self) -> &[Expr] {
        &self.multidim
    }

    pub fn rank(&self) -> usize {
        self.multidim.len()
    }
}

/// IR-safe identifier derived from a node name.
///
/// Keeps `[A-Za-z0-9_.]`, replaces everything else with `_`, and never starts
/// with a digit or a dot.
pub fn ir_name(node: &Node) -> String {
    sanitize(node.name())
}

pub(crate) fn sanitize(name: &str) -> String {
    let mut out: String =
        name.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '.' { c } else { '_' }).collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        out.insert(0, '_');
    }
    out
}
