//! Structured kernel IR.
//!
//! Loop emitters build kernels in this small, typed form instead of raw text:
//! nested counted loops, let-bound index values, element reads from argument
//! buffers and stores into result buffers. The same module is rendered to LLVM
//! IR by [`crate::llvm`] and executed directly by the host reference executor.

pub mod builder;
pub mod ir_array;

pub use builder::KernelBuilder;
pub use ir_array::{ArrayKind, IrArray, IrIndex, ir_name};

use strata_ir::ElementType;

use crate::bounds::BoundsTable;

/// Let-bound value within a kernel function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub usize);

/// Loop induction variable within a kernel function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// Read-only global of the kernel module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalId(pub usize);

/// Component of the runtime thread id passed to the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadAxis {
    X,
    Y,
    Z,
}

impl ThreadAxis {
    pub const ALL: [ThreadAxis; 3] = [ThreadAxis::X, ThreadAxis::Y, ThreadAxis::Z];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

/// Which end of a half-open partition range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundSide {
    /// Inclusive start.
    Lower = 0,
    /// Exclusive end.
    Upper = 1,
}

/// Elementwise unary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Abs,
    Exp,
    Sqrt,
}

/// Elementwise binary operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Float division, or integer division truncated toward zero.
    Div,
    Max,
    Min,
}

/// Kernel expression.
///
/// Index-typed expressions (`Index`, `Var`, `Value`, `ThreadId`, `LoadBound`)
/// are 64-bit signed integers. Element expressions carry their element type.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Index constant.
    Index(i64),
    /// Element constant.
    Const { value: f64, element_type: ElementType },
    /// Loop induction variable.
    Var(VarId),
    /// Let-bound value.
    Value(ValueId),
    /// Runtime thread id component.
    ThreadId(ThreadAxis),
    /// Load one partition bound from a bounds table global.
    LoadBound { table: GlobalId, partition: Box<Expr>, dim: usize, side: BoundSide },
    /// Read one element of an argument buffer.
    Read { array: IrArray, index: Vec<Expr> },
    Unary { op: UnaryOp, element_type: ElementType, operand: Box<Expr> },
    Binary { op: BinaryOp, element_type: ElementType, lhs: Box<Expr>, rhs: Box<Expr> },
}

impl Expr {
    pub fn unary(op: UnaryOp, element_type: ElementType, operand: Expr) -> Self {
        Self::Unary { op, element_type, operand: Box::new(operand) }
    }

    pub fn binary(op: BinaryOp, element_type: ElementType, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary { op, element_type, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }
}

/// Kernel statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Bind an index expression to a named value.
    Let { value: ValueId, expr: Expr },
    /// Counted loop over `[lower, upper)` with unit step.
    For { var: VarId, lower: Expr, upper: Expr, body: Vec<Stmt> },
    /// Write one element of a result buffer.
    Store { array: IrArray, index: Vec<Expr>, value: Expr },
}

/// Code-generation attributes attached to the kernel function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionAttributes {
    /// Preferred vector register width in bits.
    pub prefer_vector_width: u32,
    /// Argument loads never alias writes and may be marked invariant.
    pub invariant_argument_loads: bool,
}

/// Kernel entry function.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelFunction {
    pub name: String,
    pub arguments: Vec<IrArray>,
    pub results: Vec<IrArray>,
    pub body: Vec<Stmt>,
    /// Names of let-bound values, indexed by [`ValueId`].
    pub value_names: Vec<String>,
    /// Names of loop variables, indexed by [`VarId`].
    pub var_names: Vec<String>,
    pub attributes: FunctionAttributes,
}

/// Generated kernel module: one entry function plus its read-only globals.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelModule {
    pub name: String,
    pub globals: Vec<BoundsTable>,
    pub function: KernelFunction,
}

impl KernelModule {
    pub fn global(&self, id: GlobalId) -> Option<&BoundsTable> {
        self.globals.get(id.0)
    }
}
