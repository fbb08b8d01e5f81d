//! Operation kinds a node can carry.

/// Closed set of node opcodes.
///
/// Names render in the canonical kebab-case form (`reduce-window`, `add`),
/// which is what diagnostics report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::EnumString, strum::EnumIter, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Opcode {
    Parameter,
    Constant,

    // Unary elementwise
    Negate,
    Abs,
    Exponential,
    Sqrt,

    // Binary elementwise
    Add,
    Subtract,
    Multiply,
    Divide,
    Maximum,
    Minimum,

    // Structured
    Fusion,
    Reduce,
    ReduceWindow,
}

impl Opcode {
    /// Opcodes whose loop nest may write several result buffers at once.
    pub const fn supports_multiple_results(&self) -> bool {
        matches!(self, Self::Fusion | Self::Reduce | Self::ReduceWindow)
    }

    pub const fn is_elementwise_unary(&self) -> bool {
        matches!(self, Self::Negate | Self::Abs | Self::Exponential | Self::Sqrt)
    }

    pub const fn is_elementwise_binary(&self) -> bool {
        matches!(self, Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Maximum | Self::Minimum)
    }

    pub const fn is_elementwise(&self) -> bool {
        self.is_elementwise_unary() || self.is_elementwise_binary()
    }
}
