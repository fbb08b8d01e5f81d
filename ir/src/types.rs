//! Element types stored in dense arrays.

/// Primitive element type of an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumString, strum::EnumIter, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ElementType {
    S32,
    S64,
    F32,
    F64,
}

impl ElementType {
    /// Size of one element in bytes.
    pub const fn byte_size(&self) -> usize {
        match self {
            Self::S32 | Self::F32 => 4,
            Self::S64 | Self::F64 => 8,
        }
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub const fn is_integer(&self) -> bool {
        !self.is_float()
    }
}
