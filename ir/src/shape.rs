//! Static shapes.
//!
//! Every dimension is a known positive size; arrays use a row-major layout, so
//! dimension 0 is the outermost (slowest varying) one. Tuple shapes describe
//! nodes that produce several arrays at once and are always flat.

use std::fmt;

use smallvec::SmallVec;
use snafu::ensure;

use crate::{ElementType, Result, error::*};

/// Dimension sizes of an array.
///
/// Inline capacity of 4 covers the ranks seen in practice without heap
/// allocation.
pub type Dims = SmallVec<[i64; 4]>;

/// Dense array shape: element type plus dimension sizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayShape {
    element_type: ElementType,
    dims: Dims,
}

impl ArrayShape {
    /// Create an array shape, rejecting zero or negative dimensions.
    pub fn new(element_type: ElementType, dims: &[i64]) -> Result<Self> {
        ensure!(dims.iter().all(|&d| d > 0), NonPositiveDimensionSnafu { dims: Dims::from_slice(dims) });
        Ok(Self { element_type, dims: Dims::from_slice(dims) })
    }

    /// Rank-0 array holding a single element.
    pub fn scalar(element_type: ElementType) -> Self {
        Self { element_type, dims: Dims::new() }
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn dims(&self) -> &[i64] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements (1 for a scalar).
    pub fn element_count(&self) -> i64 {
        self.dims.iter().product()
    }

    /// Row-major strides in elements.
    pub fn strides(&self) -> Dims {
        let mut strides: Dims = smallvec::smallvec![1; self.dims.len()];
        for d in (0..self.dims.len().saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * self.dims[d + 1];
        }
        strides
    }

    /// Linear offset of a multi-dimensional index, or `None` if any coordinate is out of range.
    pub fn linear_index(&self, index: &[i64]) -> Option<i64> {
        if index.len() != self.dims.len() {
            return None;
        }
        let mut offset = 0;
        for ((&i, &size), stride) in index.iter().zip(self.dims.iter()).zip(self.strides()) {
            if i < 0 || i >= size {
                return None;
            }
            offset += i * stride;
        }
        Some(offset)
    }

    /// Same dimensions, ignoring element type.
    pub fn same_dimensions(&self, other: &ArrayShape) -> bool {
        self.dims == other.dims
    }
}

impl fmt::Display for ArrayShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.element_type)?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Shape of a node result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    Array(ArrayShape),
    Tuple(Vec<ArrayShape>),
}

impl Shape {
    /// Array shape shorthand.
    pub fn array(element_type: ElementType, dims: &[i64]) -> Result<Self> {
        Ok(Self::Array(ArrayShape::new(element_type, dims)?))
    }

    /// Flat tuple of array shapes.
    pub fn tuple(elements: Vec<Shape>) -> Result<Self> {
        ensure!(!elements.is_empty(), EmptyTupleSnafu);
        let elements = elements
            .into_iter()
            .map(|s| match s {
                Shape::Array(a) => Ok(a),
                Shape::Tuple(_) => NestedTupleSnafu.fail(),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::Tuple(elements))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Self::Tuple(_))
    }

    /// Array view of this shape.
    ///
    /// # Errors
    /// Returns [`Error::ExpectedArray`] for tuple shapes.
    pub fn as_array(&self) -> Result<&ArrayShape> {
        match self {
            Self::Array(a) => Ok(a),
            Self::Tuple(_) => ExpectedArraySnafu { shape: self.to_string() }.fail(),
        }
    }

    /// Leaf array shapes in order; a single element for array shapes.
    pub fn leaves(&self) -> &[ArrayShape] {
        match self {
            Self::Array(a) => std::slice::from_ref(a),
            Self::Tuple(elements) => elements,
        }
    }

    /// Rank of the array, or of the first tuple element.
    pub fn rank(&self) -> usize {
        self.leaves().first().map_or(0, ArrayShape::rank)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array(a) => write!(f, "{a}"),
            Self::Tuple(elements) => {
                write!(f, "(")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<ArrayShape> for Shape {
    fn from(shape: ArrayShape) -> Self {
        Self::Array(shape)
    }
}
