use std::fmt;
use std::mem::discriminant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod concrete_index;
pub mod stepping;

use concrete_index::{ConcreteIndex, ExpandedIndex, FlatIndex};

/// Interprets points of an n-dimensional grid as indices of a flat array, and back.
///
/// Dimension 0 is the least significant: the flat index of a point is
/// `point[0] + point[1] * dims[0] + point[2] * dims[0] * dims[1] + ...`.
///
/// Both the dimensions and the running products are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<ConcreteIndex>", into = "Vec<ConcreteIndex>")]
pub struct Interpreter {
    dims: Vec<ConcreteIndex>,
    /// `sizes[i]` is the number of cells spanned by the first `i + 1` dimensions
    sizes: Vec<ConcreteIndex>,
}

impl Interpreter {
    /// Builds an interpreter for the given dimensions.
    ///
    /// # Panics
    ///
    /// If [`Self::try_new`] would return an error.
    pub fn new(dims: impl Into<Vec<ConcreteIndex>>) -> Self {
        Self::try_new(dims).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Builds an interpreter for the given dimensions.
    ///
    /// # Errors
    ///
    /// - [`InterpreterError::EmptyShape`] if there are no dimensions
    /// - [`InterpreterError::InvalidDimension`] for the first dimension that is not positive
    /// - [`InterpreterError::ShapeTooLarge`] if the total size does not fit in an `isize`
    pub fn try_new(dims: impl Into<Vec<ConcreteIndex>>) -> Result<Self, InterpreterError> {
        let dims = dims.into();
        if dims.is_empty() {
            return Err(InterpreterError::EmptyShape);
        }

        if let Some((axis, &value)) = dims.iter().enumerate().find(|&(_, &d)| d <= 0) {
            return Err(InterpreterError::InvalidDimension { axis, value });
        }

        let mut sizes = Vec::with_capacity(dims.len());
        let mut running: ConcreteIndex = 1;
        for (axis, &d) in dims.iter().enumerate() {
            running = running
                .checked_mul(d)
                .ok_or(InterpreterError::ShapeTooLarge { axis })?;
            sizes.push(running);
        }

        Ok(Interpreter { dims, sizes })
    }

    pub fn dims(&self) -> &[ConcreteIndex] {
        &self.dims
    }

    pub fn sizes(&self) -> &[ConcreteIndex] {
        &self.sizes
    }

    /// The number of dimensions
    pub fn order(&self) -> usize {
        self.dims.len()
    }

    /// The number of cells, i.e. the product of all dimensions.
    pub fn size(&self) -> ConcreteIndex {
        self.sizes[self.sizes.len() - 1]
    }

    /// Verifies that `point` lies inside the shape.
    ///
    /// # Errors
    ///
    /// - [`InterpreterError::EmptyPoint`] if the point has no coordinates
    /// - [`InterpreterError::PointLengthMismatch`] if it has more or fewer coordinates than the
    ///   shape has dimensions
    /// - [`InterpreterError::PointOutOfBounds`] for the first coordinate outside `0..dims[axis]`
    pub fn check_point(&self, point: &[ConcreteIndex]) -> Result<(), InterpreterError> {
        if point.is_empty() {
            return Err(InterpreterError::EmptyPoint);
        }
        if point.len() != self.order() {
            return Err(InterpreterError::PointLengthMismatch {
                actual: point.len(),
                expected: self.order(),
            });
        }

        for (axis, (&value, &bound)) in point.iter().zip(&self.dims).enumerate() {
            if value < 0 || value >= bound {
                return Err(InterpreterError::PointOutOfBounds { axis, value, bound });
            }
        }
        Ok(())
    }

    /// Verifies that `index` addresses a cell of the shape.
    ///
    /// # Errors
    ///
    /// [`InterpreterError::IndexBelowZero`] or [`InterpreterError::IndexTooLarge`].
    pub fn check_index(&self, index: FlatIndex) -> Result<(), InterpreterError> {
        let index = isize::from(index);
        if index < 0 {
            Err(InterpreterError::IndexBelowZero)
        } else if index >= self.size() {
            Err(InterpreterError::IndexTooLarge)
        } else {
            Ok(())
        }
    }

    /// The flat index of `point`.
    ///
    /// # Panics
    ///
    /// If the point fails [`Self::check_point`].
    pub fn index(&self, point: &[ConcreteIndex]) -> FlatIndex {
        self.try_index(point).unwrap_or_else(|e| panic!("{e}"))
    }

    /// The flat index of `point`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::check_point`].
    pub fn try_index(&self, point: &[ConcreteIndex]) -> Result<FlatIndex, InterpreterError> {
        self.check_point(point)?;
        Ok(self.index_fast(point))
    }

    /// The flat index of `point`, without checking it first.
    ///
    /// The result is meaningless for a point that fails [`Self::check_point`], and a point with
    /// no coordinates panics.
    pub fn index_fast(&self, point: &[ConcreteIndex]) -> FlatIndex {
        let index = point[0]
            + point[1..]
                .iter()
                .zip(&self.sizes)
                .map(|(&p, &s)| p * s)
                .sum::<ConcreteIndex>();
        index.into()
    }

    /// The point addressed by `index`.
    ///
    /// # Panics
    ///
    /// If the index fails [`Self::check_index`].
    pub fn point(&self, index: FlatIndex) -> ExpandedIndex {
        self.try_point(index).unwrap_or_else(|e| panic!("{e}"))
    }

    /// The point addressed by `index`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::check_index`].
    pub fn try_point(&self, index: FlatIndex) -> Result<ExpandedIndex, InterpreterError> {
        self.check_index(index)?;
        Ok(self.point_fast(index))
    }

    /// The point addressed by `index`, without checking it first.
    pub fn point_fast(&self, index: FlatIndex) -> ExpandedIndex {
        let mut point = ExpandedIndex::zeros(self.order());
        self.write_point(index, &mut point);
        point
    }

    /// Decodes `index` into an existing buffer, most significant dimension first.
    pub(crate) fn write_point(&self, index: FlatIndex, point: &mut [ConcreteIndex]) {
        let mut rest = isize::from(index);
        for i in (1..self.order()).rev() {
            point[i] = rest / self.sizes[i - 1];
            rest %= self.sizes[i - 1];
        }
        point[0] = rest;
    }
}

impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dims)
    }
}

impl TryFrom<Vec<ConcreteIndex>> for Interpreter {
    type Error = InterpreterError;

    fn try_from(dims: Vec<ConcreteIndex>) -> Result<Self, Self::Error> {
        Interpreter::try_new(dims)
    }
}

impl From<Interpreter> for Vec<ConcreteIndex> {
    fn from(value: Interpreter) -> Self {
        value.dims
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpreterError {
    #[error("dims has len = 0")]
    EmptyShape,
    #[error("dims[{axis}] = {value} is not positive")]
    InvalidDimension { axis: usize, value: ConcreteIndex },
    #[error("size of dims[..={axis}] overflows isize")]
    ShapeTooLarge { axis: usize },
    #[error("point has len = 0")]
    EmptyPoint,
    #[error("point length mismatch (is: {actual}, should be: {expected})")]
    PointLengthMismatch { actual: usize, expected: usize },
    #[error("point[{axis}] = {value} is out of bounds of dims[{axis}] = {bound}")]
    PointOutOfBounds {
        axis: usize,
        value: ConcreteIndex,
        bound: ConcreteIndex,
    },
    #[error("index is < 0")]
    IndexBelowZero,
    #[error("index is greater than Interpreter size")]
    IndexTooLarge,
    #[error("magnitude of change is greater than Interpreter size")]
    ChangeMagnitudeTooLarge,
    #[error("increasing point failed while index was within bounds")]
    SynchronizationFault,
    #[error("given map_apply visitor is missing")]
    NilVisitor,
    #[error("data length mismatch (is: {actual}, should be: {expected})")]
    DataLengthMismatch { actual: usize, expected: usize },
}

impl InterpreterError {
    /// Whether both errors are the same kind of error, regardless of their payload.
    pub fn same_kind(&self, other: &InterpreterError) -> bool {
        discriminant(self) == discriminant(other)
    }
}

/// Whether `err` is an [`InterpreterError`] of the same kind as `kind`.
///
/// Works through `anyhow::Error` and other wrappers that deref to `dyn Error`.
pub fn is_kind(err: &(dyn std::error::Error + 'static), kind: &InterpreterError) -> bool {
    err.downcast_ref::<InterpreterError>()
        .is_some_and(|e| e.same_kind(kind))
}
