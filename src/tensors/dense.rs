use std::fmt::{Display, LowerExp};
use std::ops::{Index, IndexMut};

use delegate::delegate;

use crate::structure::concrete_index::{ConcreteIndex, ExpandedIndex, FlatIndex};
use crate::structure::{Interpreter, InterpreterError};

/// A buffer of `f64`, one cell per point of an [`Interpreter`], laid out by flat index.
///
/// The buffer is allocated once, with exactly [`Interpreter::size`] cells, and never resized.
/// All coordinate handling is forwarded to the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseTensor {
    interpreter: Interpreter,
    values: Vec<f64>,
}

impl DenseTensor {
    /// A zeroed tensor of the given dimensions.
    ///
    /// # Panics
    ///
    /// If [`Interpreter::try_new`] fails for `dims`.
    pub fn new(dims: impl Into<Vec<ConcreteIndex>>) -> Self {
        Self::zero(Interpreter::new(dims))
    }

    /// A zeroed tensor of the given dimensions.
    ///
    /// # Errors
    ///
    /// Same as [`Interpreter::try_new`].
    pub fn try_new(dims: impl Into<Vec<ConcreteIndex>>) -> Result<Self, InterpreterError> {
        Interpreter::try_new(dims).map(Self::zero)
    }

    pub fn zero(interpreter: Interpreter) -> Self {
        let values = vec![0.; slot(interpreter.size().into())];
        DenseTensor {
            interpreter,
            values,
        }
    }

    /// Wraps existing values, which must hold exactly one value per point.
    ///
    /// # Errors
    ///
    /// [`InterpreterError::DataLengthMismatch`] if `values` has the wrong length.
    pub fn from_values(
        interpreter: Interpreter,
        values: Vec<f64>,
    ) -> Result<Self, InterpreterError> {
        let expected = slot(interpreter.size().into());
        if values.len() != expected {
            return Err(InterpreterError::DataLengthMismatch {
                actual: values.len(),
                expected,
            });
        }
        Ok(DenseTensor {
            interpreter,
            values,
        })
    }

    /// Fills a tensor by evaluating `f` at every point.
    pub fn from_fn(interpreter: Interpreter, f: impl Fn(&[ConcreteIndex]) -> f64) -> Self {
        let values = interpreter.iter().map(|(point, _)| f(&point)).collect();
        DenseTensor {
            interpreter,
            values,
        }
    }

    delegate! {
        to self.interpreter {
            pub fn dims(&self) -> &[ConcreteIndex];
            pub fn size(&self) -> ConcreteIndex;
            pub fn order(&self) -> usize;
            pub fn check_point(&self, point: &[ConcreteIndex]) -> Result<(), InterpreterError>;
            pub fn index(&self, point: &[ConcreteIndex]) -> FlatIndex;
            pub fn try_index(&self, point: &[ConcreteIndex]) -> Result<FlatIndex, InterpreterError>;
            pub fn point(&self, index: FlatIndex) -> ExpandedIndex;
            pub fn try_point(&self, index: FlatIndex) -> Result<ExpandedIndex, InterpreterError>;
        }
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// The value stored at `point`.
    ///
    /// # Panics
    ///
    /// If the point fails [`Interpreter::check_point`].
    pub fn point_value(&self, point: &[ConcreteIndex]) -> f64 {
        self.try_point_value(point)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// The value stored at `point`.
    ///
    /// # Errors
    ///
    /// Same as [`Interpreter::check_point`].
    pub fn try_point_value(&self, point: &[ConcreteIndex]) -> Result<f64, InterpreterError> {
        let index = self.interpreter.try_index(point)?;
        Ok(self[index])
    }

    /// Overwrites the value stored at `point`.
    ///
    /// # Panics
    ///
    /// If the point fails [`Interpreter::check_point`].
    pub fn set_point_value(&mut self, point: &[ConcreteIndex], value: f64) {
        self.try_set_point_value(point, value)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Overwrites the value stored at `point`.
    ///
    /// # Errors
    ///
    /// Same as [`Interpreter::check_point`]. Nothing is written on error.
    pub fn try_set_point_value(
        &mut self,
        point: &[ConcreteIndex],
        value: f64,
    ) -> Result<(), InterpreterError> {
        let index = self.interpreter.try_index(point)?;
        self[index] = value;
        Ok(())
    }
}

/// Position in the buffer; negative indices map past the end so that indexing panics.
fn slot(index: FlatIndex) -> usize {
    usize::try_from(isize::from(index)).unwrap_or(usize::MAX)
}

impl Index<FlatIndex> for DenseTensor {
    type Output = f64;

    fn index(&self, index: FlatIndex) -> &Self::Output {
        &self.values[slot(index)]
    }
}

impl IndexMut<FlatIndex> for DenseTensor {
    fn index_mut(&mut self, index: FlatIndex) -> &mut Self::Output {
        &mut self.values[slot(index)]
    }
}

impl Display for DenseTensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for ((point, _), v) in self.interpreter.iter().zip(&self.values) {
            writeln!(f, "{}: {}", point, v)?;
        }
        Ok(())
    }
}

impl LowerExp for DenseTensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for ((point, _), v) in self.interpreter.iter().zip(&self.values) {
            writeln!(f, "{}: {:+e}", point, v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DenseTensor;
    use crate::structure::concrete_index::FlatIndex;
    use crate::structure::{Interpreter, InterpreterError};

    #[test]
    fn zeroed_storage() {
        let t = DenseTensor::new([2, 3, 4]);
        assert_eq!(t.values().len(), 24);
        assert_eq!(t.size(), 24);
        assert_eq!(t.dims(), &[2, 3, 4]);
        assert!(t.values().iter().all(|&v| v == 0.));
    }

    #[test]
    fn construction_errors() {
        assert_eq!(
            DenseTensor::try_new([1, 0, 2]),
            Err(InterpreterError::InvalidDimension { axis: 1, value: 0 })
        );
        assert_eq!(
            DenseTensor::try_new(vec![]),
            Err(InterpreterError::EmptyShape)
        );
        assert_eq!(
            DenseTensor::from_values(Interpreter::new([2, 2]), vec![1., 2., 3.]),
            Err(InterpreterError::DataLengthMismatch {
                actual: 3,
                expected: 4
            })
        );
    }

    #[test]
    fn point_values_follow_flat_layout() {
        let values: Vec<f64> = (0..24).map(f64::from).collect();
        let mut t = DenseTensor::from_values(Interpreter::new([2, 3, 4]), values).unwrap();

        assert_eq!(t.point_value(&[0, 1, 2]), 14.);
        assert_eq!(t.point_value(&[1, 2, 3]), 23.);
        assert_eq!(t[FlatIndex::from(5)], 5.);

        t.set_point_value(&[1, 0, 1], -1.5);
        assert_eq!(t[t.index(&[1, 0, 1])], -1.5);
        assert_eq!(t.values()[7], -1.5);

        t[FlatIndex::from(0)] = 2.;
        assert_eq!(t.point_value(&[0, 0, 0]), 2.);
    }

    #[test]
    fn invalid_points_are_rejected() {
        let mut t = DenseTensor::new([2, 3]);

        assert_eq!(t.try_point_value(&[]), Err(InterpreterError::EmptyPoint));
        assert!(matches!(
            t.try_point_value(&[0, 3]),
            Err(InterpreterError::PointOutOfBounds { axis: 1, .. })
        ));
        assert!(matches!(
            t.try_set_point_value(&[0, 0, 0], 1.),
            Err(InterpreterError::PointLengthMismatch { .. })
        ));
        assert!(t.values().iter().all(|&v| v == 0.));
    }

    #[test]
    #[should_panic]
    fn negative_flat_index_panics() {
        let t = DenseTensor::new([2]);
        let _value: f64 = t[FlatIndex::from(-1)];
    }

    #[test]
    fn from_fn_and_display() {
        let t = DenseTensor::from_fn(Interpreter::new([2, 2]), |p| (p[0] + 10 * p[1]) as f64);
        assert_eq!(t.values(), &[0., 1., 10., 11.]);
        assert_eq!(t.point(3.into()), [1, 1]);

        assert_eq!(
            t.to_string(),
            "[0, 0]: 0\n[1, 0]: 1\n[0, 1]: 10\n[1, 1]: 11\n"
        );
        assert_eq!(format!("{t:e}").lines().last(), Some("[1, 1]: +1.1e1"));
    }
}
