//! In-place mixed-radix stepping of points.
//!
//! Every dimension acts as a digit whose radix is the size of that dimension, dimension 0 being
//! the least significant digit. Stepping a point by one therefore never needs to go through its
//! flat index.

use super::concrete_index::ConcreteIndex;
use super::{Interpreter, InterpreterError};

impl Interpreter {
    /// Moves `point` to the next flat index.
    ///
    /// Returns `false` if `point` was the last point of the shape, in which case it wraps around
    /// to the all-zero point.
    ///
    /// # Panics
    ///
    /// If the point fails [`Self::check_point`].
    pub fn increment(&self, point: &mut [ConcreteIndex]) -> bool {
        self.try_increment(point).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Moves `point` to the next flat index, see [`Self::increment`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::check_point`]. The point is left untouched on error.
    pub fn try_increment(&self, point: &mut [ConcreteIndex]) -> Result<bool, InterpreterError> {
        self.check_point(point)?;
        Ok(self.increment_fast(point))
    }

    /// Moves `point` to the next flat index without checking it first.
    pub fn increment_fast(&self, point: &mut [ConcreteIndex]) -> bool {
        for (p, &d) in point.iter_mut().zip(&self.dims) {
            *p += 1;
            if *p < d {
                return true;
            }
            *p = 0;
        }
        false
    }

    /// Moves `point` to the previous flat index.
    ///
    /// Returns `false` if `point` was the all-zero point, in which case it wraps around to the
    /// last point of the shape.
    ///
    /// # Panics
    ///
    /// If the point fails [`Self::check_point`].
    pub fn decrement(&self, point: &mut [ConcreteIndex]) -> bool {
        self.try_decrement(point).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Moves `point` to the previous flat index, see [`Self::decrement`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::check_point`]. The point is left untouched on error.
    pub fn try_decrement(&self, point: &mut [ConcreteIndex]) -> Result<bool, InterpreterError> {
        self.check_point(point)?;
        Ok(self.decrement_fast(point))
    }

    /// Moves `point` to the previous flat index without checking it first.
    pub fn decrement_fast(&self, point: &mut [ConcreteIndex]) -> bool {
        for (p, &d) in point.iter_mut().zip(&self.dims) {
            *p -= 1;
            if *p >= 0 {
                return true;
            }
            *p = d - 1;
        }
        false
    }

    /// Moves `point` by `change` flat indices, in either direction.
    ///
    /// Returns `false` if the move would leave the shape. The content of `point` is unspecified
    /// afterwards and should not be relied on.
    ///
    /// # Panics
    ///
    /// If [`Self::try_increase_by`] would return an error.
    pub fn increase_by(&self, point: &mut [ConcreteIndex], change: isize) -> bool {
        self.try_increase_by(point, change)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Moves `point` by `change` flat indices, see [`Self::increase_by`].
    ///
    /// A `change` of zero always succeeds, and `±1` goes through [`Self::try_increment`] and
    /// [`Self::try_decrement`].
    ///
    /// # Errors
    ///
    /// - Same as [`Self::check_point`]
    /// - [`InterpreterError::ChangeMagnitudeTooLarge`] if `|change|` is at least
    ///   [`Self::size`]
    ///
    /// The point is left untouched on error.
    pub fn try_increase_by(
        &self,
        point: &mut [ConcreteIndex],
        change: isize,
    ) -> Result<bool, InterpreterError> {
        match change {
            0 => return Ok(true),
            1 => return self.try_increment(point),
            -1 => return self.try_decrement(point),
            _ => {}
        }

        let index = isize::from(self.try_index(point)?);

        if change.unsigned_abs() >= self.size().unsigned_abs() {
            return Err(InterpreterError::ChangeMagnitudeTooLarge);
        }

        match index.checked_add(change) {
            Some(new_index) if (0..self.size()).contains(&new_index) => {
                self.write_point(new_index.into(), point);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
