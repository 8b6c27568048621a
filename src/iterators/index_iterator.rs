use std::iter::FusedIterator;

use crate::structure::concrete_index::{ConcreteIndex, ExpandedIndex, FlatIndex};
use crate::structure::Interpreter;

/// An iterator over all points of an [`Interpreter`] together with their flat index, in
/// increasing index order.
#[derive(Debug, Clone)]
pub struct PointIterator<'a> {
    interpreter: &'a Interpreter,
    point: ExpandedIndex,
    index: ConcreteIndex,
}

impl<'a> PointIterator<'a> {
    #[must_use]
    pub fn new(interpreter: &'a Interpreter) -> Self {
        PointIterator {
            interpreter,
            point: ExpandedIndex::zeros(interpreter.order()),
            index: 0,
        }
    }
}

impl Iterator for PointIterator<'_> {
    type Item = (ExpandedIndex, FlatIndex);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.interpreter.size() {
            return None;
        }

        let item = (self.point.clone(), self.index.into());
        self.index += 1;
        if self.index < self.interpreter.size() {
            self.interpreter.increment_fast(&mut self.point);
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.interpreter.size() - self.index).unsigned_abs();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PointIterator<'_> {}

impl FusedIterator for PointIterator<'_> {}

impl Interpreter {
    /// Iterates over all points of the shape in increasing index order, see [`PointIterator`].
    pub fn iter(&self) -> PointIterator<'_> {
        PointIterator::new(self)
    }
}

impl<'a> IntoIterator for &'a Interpreter {
    type Item = (ExpandedIndex, FlatIndex);
    type IntoIter = PointIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
