use std::ops::{Deref, DerefMut};

use derive_more::Add;
use derive_more::AddAssign;
use derive_more::Display;
use derive_more::From;
use derive_more::Into;
use derive_more::IntoIterator;
use derive_more::Sub;
use derive_more::SubAssign;

use serde::{Deserialize, Serialize};

/// A concrete coordinate along one dimension.
///
/// Signed, so that negative coordinates can be reported as out of bounds instead of being
/// unrepresentable.
pub type ConcreteIndex = isize;

/// A point of a shape, one [`ConcreteIndex`] per dimension, dimension 0 first.
#[derive(
    Debug,
    Clone,
    Default,
    Ord,
    PartialOrd,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    From,
    Into,
    Display,
    IntoIterator,
)]
#[display(fmt = "{:?}", indices)]
pub struct ExpandedIndex {
    indices: Vec<ConcreteIndex>,
}

impl ExpandedIndex {
    /// The all-zero point of the given order.
    pub fn zeros(order: usize) -> Self {
        ExpandedIndex {
            indices: vec![0; order],
        }
    }
}

impl AsRef<[ConcreteIndex]> for ExpandedIndex {
    fn as_ref(&self) -> &[ConcreteIndex] {
        &self.indices
    }
}

impl AsMut<[ConcreteIndex]> for ExpandedIndex {
    fn as_mut(&mut self) -> &mut [ConcreteIndex] {
        &mut self.indices
    }
}

impl Deref for ExpandedIndex {
    type Target = [ConcreteIndex];

    fn deref(&self) -> &Self::Target {
        &self.indices
    }
}

impl DerefMut for ExpandedIndex {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.indices
    }
}

impl FromIterator<ConcreteIndex> for ExpandedIndex {
    fn from_iter<T: IntoIterator<Item = ConcreteIndex>>(iter: T) -> Self {
        ExpandedIndex {
            indices: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[ConcreteIndex; N]> for ExpandedIndex {
    fn from(value: [ConcreteIndex; N]) -> Self {
        ExpandedIndex {
            indices: value.to_vec(),
        }
    }
}

impl PartialEq<[ConcreteIndex]> for ExpandedIndex {
    fn eq(&self, other: &[ConcreteIndex]) -> bool {
        self.indices == other
    }
}

impl<const N: usize> PartialEq<[ConcreteIndex; N]> for ExpandedIndex {
    fn eq(&self, other: &[ConcreteIndex; N]) -> bool {
        self.indices == other
    }
}

/// A position in the linear address space of a shape.
#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    Ord,
    PartialOrd,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    From,
    Into,
    Display,
    Add,
    AddAssign,
    Sub,
    SubAssign,
)]
#[display(fmt = "{}", index)]
pub struct FlatIndex {
    index: isize,
}

impl PartialEq<isize> for FlatIndex {
    fn eq(&self, other: &isize) -> bool {
        self.index == *other
    }
}
