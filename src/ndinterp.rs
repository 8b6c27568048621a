/*!

Tooling for addressing the cells of an n-dimensional grid through a flat, linear index.

The central type is the [`Interpreter`]: it is built once from a dimension vector and then
"interprets" points (one coordinate per dimension) as flat indices and back. Dimension 0 is the
least significant one, so incrementing a flat index by one increments the first coordinate,
carrying into the next coordinate when the first wraps around.

Besides the plain conversions, an [`Interpreter`] can step points in place
([`Interpreter::increment`], [`Interpreter::decrement`], [`Interpreter::increase_by`]) and visit
every point of the grid exactly once, optionally spreading the visits over a pool of worker
threads ([`Interpreter::try_map_apply`]).

Most operations come in three flavours:
- a `try_` version returning a [`Result`] with an [`InterpreterError`],
- a panicking version without prefix, which unwraps the `try_` version,
- a `_fast` version which skips validation altogether.

[`DenseTensor`] is a small `f64` store laid out according to an [`Interpreter`].

*/
extern crate self as ndinterp;

/// Shapes, points and flat indices
pub mod structure;

/// Sequential and parallel traversal of all points of a shape
pub mod iterators;

pub mod tensors;

pub use iterators::{PointIterator, ThreadingOptions};
pub use structure::concrete_index::{ConcreteIndex, ExpandedIndex, FlatIndex};
pub use structure::{is_kind, Interpreter, InterpreterError};
pub use tensors::dense::DenseTensor;
