//! Iterators over all points of an [`Interpreter`](crate::Interpreter)
//!
//! - `index_iterator`: a plain, single threaded [`Iterator`] over `(point, index)` pairs
//! - `traversal`: visiting every point exactly once with a pool of worker threads
//!
//! Both step a point from one index to the next with mixed-radix increments instead of decoding
//! every index from scratch.

mod index_iterator;
mod traversal;


pub use index_iterator::PointIterator;
pub use traversal::ThreadingOptions;
