/// Dense `f64` storage addressed through an [`Interpreter`](crate::Interpreter)
pub mod dense;
