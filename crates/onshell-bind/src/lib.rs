#![deny(missing_docs)]
#![doc = "Aggregate binding of on-shell subtraction registries: matrix-element containers, symbol queries and merging of result sets."]

/// Aggregate result set, binding and merging.
pub mod aggregate;
/// Matrix-element containers.
pub mod matrix;

pub use aggregate::{AggregateResultSet, BindingReport};
pub use matrix::{BornMatrixElement, MatrixElement, OnShellTerm, RealMatrixElement, TermKey};
