//! Common types used throughout dicehouse.

pub mod casino;
pub mod execution;

pub use casino::ValidationError;
