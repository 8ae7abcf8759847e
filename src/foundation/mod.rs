//! Shared primitives: ids, canvas/fps types, constants, and the error type.

pub mod core;
pub mod error;
