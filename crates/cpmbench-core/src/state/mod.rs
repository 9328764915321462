//! Architectural CPU state model primitives.

/// Register file storage behind the base machine.
pub mod registers;

pub use registers::{RegisterFile, FLAGS_ALWAYS_SET, FLAGS_NEVER_SET};
