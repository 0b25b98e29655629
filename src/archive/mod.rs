//! Zip packaging of a whole batch with its manifest and notes.

pub mod builder;
pub mod manifest;
