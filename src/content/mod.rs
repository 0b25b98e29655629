//! Input documents: record model, schema validation, watermark text and the demo document.

pub mod model;
pub mod sample;
pub mod validate;
pub mod watermark;
