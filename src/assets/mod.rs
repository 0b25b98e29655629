//! Asset preparation: image decode, template checks, font discovery and text shaping.

pub mod decode;
pub mod fonts;
pub mod template;
pub mod text;
