//! CPU scene rendering: frames, color schemes, blur and the scene renderer.

pub(crate) mod blur;
pub mod frame;
pub mod item;
pub mod scene;
pub mod scheme;
