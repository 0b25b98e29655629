//! Single-item export: PNG for posts, still-loop clips for videos.

pub mod exporter;
pub mod naming;
