//! Frame sinks and still-frame video capture.
//!
//! Sinks consume frames in order; [`capture::loop_still_into_sink`] drives any sink with one
//! repeated still.

/// Still-frame clip capture.
pub mod capture;
/// `ffmpeg`-based sink (WebM output via system `ffmpeg`).
pub mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub mod sink;
