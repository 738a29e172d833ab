//! Slideshow glue: slide metadata, session options, presentation surface and the session.

/// Session options.
pub mod config;
/// Slideshow session.
pub mod session;
/// Presentation surface.
pub mod sink;
/// Per-slide metadata.
pub mod slide_info;

pub use config::SlideShowOpts;
pub use session::SlideShowSession;
pub use sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use slide_info::{Background, SlideInfo};
