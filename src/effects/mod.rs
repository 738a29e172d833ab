//! Pixel kernels shared by the compositor and the session.

/// Premultiplied `over` blending.
pub mod composite;
