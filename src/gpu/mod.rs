//! Rendering context, object handles, shaders and the rasterizer.

/// Explicit rendering context.
pub mod context;
pub(crate) mod raster;
/// Owning object handles.
pub mod resources;
/// Programs, uniforms and texture sampling.
pub mod shader;
