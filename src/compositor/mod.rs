//! Slide and shape bitmaps fed to transitions.

/// Layer composition.
pub mod layers;
/// Layer resolution tiers.
pub mod sizing;

pub use layers::{
    Layer, LayerCompositor, LayerKind, LayerSource, MemoryLayerSource,
    SolidLayerSource,
};
pub use sizing::{compute_layer_resolution, compute_layer_size};
