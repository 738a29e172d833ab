//! Per-slide layers and their composition into the bitmap a transition consumes.

use std::collections::HashMap;

use crate::compositor::sizing::compute_layer_size;
use crate::effects::composite::over_frame;
use crate::foundation::core::{Canvas, FrameRGBA, Rgba8Premul};
use crate::foundation::error::{SlideFxError, SlideFxResult};
use crate::slideshow::slide_info::SlideInfo;

/// Stacking class of a layer, bottom to top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerKind {
    Background,
    MasterPage,
    Slide,
    /// Animated shape. Kept out of the slide bitmap and handed to shape transitions.
    Shape,
}

/// One rendered layer.
#[derive(Clone, Debug)]
pub struct Layer {
    pub kind: LayerKind,
    /// Shape id for [`LayerKind::Shape`]; free-form otherwise.
    pub id: String,
    pub bitmap: FrameRGBA,
    pub opacity: f32,
}

impl Layer {
    pub fn new(kind: LayerKind, id: impl Into<String>, bitmap: FrameRGBA) -> Self {
        Self {
            kind,
            id: id.into(),
            bitmap,
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// Supplies rendered layers for a slide.
///
/// Implementations render the document at `size`; the engine only composes the result.
pub trait LayerSource {
    fn fetch_layers(&mut self, slide: &SlideInfo, size: Canvas) -> SlideFxResult<Vec<Layer>>;
}

/// Pre-rendered layers keyed by slide index.
#[derive(Debug, Default)]
pub struct MemoryLayerSource {
    layers: HashMap<usize, Vec<Layer>>,
}

impl MemoryLayerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slide_index: usize, layers: Vec<Layer>) {
        self.layers.insert(slide_index, layers);
    }

    pub fn with_slide(mut self, slide_index: usize, layers: Vec<Layer>) -> Self {
        self.insert(slide_index, layers);
        self
    }
}

impl LayerSource for MemoryLayerSource {
    fn fetch_layers(&mut self, slide: &SlideInfo, size: Canvas) -> SlideFxResult<Vec<Layer>> {
        let layers = self.layers.get(&slide.index).cloned().unwrap_or_default();
        for layer in &layers {
            if layer.bitmap.canvas() != size {
                return Err(SlideFxError::validation(format!(
                    "layer '{}' of slide {} is {}x{}, expected {}x{}",
                    layer.id,
                    slide.index,
                    layer.bitmap.width,
                    layer.bitmap.height,
                    size.width,
                    size.height
                )));
            }
        }
        Ok(layers)
    }
}

/// Renders every slide as one solid background layer in its declared fill colour.
#[derive(Clone, Copy, Debug)]
pub struct SolidLayerSource {
    fallback: Rgba8Premul,
}

impl SolidLayerSource {
    /// `fallback` fills slides without a valid background colour.
    pub fn new(fallback: Rgba8Premul) -> Self {
        Self { fallback }
    }
}

impl LayerSource for SolidLayerSource {
    fn fetch_layers(&mut self, slide: &SlideInfo, size: Canvas) -> SlideFxResult<Vec<Layer>> {
        let color = slide.background_color().unwrap_or(self.fallback);
        Ok(vec![Layer::new(
            LayerKind::Background,
            "background",
            FrameRGBA::filled(size, color),
        )])
    }
}

/// Flattens the static layers of a slide into one bitmap.
#[derive(Clone, Copy, Debug)]
pub struct LayerCompositor {
    canvas: Canvas,
    clear: Rgba8Premul,
}

impl LayerCompositor {
    pub fn new(canvas: Canvas, clear: Rgba8Premul) -> Self {
        Self { canvas, clear }
    }

    /// Compositor sized for a slide of `slide_width × slide_height` document units.
    pub fn for_slide_size(
        slide_width: u32,
        slide_height: u32,
        clear: Rgba8Premul,
    ) -> SlideFxResult<Self> {
        let [w, h] = compute_layer_size(slide_width, slide_height);
        Ok(Self::new(Canvas::new(w, h)?, clear))
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Compose background, master page and slide layers in stacking order.
    ///
    /// Returns `None` when there are no layers at all, so the caller can wait for them instead of
    /// showing an empty slide. Shape layers are skipped.
    #[tracing::instrument(level = "trace", skip(self, layers), fields(n = layers.len()))]
    pub fn compose_slide(&self, layers: &[Layer]) -> SlideFxResult<Option<FrameRGBA>> {
        if layers.is_empty() {
            return Ok(None);
        }
        let mut stack: Vec<&Layer> = layers
            .iter()
            .filter(|l| l.kind != LayerKind::Shape)
            .collect();
        stack.sort_by_key(|l| l.kind);

        let mut out = FrameRGBA::filled(self.canvas, self.clear);
        for layer in stack {
            over_frame(&mut out, &layer.bitmap, layer.opacity)?;
        }
        Ok(Some(out))
    }

    /// Bitmap of the shape layer `id`, if present.
    pub fn shape_bitmap<'a>(&self, layers: &'a [Layer], id: &str) -> Option<&'a FrameRGBA> {
        layers
            .iter()
            .find(|l| l.kind == LayerKind::Shape && l.id == id)
            .map(|l| &l.bitmap)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/layers.rs"]
mod tests;
