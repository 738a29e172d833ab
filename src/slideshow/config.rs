use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::compositor::sizing::compute_layer_size;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{SlideFxError, SlideFxResult};
use crate::transitions::{DEFAULT_ANIMATION_TIME, TransitionKind};

/// Options of one slideshow session.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlideShowOpts {
    /// Slide width in document units. The layer canvas is derived from it.
    pub slide_width: u32,
    /// Slide height in document units.
    pub slide_height: u32,
    /// Transition length for slides that declare none, in milliseconds.
    pub default_transition_ms: u64,
    /// Resolve unsupported effects to a crossfade instead of a cut.
    pub fallback_to_crossfade: bool,
    /// Show a spinner while a slide's layers are missing.
    pub loader: bool,
    /// `#rrggbb` shown before the first slide and under every layer stack.
    pub clear_color: String,
    /// Shade rows in parallel.
    pub parallel_raster: bool,
}

impl Default for SlideShowOpts {
    fn default() -> Self {
        Self {
            slide_width: 1280,
            slide_height: 720,
            default_transition_ms: DEFAULT_ANIMATION_TIME.as_millis() as u64,
            fallback_to_crossfade: true,
            loader: true,
            clear_color: "#000000".to_owned(),
            parallel_raster: true,
        }
    }
}

impl SlideShowOpts {
    pub fn from_reader<R: std::io::Read>(r: R) -> SlideFxResult<Self> {
        let opts: Self = serde_json::from_reader(r)
            .map_err(|e| SlideFxError::serde(format!("parse slideshow options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SlideFxResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SlideFxError::validation(format!("open slideshow options '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> SlideFxResult<()> {
        if self.slide_width == 0 || self.slide_height == 0 {
            return Err(SlideFxError::validation("slide size must be non-zero"));
        }
        Rgba8Premul::from_hex(&self.clear_color)?;
        Ok(())
    }

    /// Canvas every layer and frame is rendered at.
    pub fn canvas(&self) -> SlideFxResult<Canvas> {
        let [w, h] = compute_layer_size(self.slide_width, self.slide_height);
        Canvas::new(w, h)
    }

    pub fn default_transition_duration(&self) -> Duration {
        Duration::from_millis(self.default_transition_ms)
    }

    /// Parsed clear colour; black when the string is invalid.
    pub fn clear_color(&self) -> Rgba8Premul {
        Rgba8Premul::from_hex(&self.clear_color).unwrap_or_else(|err| {
            tracing::warn!(%err, "invalid clear colour, using black");
            Rgba8Premul::black()
        })
    }

    /// Kind unsupported effects resolve to.
    pub fn fallback_kind(&self) -> TransitionKind {
        if self.fallback_to_crossfade {
            TransitionKind::Crossfade
        } else {
            TransitionKind::NoTransition
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/slideshow/config.rs"]
mod tests;
