use std::time::Duration;

use crate::animation::filter::TransitionFilterInfo;
use crate::animation::node::AnimationNode;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{SlideFxError, SlideFxResult};

/// Slide background as described by the document layer.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Background {
    /// `true` when the slide overrides its master page background.
    pub is_custom: bool,
    /// Solid fill as `#rrggbb`.
    pub fill_color: Option<String>,
}

/// Per-slide descriptor supplied by the document layer. Read-only to the engine.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlideInfo {
    /// Content hash identifying the rendered slide.
    pub hash: String,
    /// Position in the presentation.
    pub index: usize,
    /// Master page name.
    pub master_page: Option<String>,
    pub background: Option<Background>,
    /// Transition into this slide, e.g. `"BarWipe"`.
    pub transition_type: Option<String>,
    /// e.g. `"LeftToRight"`.
    pub transition_subtype: Option<String>,
    /// Transition length in milliseconds.
    pub transition_duration: Option<f64>,
    /// `false` plays the transition in reverse.
    pub transition_direction: Option<bool>,
    /// Colour of fade-through-colour transitions as `#rrggbb`.
    pub transition_fade_color: Option<String>,
    /// Shape animations on this slide.
    pub animations: Vec<AnimationNode>,
}

impl SlideInfo {
    /// Parse a JSON array of slide descriptors.
    pub fn list_from_json(json: &str) -> SlideFxResult<Vec<Self>> {
        serde_json::from_str(json).map_err(|e| SlideFxError::serde(e.to_string()))
    }

    /// Effect entering this slide. A missing type means no transition.
    pub fn transition_info(&self) -> TransitionFilterInfo {
        TransitionFilterInfo::from_names(
            self.transition_type.as_deref().unwrap_or("None"),
            self.transition_subtype.as_deref().unwrap_or("Default"),
            self.transition_direction.unwrap_or(true),
            true,
            self.transition_fade_color.as_deref(),
        )
    }

    /// Declared transition length, or `default` when missing or not positive.
    pub fn transition_duration_or(&self, default: Duration) -> Duration {
        match self.transition_duration {
            Some(ms) if ms.is_finite() && ms > 0.0 => Duration::from_secs_f64(ms / 1000.0),
            _ => default,
        }
    }

    /// Custom background fill, if the slide declares a valid one.
    pub fn background_color(&self) -> Option<Rgba8Premul> {
        let fill = self.background.as_ref()?.fill_color.as_deref()?;
        match Rgba8Premul::from_hex(fill) {
            Ok(c) => Some(c),
            Err(err) => {
                tracing::warn!(slide = self.index, %err, "ignoring background colour");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/slideshow/slide_info.rs"]
mod tests;
