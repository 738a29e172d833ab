use std::time::Duration;

use crate::animation::filter::TransitionFilterInfo;
use crate::foundation::error::{SlideFxError, SlideFxResult};
use crate::timing::activity::{Activity, ActivityParams, Animation};
use crate::transitions::factory::{TransitionKind, build_transition, resolve_with_fallback};
use crate::transitions::{DEFAULT_ANIMATION_TIME, Transition, TransitionParameters};

/// Whether the effect runs its declared direction or the reverse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// Entrance (`in`) or exit (`out`) effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    In,
    Out,
}

/// How many times an effect repeats.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RepeatCountRepr", into = "RepeatCountRepr")]
pub enum RepeatCount {
    Times(f64),
    Indefinite,
}

impl Default for RepeatCount {
    fn default() -> Self {
        Self::Times(1.0)
    }
}

impl RepeatCount {
    /// Activity repeat count; `0` stands for indefinite.
    pub fn as_activity_count(self) -> f64 {
        match self {
            Self::Times(n) => n,
            Self::Indefinite => 0.0,
        }
    }
}

#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum RepeatCountRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<RepeatCountRepr> for RepeatCount {
    type Error = String;

    fn try_from(value: RepeatCountRepr) -> Result<Self, Self::Error> {
        match value {
            RepeatCountRepr::Number(n) if n.is_finite() && n > 0.0 => Ok(Self::Times(n)),
            RepeatCountRepr::Number(n) => Err(format!("repeat count must be positive, got {n}")),
            RepeatCountRepr::Text(s) if s.trim() == "indefinite" => Ok(Self::Indefinite),
            RepeatCountRepr::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite() && *n > 0.0)
                .map(Self::Times)
                .ok_or_else(|| format!("invalid repeat count '{s}'")),
        }
    }
}

impl From<RepeatCount> for RepeatCountRepr {
    fn from(value: RepeatCount) -> Self {
        match value {
            RepeatCount::Times(n) => Self::Number(n),
            RepeatCount::Indefinite => Self::Text("indefinite".to_owned()),
        }
    }
}

/// Parse a SMIL clock value: `"1.5s"`, `"750ms"`, `"0.5min"`, `"2h"`, `"01:02.5"`,
/// `"1:00:00"` or bare seconds.
pub fn parse_clock_value(text: &str) -> SlideFxResult<Duration> {
    let s = text.trim();
    let invalid = || SlideFxError::validation(format!("invalid clock value '{text}'"));

    let seconds = if s.contains(':') {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() > 3 {
            return Err(invalid());
        }
        let mut total = 0.0;
        for p in &parts {
            let v: f64 = p.parse().map_err(|_| invalid())?;
            total = total * 60.0 + v;
        }
        total
    } else {
        let (number, scale) = if let Some(v) = s.strip_suffix("ms") {
            (v, 0.001)
        } else if let Some(v) = s.strip_suffix("min") {
            (v, 60.0)
        } else if let Some(v) = s.strip_suffix('h') {
            (v, 3600.0)
        } else if let Some(v) = s.strip_suffix('s') {
            (v, 1.0)
        } else {
            (s, 1.0)
        };
        number.trim().parse::<f64>().map_err(|_| invalid())? * scale
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }
    Ok(Duration::from_secs_f64(seconds))
}

/// A transition-filter node of a slide's animation timeline.
///
/// Only the fields the engine consumes are read; everything else in the document is ignored.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationNode {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub transition_type: String,
    pub subtype: String,
    pub direction: Direction,
    pub mode: Mode,
    /// `#rrggbb`.
    pub fade_color: Option<String>,
    /// SMIL clock value.
    pub dur: Option<String>,
    /// Acceleration fraction in `[0, 1]`.
    pub accelerate: f64,
    /// Deceleration fraction in `[0, 1]`.
    pub decelerate: f64,
    pub repeat_count: RepeatCount,
    pub auto_reverse: bool,
    /// Shape animated by this node.
    pub target_element: Option<String>,
}

impl AnimationNode {
    /// Parse a single node from JSON.
    pub fn from_json(json: &str) -> SlideFxResult<Self> {
        serde_json::from_str(json).map_err(|e| SlideFxError::serde(e.to_string()))
    }

    pub fn is_mode_in(&self) -> bool {
        self.mode == Mode::In
    }

    pub fn is_reverse(&self) -> bool {
        self.direction == Direction::Reverse
    }

    /// Declared effect.
    pub fn filter_info(&self) -> TransitionFilterInfo {
        TransitionFilterInfo::from_names(
            &self.transition_type,
            &self.subtype,
            !self.is_reverse(),
            self.is_mode_in(),
            self.fade_color.as_deref(),
        )
    }

    /// Simple duration, [`DEFAULT_ANIMATION_TIME`] when not declared.
    pub fn duration(&self) -> SlideFxResult<Duration> {
        self.dur
            .as_deref()
            .map_or(Ok(DEFAULT_ANIMATION_TIME), parse_clock_value)
    }

    pub fn activity_params(&self) -> SlideFxResult<ActivityParams> {
        Ok(ActivityParams {
            duration: self.duration()?,
            repeat_count: self.repeat_count.as_activity_count(),
            acceleration: self.accelerate,
            deceleration: self.decelerate,
            auto_reverse: self.auto_reverse,
            ..ActivityParams::default()
        })
    }

    /// Resolve the declared effect into a transition and wrap it in an inactive [`Activity`].
    pub fn create_activity(&self, params: TransitionParameters) -> SlideFxResult<Activity> {
        self.create_activity_with_fallback(params, TransitionKind::Crossfade)
    }

    /// Like [`create_activity`](Self::create_activity), resolving unsupported effects to
    /// `fallback`.
    #[tracing::instrument(level = "debug", skip(self, params), fields(id = ?self.id))]
    pub fn create_activity_with_fallback(
        &self,
        params: TransitionParameters,
        fallback: TransitionKind,
    ) -> SlideFxResult<Activity> {
        let activity_params = self.activity_params()?;
        let info = self.filter_info();
        let kind = resolve_with_fallback(&info, params.is_slide, fallback);
        let params = params.with_animation_time(activity_params.duration);
        let transition = build_transition(kind, &info, params);
        tracing::debug!(transition = transition.name(), "activity created");
        Activity::new(
            activity_params,
            Box::new(TransitionAnimation::new(transition, self.auto_reverse)),
            self.target_element.clone(),
        )
    }
}

/// Drives a transition from an [`Activity`].
#[derive(Debug)]
pub struct TransitionAnimation {
    transition: Box<dyn Transition>,
    auto_reverse: bool,
}

impl TransitionAnimation {
    pub fn new(transition: Box<dyn Transition>, auto_reverse: bool) -> Self {
        Self {
            transition,
            auto_reverse,
        }
    }

    pub fn transition(&self) -> &dyn Transition {
        self.transition.as_ref()
    }
}

impl Animation for TransitionAnimation {
    fn start(&mut self) {
        if let Err(err) = self.transition.prepare() {
            tracing::warn!(transition = self.transition.name(), %err, "prepare failed");
        }
    }

    fn perform(&mut self, t: f64, _repeat: u32) {
        self.transition.render(t);
    }

    fn end(&mut self) {
        self.transition.end();
        if self.auto_reverse {
            // Auto-reversed cycles finish on the first frame.
            self.transition.render(0.0);
        }
    }

    fn dispose(&mut self) {
        self.transition.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/node.rs"]
mod tests;
