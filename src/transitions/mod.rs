//! Slide and shape transitions.
//!
//! A transition owns its GPU resources through a [`GpuPipeline`] and renders one frame per call
//! to [`Transition::render`] for a progress `t` in `[0, 1]`. Two shapes exist: [`Transition2d`]
//! draws one full-screen quad through an effect-specific fragment shader (masked wipes, fades,
//! push and cover), and [`SimpleTransition`] draws textured 3-D primitives moved by
//! time-parameterised operations.
//!
//! [`create_transition`] maps declared effect parameters onto one of them and never fails for an
//! unknown effect.

use std::fmt;
use std::time::Duration;

use crate::foundation::core::{FrameRGBA, Rgba8Premul};
use crate::foundation::error::SlideFxResult;
use crate::gpu::context::RenderContext;

pub mod clipping;
pub mod factory;
pub mod fade;
pub mod masks;
pub mod pipeline;
pub mod push;
pub mod scenes3d;
pub mod simple3d;
pub mod transition2d;

pub use factory::{TransitionKind, create_transition, resolve};
pub use pipeline::GpuPipeline;
pub use simple3d::SimpleTransition;
pub use transition2d::Transition2d;

/// Default length of a transition when none is declared.
pub const DEFAULT_ANIMATION_TIME: Duration = Duration::from_millis(2000);

/// Invoked once when a transition completes.
pub type CompletionCallback = Box<dyn FnOnce()>;

/// Render-time inputs of one transition instance.
pub struct TransitionParameters {
    /// Context the transition renders into.
    pub context: RenderContext,
    /// Outgoing slide or shape. Shape transitions may have none.
    pub leaving: Option<FrameRGBA>,
    /// Incoming slide or shape.
    pub entering: FrameRGBA,
    /// Wall-clock length used by [`TransitionPlayer`].
    pub animation_time: Duration,
    /// Colour for fade-through-colour effects.
    pub fade_color: Rgba8Premul,
    /// Opacity applied to the entering shape.
    pub alpha: f32,
    /// `true` for slide transitions, `false` for shape animations.
    pub is_slide: bool,
    /// Fired exactly once on completion.
    pub on_complete: Option<CompletionCallback>,
}

impl TransitionParameters {
    /// Parameters for a slide-to-slide transition.
    pub fn slide(context: RenderContext, leaving: FrameRGBA, entering: FrameRGBA) -> Self {
        Self {
            context,
            leaving: Some(leaving),
            entering,
            animation_time: DEFAULT_ANIMATION_TIME,
            fade_color: Rgba8Premul::black(),
            alpha: 1.0,
            is_slide: true,
            on_complete: None,
        }
    }

    /// Parameters for a shape transition.
    pub fn shape(
        context: RenderContext,
        leaving: Option<FrameRGBA>,
        entering: FrameRGBA,
        alpha: f32,
    ) -> Self {
        Self {
            context,
            leaving,
            entering,
            animation_time: DEFAULT_ANIMATION_TIME,
            fade_color: Rgba8Premul::black(),
            alpha: alpha.clamp(0.0, 1.0),
            is_slide: false,
            on_complete: None,
        }
    }

    pub fn with_animation_time(mut self, animation_time: Duration) -> Self {
        self.animation_time = animation_time;
        self
    }

    pub fn with_fade_color(mut self, fade_color: Rgba8Premul) -> Self {
        self.fade_color = fade_color;
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for TransitionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionParameters")
            .field("has_leaving", &self.leaving.is_some())
            .field("animation_time", &self.animation_time)
            .field("fade_color", &self.fade_color)
            .field("alpha", &self.alpha)
            .field("is_slide", &self.is_slide)
            .finish_non_exhaustive()
    }
}

/// One in-flight visual effect.
pub trait Transition: fmt::Debug {
    /// Effect name for logs.
    fn name(&self) -> &'static str;

    /// Context the transition renders into.
    fn context(&self) -> &RenderContext;

    /// Declared wall-clock length.
    fn animation_time(&self) -> Duration;

    /// Allocate programs, buffers and textures. Called implicitly by the first `render`.
    fn prepare(&mut self) -> SlideFxResult<()>;

    /// Render the frame for progress `t`, clamped to `[0, 1]`. Completes at `t = 1`.
    fn render(&mut self, t: f64);

    /// Render the final frame if needed and complete.
    fn end(&mut self);

    /// Release GPU resources. Idempotent; later calls to `render` do nothing.
    fn dispose(&mut self);

    /// Ask the host for another frame on behalf of this transition.
    fn request_frame(&mut self);

    /// Whether the completion callback has fired.
    fn is_complete(&self) -> bool;
}

/// Clamp a progress value into `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp_progress(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

/// Completion callback slot that fires at most once.
pub(crate) struct Completion {
    callback: Option<CompletionCallback>,
    fired: bool,
}

impl Completion {
    pub(crate) fn new(callback: Option<CompletionCallback>) -> Self {
        Self {
            callback,
            fired: false,
        }
    }

    pub(crate) fn is_fired(&self) -> bool {
        self.fired
    }

    pub(crate) fn fire(&mut self, name: &str) {
        if self.fired {
            return;
        }
        self.fired = true;
        tracing::debug!(transition = name, "transition complete");
        if let Some(cb) = self.callback.take() {
            cb();
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("has_callback", &self.callback.is_some())
            .field("fired", &self.fired)
            .finish()
    }
}

/// Drives a transition from the host's frame callbacks without an activity.
///
/// Progress is the elapsed wall-clock time over the animation time, never decreasing. Each
/// frame before the end requests the next one; the last frame renders `t = 1` and stops.
#[derive(Debug)]
pub struct TransitionPlayer {
    transition: Box<dyn Transition>,
    started_at: Option<Duration>,
    progress: f64,
    finished: bool,
}

impl TransitionPlayer {
    pub fn new(transition: Box<dyn Transition>) -> Self {
        Self {
            transition,
            started_at: None,
            progress: 0.0,
            finished: false,
        }
    }

    /// Prepare, draw the first frame and request the next one.
    pub fn start(&mut self, now: Duration) -> SlideFxResult<()> {
        self.transition.prepare()?;
        self.started_at = Some(now);
        self.progress = 0.0;
        self.finished = false;
        self.transition.render(0.0);
        self.transition.request_frame();
        Ok(())
    }

    /// Handle one frame callback. Returns `true` while more frames are wanted.
    pub fn on_frame(&mut self, now: Duration) -> bool {
        let Some(start) = self.started_at else {
            return false;
        };
        if self.finished {
            return false;
        }
        if self.transition.context().is_disposed() {
            tracing::debug!(
                transition = self.transition.name(),
                "context disposed, stopping"
            );
            self.finished = true;
            return false;
        }

        let total = self.transition.animation_time();
        let elapsed = now.saturating_sub(start);
        let t = if total.is_zero() {
            1.0
        } else {
            clamp_progress(elapsed.as_secs_f64() / total.as_secs_f64())
        };
        self.progress = self.progress.max(t);
        self.transition.render(self.progress);

        if self.progress >= 1.0 {
            self.finished = true;
            false
        } else {
            self.transition.request_frame();
            true
        }
    }

    /// Stop early and release the transition's resources. No completion is signalled.
    pub fn stop(&mut self) {
        self.finished = true;
        self.transition.dispose();
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn transition(&self) -> &dyn Transition {
        self.transition.as_ref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/player.rs"]
mod tests;
