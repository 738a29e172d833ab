//! Slideshow session: slide sequencing, transitions, shape effects and frame delivery.
//!
//! The session owns the rendering context. The host drives it with lifecycle signals
//! ([`start`](SlideShowSession::start), [`next`](SlideShowSession::next),
//! [`stop`](SlideShowSession::stop)) and one [`tick`](SlideShowSession::tick) per display frame.
//! Every tick that renders pushes exactly one frame to the sink.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use crate::animation::node::TransitionAnimation;
use crate::compositor::layers::{LayerCompositor, LayerKind, LayerSource};
use crate::effects::composite::over_frame;
use crate::foundation::core::{Canvas, FrameRGBA, Rgba8Premul};
use crate::foundation::error::{SlideFxError, SlideFxResult};
use crate::gpu::context::{ContextOpts, RenderContext};
use crate::loader::{GpuLoader, Loader, NoOpLoader};
use crate::slideshow::config::SlideShowOpts;
use crate::slideshow::sink::{FrameSink, SinkConfig};
use crate::slideshow::slide_info::SlideInfo;
use crate::timing::activity::{Activity, ActivityParams};
use crate::timing::event_queue::{EventKind, TimerEventQueue};
use crate::transitions::TransitionParameters;
use crate::transitions::factory::{TransitionKind, build_transition, resolve_with_fallback};

const LOADER_COLOR: Rgba8Premul = Rgba8Premul {
    r: 204,
    g: 204,
    b: 204,
    a: 255,
};

/// Composed bitmaps of one slide.
#[derive(Debug)]
struct SlideBitmaps {
    /// Background, master page and slide content.
    base: FrameRGBA,
    /// Shape layers in stacking order.
    shapes: Vec<(String, FrameRGBA)>,
}

/// Shape effect progress on the current slide.
#[derive(Debug, Default)]
struct ShapeState {
    next_effect: usize,
    visible: HashSet<String>,
}

#[derive(Debug)]
enum Phase {
    Idle,
    /// Waiting for the layers of `slide`.
    Loading { slide: usize },
    /// Transition into `slide`.
    Transition { slide: usize, activity: Activity },
    /// `slide` is static.
    Showing { slide: usize },
    /// A shape effect on `slide`. `base` is the slide without the animated shape.
    Animating {
        slide: usize,
        activity: Activity,
        target: String,
        mode_in: bool,
        base: FrameRGBA,
    },
    Finished,
}

/// One running slideshow.
pub struct SlideShowSession<S: LayerSource, K: FrameSink> {
    opts: SlideShowOpts,
    slides: Vec<SlideInfo>,
    source: S,
    sink: K,
    ctx: RenderContext,
    compositor: LayerCompositor,
    loader: Box<dyn Loader>,
    queue: TimerEventQueue,
    bitmaps: HashMap<usize, SlideBitmaps>,
    shapes: ShapeState,
    phase: Phase,
    presented: FrameRGBA,
    next_frame: u64,
    sink_open: bool,
}

impl<S: LayerSource, K: FrameSink> fmt::Debug for SlideShowSession<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlideShowSession")
            .field("slides", &self.slides.len())
            .field("phase", &self.phase)
            .field("frames", &self.next_frame)
            .finish_non_exhaustive()
    }
}

impl<S: LayerSource, K: FrameSink> SlideShowSession<S, K> {
    pub fn new(opts: SlideShowOpts, slides: Vec<SlideInfo>, source: S, sink: K) -> SlideFxResult<Self> {
        opts.validate()?;
        let canvas = opts.canvas()?;
        let ctx = RenderContext::new(
            canvas,
            ContextOpts {
                parallel: opts.parallel_raster,
            },
        );
        let loader: Box<dyn Loader> = if opts.loader {
            Box::new(GpuLoader::new(ctx.clone(), LOADER_COLOR))
        } else {
            Box::new(NoOpLoader::default())
        };
        let clear = opts.clear_color();
        Ok(Self {
            compositor: LayerCompositor::new(canvas, clear),
            presented: FrameRGBA::filled(canvas, clear),
            opts,
            slides,
            source,
            sink,
            ctx,
            loader,
            queue: TimerEventQueue::new(),
            bitmaps: HashMap::new(),
            shapes: ShapeState::default(),
            phase: Phase::Idle,
            next_frame: 0,
            sink_open: false,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.compositor.canvas()
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Layer source, e.g. to deliver layers that were still missing.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn slides(&self) -> &[SlideInfo] {
        &self.slides
    }

    /// Slide on screen or being entered.
    pub fn current_slide(&self) -> Option<usize> {
        match self.phase {
            Phase::Loading { slide }
            | Phase::Transition { slide, .. }
            | Phase::Showing { slide }
            | Phase::Animating { slide, .. } => Some(slide),
            Phase::Idle | Phase::Finished => None,
        }
    }

    /// Whether the host should keep ticking.
    pub fn wants_frames(&self) -> bool {
        matches!(
            self.phase,
            Phase::Loading { .. } | Phase::Transition { .. } | Phase::Animating { .. }
        )
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transition { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    /// Frames pushed to the sink so far.
    pub fn frames_presented(&self) -> u64 {
        self.next_frame
    }

    /// Last frame pushed to the sink, or the clear colour before the first one.
    pub fn presented(&self) -> &FrameRGBA {
        &self.presented
    }

    /// Open the sink and enter the first slide. Does nothing without slides.
    #[tracing::instrument(skip(self), fields(slides = self.slides.len()))]
    pub fn start(&mut self, now: Duration) -> SlideFxResult<()> {
        if self.slides.is_empty() {
            tracing::debug!("no slides, nothing to show");
            return Ok(());
        }
        if self.ctx.is_disposed() {
            return Err(SlideFxError::render("session was stopped"));
        }
        if !matches!(self.phase, Phase::Idle) {
            tracing::debug!("session already started");
            return Ok(());
        }
        let canvas = self.canvas();
        self.sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
        })?;
        self.sink_open = true;
        self.go_to(0, now);
        Ok(())
    }

    /// Advance: finish the running effect, else play the next shape effect, else enter the next
    /// slide. Past the last slide the session is finished.
    #[tracing::instrument(skip(self), fields(slide = ?self.current_slide()))]
    pub fn next(&mut self, now: Duration) {
        match self.phase {
            Phase::Idle | Phase::Finished => {}
            Phase::Loading { slide } => {
                tracing::debug!(slide, "still loading, advance ignored");
            }
            Phase::Transition { .. } | Phase::Animating { .. } => self.finish_effect(now),
            Phase::Showing { slide } => {
                if self.begin_next_effect(slide, now) {
                    return;
                }
                if slide + 1 < self.slides.len() {
                    self.go_to(slide + 1, now);
                } else {
                    tracing::info!("end of slideshow");
                    self.phase = Phase::Finished;
                }
            }
        }
    }

    /// Render one frame. Returns `true` while more frames are wanted.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.phase {
            Phase::Idle | Phase::Finished | Phase::Showing { .. } => false,
            Phase::Loading { slide } => {
                if self.ensure_bitmaps(slide) {
                    self.begin_transition(slide, now);
                } else if self.loader.render_frame(now) && self.opts.loader {
                    let frame = self.ctx.read_pixels();
                    self.present(frame);
                }
                self.wants_frames()
            }
            Phase::Transition { .. } | Phase::Animating { .. } => {
                self.step(now);
                self.wants_frames()
            }
        }
    }

    /// End the show: release every GPU object, close the sink and dispose the context.
    #[tracing::instrument(skip(self))]
    pub fn stop(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Finished) {
            Phase::Transition { mut activity, .. } | Phase::Animating { mut activity, .. } => {
                activity.dispose();
            }
            _ => {}
        }
        self.loader.stop_loader();
        self.queue.clear();
        self.bitmaps.clear();
        if self.sink_open {
            self.sink_open = false;
            if let Err(err) = self.sink.end() {
                tracing::warn!(%err, "closing the sink failed");
            }
        }
        self.ctx.dispose();
    }

    fn go_to(&mut self, slide: usize, now: Duration) {
        if self.ensure_bitmaps(slide) {
            self.begin_transition(slide, now);
            return;
        }
        self.phase = Phase::Loading { slide };
        match self.loader.start_loader(now) {
            Ok(()) if self.opts.loader => {
                let frame = self.ctx.read_pixels();
                self.present(frame);
            }
            Ok(()) => {}
            Err(err) => tracing::warn!(%err, "loader failed to start"),
        }
    }

    /// Fetch and compose the layers of `slide` unless cached. `false` while they are missing.
    #[tracing::instrument(level = "debug", skip(self))]
    fn ensure_bitmaps(&mut self, slide: usize) -> bool {
        if self.bitmaps.contains_key(&slide) {
            return true;
        }
        let Some(info) = self.slides.get(slide) else {
            return false;
        };
        let layers = match self.source.fetch_layers(info, self.compositor.canvas()) {
            Ok(layers) => layers,
            Err(err) => {
                tracing::warn!(slide, %err, "fetching layers failed");
                return false;
            }
        };
        let base = match self.compositor.compose_slide(&layers) {
            Ok(Some(base)) => base,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!(slide, %err, "composing layers failed");
                return false;
            }
        };
        let shapes = layers
            .into_iter()
            .filter(|l| l.kind == LayerKind::Shape)
            .map(|l| (l.id, l.bitmap))
            .collect();
        self.bitmaps.insert(slide, SlideBitmaps { base, shapes });
        true
    }

    /// Shapes whose first effect is an entrance start hidden.
    fn reset_shapes(&mut self, slide: usize) {
        let mut state = ShapeState::default();
        if let Some(bitmaps) = self.bitmaps.get(&slide) {
            let nodes = &self.slides[slide].animations;
            for (id, _) in &bitmaps.shapes {
                let first = nodes
                    .iter()
                    .find(|n| n.target_element.as_deref() == Some(id.as_str()));
                if first.is_none_or(|n| !n.is_mode_in()) {
                    state.visible.insert(id.clone());
                }
            }
        }
        self.shapes = state;
    }

    /// The slide with its visible shapes, optionally leaving one out.
    fn backdrop(&self, slide: usize, exclude: Option<&str>) -> FrameRGBA {
        let Some(bitmaps) = self.bitmaps.get(&slide) else {
            return FrameRGBA::filled(self.canvas(), self.opts.clear_color());
        };
        let mut out = bitmaps.base.clone();
        for (id, bitmap) in &bitmaps.shapes {
            if Some(id.as_str()) == exclude || !self.shapes.visible.contains(id) {
                continue;
            }
            if let Err(err) = over_frame(&mut out, bitmap, 1.0) {
                tracing::warn!(shape = %id, %err, "skipping shape");
            }
        }
        out
    }

    fn begin_transition(&mut self, slide: usize, now: Duration) {
        if self.loader.is_running() {
            self.loader.stop_loader();
        }
        self.reset_shapes(slide);
        let entering = self.backdrop(slide, None);
        let info = self.slides[slide].transition_info();
        let kind = resolve_with_fallback(&info, true, self.opts.fallback_kind());
        let duration = if kind == TransitionKind::NoTransition {
            Duration::ZERO
        } else {
            self.slides[slide].transition_duration_or(self.opts.default_transition_duration())
        };
        tracing::debug!(slide, transition = kind.name(), ?duration, "entering slide");

        let params =
            TransitionParameters::slide(self.ctx.clone(), self.presented.clone(), entering.clone())
                .with_animation_time(duration);
        let transition = build_transition(kind, &info, params);
        let activity = Activity::new(
            ActivityParams {
                duration,
                ..ActivityParams::default()
            },
            Box::new(TransitionAnimation::new(transition, false)),
            None,
        );
        match activity {
            Ok(mut activity) => {
                let event = self.queue.make_event(EventKind::TransitionEnded { slide });
                activity.activate(event);
                self.phase = Phase::Transition { slide, activity };
                self.step(now);
            }
            Err(err) => {
                tracing::warn!(slide, %err, "transition failed, cutting");
                self.phase = Phase::Showing { slide };
                self.present(entering);
            }
        }
    }

    /// Start the next playable shape effect of `slide`. `false` when none is left.
    fn begin_next_effect(&mut self, slide: usize, now: Duration) -> bool {
        while let Some(node) = self.slides[slide]
            .animations
            .get(self.shapes.next_effect)
            .cloned()
        {
            self.shapes.next_effect += 1;
            let Some(target) = node.target_element.clone() else {
                tracing::warn!(id = ?node.id, "effect without target, skipped");
                continue;
            };
            let bitmap = self.bitmaps.get(&slide).and_then(|b| {
                b.shapes
                    .iter()
                    .find(|(id, _)| *id == target)
                    .map(|(_, f)| f.clone())
            });
            let Some(bitmap) = bitmap else {
                tracing::warn!(shape = %target, "no layer for shape, effect skipped");
                continue;
            };

            let base = self.backdrop(slide, Some(&target));
            let params = TransitionParameters::shape(self.ctx.clone(), None, bitmap, 1.0);
            let mut activity =
                match node.create_activity_with_fallback(params, self.opts.fallback_kind()) {
                    Ok(a) => a,
                    Err(err) => {
                        tracing::warn!(shape = %target, %err, "effect skipped");
                        continue;
                    }
                };
            let event = self.queue.make_event(EventKind::EffectEnded {
                target: target.clone(),
            });
            activity.activate(event);
            self.phase = Phase::Animating {
                slide,
                activity,
                target,
                mode_in: node.is_mode_in(),
                base,
            };
            self.step(now);
            return true;
        }
        false
    }

    fn step(&mut self, now: Duration) {
        let frame = match &mut self.phase {
            Phase::Transition { activity, .. } => {
                activity.perform(now, &mut self.queue);
                self.ctx.read_pixels()
            }
            Phase::Animating { activity, base, .. } => {
                activity.perform(now, &mut self.queue);
                let mut out = base.clone();
                if let Err(err) = over_frame(&mut out, &self.ctx.read_pixels(), 1.0) {
                    tracing::warn!(%err, "shape frame dropped");
                }
                out
            }
            _ => return,
        };
        self.present(frame);
        self.dispatch_events(now);
    }

    /// Force the running effect to its final frame.
    fn finish_effect(&mut self, now: Duration) {
        let frame = match &mut self.phase {
            Phase::Transition { activity, .. } => {
                activity.end(now, &mut self.queue);
                self.ctx.read_pixels()
            }
            Phase::Animating { activity, base, .. } => {
                activity.end(now, &mut self.queue);
                let mut out = base.clone();
                if let Err(err) = over_frame(&mut out, &self.ctx.read_pixels(), 1.0) {
                    tracing::warn!(%err, "shape frame dropped");
                }
                out
            }
            _ => return,
        };
        self.present(frame);
        self.dispatch_events(now);
    }

    fn dispatch_events(&mut self, now: Duration) {
        for event in self.queue.process_events(now) {
            match (&event.kind, &self.phase) {
                (EventKind::TransitionEnded { slide }, Phase::Transition { slide: s, .. })
                    if slide == s =>
                {
                    tracing::debug!(slide, "transition ended");
                    self.phase = Phase::Showing { slide: *slide };
                }
                (
                    EventKind::EffectEnded { target },
                    Phase::Animating {
                        slide,
                        target: t,
                        mode_in,
                        ..
                    },
                ) if target == t => {
                    tracing::debug!(shape = %target, "effect ended");
                    if *mode_in {
                        self.shapes.visible.insert(target.clone());
                    } else {
                        self.shapes.visible.remove(target);
                    }
                    self.phase = Phase::Showing { slide: *slide };
                }
                _ => tracing::debug!(?event, "stale event dropped"),
            }
        }
    }

    fn present(&mut self, frame: FrameRGBA) {
        if let Err(err) = self.sink.push_frame(self.next_frame, &frame) {
            tracing::warn!(frame = self.next_frame, %err, "sink rejected frame");
        }
        self.next_frame += 1;
        self.presented = frame;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/slideshow/session.rs"]
mod tests;
