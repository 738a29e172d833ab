//! slidefx is a slideshow transition and animation engine.
//!
//! It plays timed visual effects (masked wipes, fades, push and cover, 3-D scenes) between two
//! rendered slide bitmaps and drives per-shape effect timelines within a slide. Rendering goes
//! through an explicit [`RenderContext`] backed by a software rasterizer; every GPU object has one
//! owner and is released exactly once.
//!
//! - Describe slides with [`SlideInfo`] and options with [`SlideShowOpts`]
//! - Supply layer bitmaps through a [`LayerSource`]
//! - Drive a [`SlideShowSession`] and collect frames in a [`FrameSink`]
//!
//! Single effects can be played directly: build [`TransitionParameters`], resolve them with
//! [`create_transition`] and drive the result with a [`TransitionPlayer`] or an [`Activity`].
#![forbid(unsafe_code)]

mod foundation;

/// Declared effects: type tables and timeline nodes.
pub mod animation;
/// Slide layer composition and sizing.
pub mod compositor;
/// Pixel kernels.
pub mod effects;
/// Rendering context and GPU objects.
pub mod gpu;
/// Busy indicator shown while layers load.
pub mod loader;
/// Session glue.
pub mod slideshow;
/// Activity timing and end events.
pub mod timing;
/// Transition implementations and the effect factory.
pub mod transitions;

pub use crate::foundation::core::{Affine, Canvas, FrameRGBA, Point, Rgba8Premul, Vec2};
pub use crate::foundation::error::{SlideFxError, SlideFxResult};
pub use crate::foundation::transform3d::Mat4;

pub use crate::animation::filter::{TransitionFilterInfo, TransitionSubType, TransitionType};
pub use crate::animation::node::{AnimationNode, Direction, Mode, RepeatCount, parse_clock_value};
pub use crate::compositor::{
    Layer, LayerCompositor, LayerKind, LayerSource, MemoryLayerSource, SolidLayerSource,
    compute_layer_resolution, compute_layer_size,
};
pub use crate::gpu::context::{ContextOpts, RenderContext};
pub use crate::loader::{GpuLoader, Loader, NoOpLoader};
pub use crate::slideshow::{
    FrameSink, InMemorySink, PngSequenceSink, SinkConfig, SlideInfo, SlideShowOpts,
    SlideShowSession,
};
pub use crate::timing::activity::{Activity, ActivityParams, Animation, calc_accelerated_time};
pub use crate::timing::event_queue::{Event, EventKind, TimerEventQueue};
pub use crate::transitions::factory::resolve_with_fallback;
pub use crate::transitions::{
    DEFAULT_ANIMATION_TIME, Transition, TransitionKind, TransitionParameters, TransitionPlayer,
    create_transition, resolve,
};
