//! Spinner shown while a slide's layers are being fetched.

use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::SlideFxResult;
use crate::gpu::context::RenderContext;
use crate::gpu::raster::fullscreen_quad;
use crate::gpu::shader::{Fragment, FragmentShader, Uniform};
use crate::transitions::pipeline::GpuPipeline;

/// Seconds per spinner revolution.
const REVOLUTION_SECS: f64 = 1.2;
/// Ring radius as a fraction of the shorter viewport side.
const RING_RADIUS: f64 = 0.15;
/// Ring thickness as a fraction of the shorter viewport side.
const RING_WIDTH: f64 = 0.04;

/// A busy indicator driven by the host's frame callbacks.
pub trait Loader: fmt::Debug {
    /// Allocate resources and draw the first frame. Starting a running loader does nothing.
    fn start_loader(&mut self, now: Duration) -> SlideFxResult<()>;
    /// Draw the frame for `now`. Returns `true` while more frames are wanted.
    fn render_frame(&mut self, now: Duration) -> bool;
    /// Stop and release everything. No rendering call follows on this instance until restarted.
    fn stop_loader(&mut self);
    fn is_running(&self) -> bool;
}

/// Rotating arc with a fading tail, centred in the viewport.
#[derive(Debug)]
pub struct SpinnerShader;

impl FragmentShader for SpinnerShader {
    fn shade(&self, frag: &Fragment<'_>) -> [f32; 4] {
        let u = frag.uniforms;
        let [vw, vh] = u.viewport.map(f64::from);
        let x = (frag.uv.x - 0.5) * vw;
        let y = (frag.uv.y - 0.5) * vh;
        let side = vw.min(vh);

        let r = x.hypot(y);
        let ring = 1.0 - ((r - RING_RADIUS * side).abs() / (RING_WIDTH * side * 0.5));
        let background = [0.0, 0.0, 0.0, 1.0];
        if ring <= 0.0 {
            return background;
        }

        let angle = (y.atan2(x) / TAU).rem_euclid(1.0);
        let head = f64::from(u.time) / REVOLUTION_SECS;
        let tail = 1.0 - (angle + head).rem_euclid(1.0);
        let k = (ring.min(1.0) * tail) as f32;

        let mut out = [0.0; 4];
        for (i, o) in out.iter_mut().enumerate() {
            *o = background[i] * (1.0 - k * u.color[3]) + u.color[i] * k;
        }
        out
    }
}

/// Spinner drawn through its own pipeline on the shared context.
#[derive(Debug)]
pub struct GpuLoader {
    pipeline: GpuPipeline,
    color: Rgba8Premul,
    started_at: Option<Duration>,
}

impl GpuLoader {
    pub fn new(ctx: RenderContext, color: Rgba8Premul) -> Self {
        Self {
            pipeline: GpuPipeline::new(ctx),
            color,
            started_at: None,
        }
    }

    pub fn context(&self) -> &RenderContext {
        self.pipeline.context()
    }

    fn draw(&self, secs: f64) {
        let ctx = self.pipeline.context();
        ctx.clear_color([0.0, 0.0, 0.0, 1.0]);
        ctx.clear();
        ctx.set_depth_test(false);
        ctx.set_blend(false);
        self.pipeline.bind();
        ctx.uniform(Uniform::Time(secs as f32));
        ctx.draw_arrays(0, self.pipeline.vertex_count());
        ctx.flush();
    }
}

impl Loader for GpuLoader {
    #[tracing::instrument(level = "debug", skip(self))]
    fn start_loader(&mut self, now: Duration) -> SlideFxResult<()> {
        if self.started_at.is_some() {
            return Ok(());
        }
        if !self.pipeline.is_live() {
            self.pipeline = GpuPipeline::new(self.pipeline.context().clone());
        }
        self.pipeline.init_program(Arc::new(SpinnerShader))?;
        self.pipeline.init_buffers(&fullscreen_quad())?;
        self.pipeline
            .init_uniforms(&[Uniform::Color(self.color.to_f32())]);

        self.started_at = Some(now);
        self.draw(0.0);
        self.pipeline.request_frame();
        Ok(())
    }

    fn render_frame(&mut self, now: Duration) -> bool {
        let Some(start) = self.started_at else {
            return false;
        };
        if !self.pipeline.is_live() {
            tracing::debug!("loader frame skipped, context disposed");
            self.started_at = None;
            return false;
        }
        self.draw(now.saturating_sub(start).as_secs_f64());
        self.pipeline.request_frame();
        true
    }

    fn stop_loader(&mut self) {
        self.started_at = None;
        self.pipeline.dispose();
    }

    fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}

/// Loader for hosts without a spinner.
#[derive(Debug, Default)]
pub struct NoOpLoader {
    running: bool,
}

impl Loader for NoOpLoader {
    fn start_loader(&mut self, _now: Duration) -> SlideFxResult<()> {
        self.running = true;
        Ok(())
    }

    fn render_frame(&mut self, _now: Duration) -> bool {
        self.running
    }

    fn stop_loader(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
#[path = "../tests/unit/loader/loader.rs"]
mod tests;
