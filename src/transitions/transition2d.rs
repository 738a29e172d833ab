use std::sync::Arc;
use std::time::Duration;

use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{SlideFxError, SlideFxResult};
use crate::gpu::context::RenderContext;
use crate::gpu::raster::fullscreen_quad;
use crate::gpu::shader::{FragmentShader, Uniform};
use crate::transitions::pipeline::GpuPipeline;
use crate::transitions::{
    Completion, Transition, TransitionParameters, clamp_progress,
};

/// A transition drawn as one full-screen quad through an effect shader.
///
/// The shader reads the leaving slide from texture unit 0, the entering slide from unit 1 and
/// the progress from the `time` uniform.
#[derive(Debug)]
pub struct Transition2d {
    name: &'static str,
    shader: Arc<dyn FragmentShader>,
    leaving: Option<FrameRGBA>,
    entering: Option<FrameRGBA>,
    animation_time: Duration,
    alpha: f32,
    fade_color: [f32; 4],
    is_slide: bool,
    pipeline: GpuPipeline,
    completion: Completion,
}

impl Transition2d {
    pub fn new(
        name: &'static str,
        shader: Arc<dyn FragmentShader>,
        params: TransitionParameters,
    ) -> Self {
        let TransitionParameters {
            context,
            leaving,
            entering,
            animation_time,
            fade_color,
            alpha,
            is_slide,
            on_complete,
        } = params;
        Self {
            name,
            shader,
            leaving,
            entering: Some(entering),
            animation_time,
            alpha,
            fade_color: fade_color.to_f32(),
            is_slide,
            pipeline: GpuPipeline::new(context),
            completion: Completion::new(on_complete),
        }
    }

    pub fn is_slide(&self) -> bool {
        self.is_slide
    }

    pub fn pipeline(&self) -> &GpuPipeline {
        &self.pipeline
    }

    fn clear_color(&self) -> [f32; 4] {
        if self.is_slide {
            [0.0, 0.0, 0.0, 1.0]
        } else {
            [0.0; 4]
        }
    }
}

impl Transition for Transition2d {
    fn name(&self) -> &'static str {
        self.name
    }

    fn context(&self) -> &RenderContext {
        self.pipeline.context()
    }

    fn animation_time(&self) -> Duration {
        self.animation_time
    }

    fn prepare(&mut self) -> SlideFxResult<()> {
        if self.pipeline.is_prepared() {
            return Ok(());
        }
        if !self.pipeline.is_live() {
            return Err(SlideFxError::render(format!(
                "cannot prepare {}: context is disposed",
                self.name
            )));
        }
        let entering = self
            .entering
            .as_ref()
            .ok_or_else(|| SlideFxError::render("entering bitmap already released"))?;

        self.pipeline.init_program(self.shader.clone())?;
        self.pipeline.init_buffers(&fullscreen_quad())?;
        self.pipeline
            .upload_textures(self.leaving.as_ref(), entering)?;
        self.pipeline.init_uniforms(&[
            Uniform::Time(0.0),
            Uniform::Alpha(self.alpha),
            Uniform::Color(self.fade_color),
            Uniform::Perspective(false),
        ]);

        self.leaving = None;
        self.entering = None;
        tracing::debug!(transition = self.name, slide = self.is_slide, "prepared");
        Ok(())
    }

    fn render(&mut self, t: f64) {
        if !self.pipeline.is_live() {
            tracing::debug!(transition = self.name, "render skipped, context disposed");
            return;
        }
        if let Err(e) = self.prepare() {
            tracing::warn!(transition = self.name, error = %e, "prepare failed");
            return;
        }

        let t = clamp_progress(t);
        let ctx = self.pipeline.context();
        ctx.clear_color(self.clear_color());
        ctx.clear();
        ctx.set_depth_test(false);
        ctx.set_blend(false);
        self.pipeline.bind();
        ctx.uniform(Uniform::Time(t as f32));
        ctx.draw_arrays(0, self.pipeline.vertex_count());
        ctx.flush();

        if t >= 1.0 {
            self.completion.fire(self.name);
        }
    }

    fn end(&mut self) {
        if !self.completion.is_fired() {
            self.render(1.0);
        }
        self.completion.fire(self.name);
    }

    fn dispose(&mut self) {
        self.pipeline.dispose();
        self.leaving = None;
        self.entering = None;
    }

    fn request_frame(&mut self) {
        self.pipeline.request_frame();
    }

    fn is_complete(&self) -> bool {
        self.completion.is_fired()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/transition2d.rs"]
mod tests;
