//! 3-D transitions built from textured primitives and time-parameterised operations.
//!
//! Primitive vertices live in slide space, `[-1, 1]` on both axes with `+y` up and `+z`
//! towards the viewer. Operations act in a physical space where the slide keeps its aspect
//! ratio: x and y are scaled by the slide's width and height over its larger side. Every
//! frame, each primitive's matrix is rebuilt from scratch from its operations and the scene
//! operations.

use std::sync::Arc;
use std::time::Duration;

use smallvec::SmallVec;

use crate::foundation::core::{Canvas, FrameRGBA};
use crate::foundation::error::{SlideFxError, SlideFxResult};
use crate::foundation::transform3d::Mat4;
use crate::gpu::context::RenderContext;
use crate::gpu::shader::{TextureUnit, TexturedShader, Uniform};
use crate::transitions::pipeline::{GpuPipeline, VERTEX_STRIDE};
use crate::transitions::{Completion, Transition, TransitionParameters, clamp_progress};

/// Where an operation is active in transition time.
///
/// Before `t0` the operation contributes nothing. Interpolating operations then ramp from 0 to
/// their full amount at `t1`; others apply the full amount at once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub interpolate: bool,
    pub t0: f64,
    pub t1: f64,
}

impl Interval {
    /// Ramp over `[t0, t1]`.
    pub const fn ramp(t0: f64, t1: f64) -> Self {
        Self {
            interpolate: true,
            t0,
            t1,
        }
    }

    /// Full amount once `t > t0`.
    pub const fn after(t0: f64) -> Self {
        Self {
            interpolate: false,
            t0,
            t1: t0 + 1.0,
        }
    }

    /// Full amount for every `t` in `[0, 1]`.
    pub const ALWAYS: Self = Self::after(-1.0);

    /// Fraction of the operation applied at `t`, or `None` before it starts.
    pub fn amount(&self, t: f64) -> Option<f64> {
        if t <= self.t0 {
            return None;
        }
        let t = if !self.interpolate || t > self.t1 {
            self.t1
        } else {
            t
        };
        let span = self.t1 - self.t0;
        if span <= 0.0 {
            return Some(1.0);
        }
        Some((t - self.t0) / span)
    }
}

/// Which slide dimension scales an operation's depth origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthScale {
    Unscaled,
    ByWidth,
    ByHeight,
}

/// One time-parameterised transform step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operation {
    /// Rotate `angle` degrees around `axis` through `origin`.
    Rotate {
        axis: [f64; 3],
        origin: [f64; 3],
        angle: f64,
        depth: DepthScale,
        interval: Interval,
    },
    /// Scale from 1 towards `factor` around `origin`.
    Scale {
        factor: [f64; 3],
        origin: [f64; 3],
        interval: Interval,
    },
    /// Move by `vector`.
    Translate { vector: [f64; 3], interval: Interval },
}

impl Operation {
    pub fn rotate(axis: [f64; 3], origin: [f64; 3], angle: f64, interval: Interval) -> Self {
        Self::Rotate {
            axis,
            origin,
            angle,
            depth: DepthScale::Unscaled,
            interval,
        }
    }

    /// Rotation whose depth origin is measured in slide widths.
    pub fn rotate_depth_by_width(
        axis: [f64; 3],
        origin: [f64; 3],
        angle: f64,
        interval: Interval,
    ) -> Self {
        Self::Rotate {
            axis,
            origin,
            angle,
            depth: DepthScale::ByWidth,
            interval,
        }
    }

    /// Rotation whose depth origin is measured in slide heights.
    pub fn rotate_depth_by_height(
        axis: [f64; 3],
        origin: [f64; 3],
        angle: f64,
        interval: Interval,
    ) -> Self {
        Self::Rotate {
            axis,
            origin,
            angle,
            depth: DepthScale::ByHeight,
            interval,
        }
    }

    pub fn scale(factor: [f64; 3], origin: [f64; 3], interval: Interval) -> Self {
        Self::Scale {
            factor,
            origin,
            interval,
        }
    }

    pub fn translate(vector: [f64; 3], interval: Interval) -> Self {
        Self::Translate { vector, interval }
    }

    /// Apply this operation at time `t` on top of `matrix`.
    pub fn interpolate(&self, matrix: Mat4, t: f64, scale_x: f64, scale_y: f64) -> Mat4 {
        match *self {
            Self::Rotate {
                axis,
                origin,
                angle,
                depth,
                interval,
            } => {
                let Some(k) = interval.amount(t) else {
                    return matrix;
                };
                let z = match depth {
                    DepthScale::Unscaled => origin[2],
                    DepthScale::ByWidth => origin[2] * scale_x,
                    DepthScale::ByHeight => origin[2] * scale_y,
                };
                let (ox, oy) = (origin[0] * scale_x, origin[1] * scale_y);
                Mat4::from_translation(ox, oy, z)
                    * Mat4::from_axis_angle(axis, (angle * k).to_radians())
                    * Mat4::from_translation(-ox, -oy, -z)
                    * matrix
            }
            Self::Scale {
                factor,
                origin,
                interval,
            } => {
                let Some(k) = interval.amount(t) else {
                    return matrix;
                };
                let (ox, oy, oz) = (origin[0] * scale_x, origin[1] * scale_y, origin[2]);
                let s = factor.map(|f| 1.0 + (f - 1.0) * k);
                Mat4::from_translation(ox, oy, oz)
                    * Mat4::from_scale(s[0], s[1], s[2])
                    * Mat4::from_translation(-ox, -oy, -oz)
                    * matrix
            }
            Self::Translate { vector, interval } => {
                let Some(k) = interval.amount(t) else {
                    return matrix;
                };
                Mat4::from_translation(
                    vector[0] * scale_x * k,
                    vector[1] * scale_y * k,
                    vector[2] * k,
                ) * matrix
            }
        }
    }
}

/// Apply `ops` in order, starting from `matrix`.
pub fn apply_operations(ops: &[Operation], matrix: Mat4, t: f64, sx: f64, sy: f64) -> Mat4 {
    ops.iter()
        .fold(matrix, |m, op| op.interpolate(m, t, sx, sy))
}

/// A textured triangle list with its own operations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Primitive {
    vertices: Vec<[f32; VERTEX_STRIDE]>,
    operations: SmallVec<[Operation; 4]>,
}

impl Primitive {
    pub fn new() -> Self {
        Self::default()
    }

    /// The whole slide.
    pub fn slide() -> Self {
        Self::rect(-1.0, -1.0, 1.0, 1.0)
    }

    /// Axis-aligned part of the slide, textured with the matching part of the image.
    pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let mut p = Self::new();
        p.push_quad([x0, y0], [x1, y1]);
        p
    }

    /// Append two triangles covering `[lo, hi]` at `z = 0`.
    pub fn push_quad(&mut self, lo: [f64; 2], hi: [f64; 2]) {
        let v = |x: f64, y: f64| -> [f32; VERTEX_STRIDE] {
            [
                x as f32,
                y as f32,
                0.0,
                ((x + 1.0) * 0.5) as f32,
                ((1.0 - y) * 0.5) as f32,
            ]
        };
        let (tl, bl) = (v(lo[0], hi[1]), v(lo[0], lo[1]));
        let (tr, br) = (v(hi[0], hi[1]), v(hi[0], lo[1]));
        self.vertices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
    }

    pub fn with_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    pub fn push_operation(&mut self, op: Operation) {
        self.operations.push(op);
    }

    pub fn vertices(&self) -> &[[f32; VERTEX_STRIDE]] {
        &self.vertices
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Model matrix at `t`, in physical space.
    pub fn matrix(&self, t: f64, sx: f64, sy: f64) -> Mat4 {
        apply_operations(&self.operations, Mat4::IDENTITY, t, sx, sy)
    }
}

/// Geometry of a 3-D transition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene3d {
    pub leaving: Vec<Primitive>,
    pub entering: Vec<Primitive>,
    /// Applied after each primitive's own operations.
    pub scene_ops: Vec<Operation>,
}

/// Physical scale of the slide axes: each side over the larger one.
pub fn slide_scale(canvas: Canvas) -> (f64, f64) {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let m = w.max(h).max(1.0);
    (w / m, h / m)
}

#[derive(Clone, Copy, Debug)]
struct DrawRange {
    first: usize,
    count: usize,
}

/// Draws a [`Scene3d`] with depth testing and perspective.
///
/// Entering primitives are drawn first; leaving primitives win depth ties, so coincident
/// geometry shows the leaving slide.
#[derive(Debug)]
pub struct SimpleTransition {
    name: &'static str,
    scene: Scene3d,
    leaving_bitmap: Option<FrameRGBA>,
    entering_bitmap: Option<FrameRGBA>,
    animation_time: Duration,
    scale: (f64, f64),
    entering_ranges: Vec<DrawRange>,
    leaving_ranges: Vec<DrawRange>,
    pipeline: GpuPipeline,
    completion: Completion,
}

impl SimpleTransition {
    pub fn new(name: &'static str, scene: Scene3d, params: TransitionParameters) -> Self {
        let TransitionParameters {
            context,
            leaving,
            entering,
            animation_time,
            on_complete,
            ..
        } = params;
        let scale = slide_scale(context.canvas());
        Self {
            name,
            scene,
            leaving_bitmap: leaving,
            entering_bitmap: Some(entering),
            animation_time,
            scale,
            entering_ranges: Vec::new(),
            leaving_ranges: Vec::new(),
            pipeline: GpuPipeline::new(context),
            completion: Completion::new(on_complete),
        }
    }

    pub fn scene(&self) -> &Scene3d {
        &self.scene
    }

    pub fn pipeline(&self) -> &GpuPipeline {
        &self.pipeline
    }

    /// Per-primitive model-view matrices at `t`, entering first, in slide space.
    pub fn matrices(&self, t: f64) -> Vec<Mat4> {
        let (sx, sy) = self.scale;
        let to_physical = Mat4::from_scale(sx, sy, 1.0);
        let to_slide = Mat4::from_scale(1.0 / sx, 1.0 / sy, 1.0);
        self.scene
            .entering
            .iter()
            .chain(self.scene.leaving.iter())
            .map(|p| {
                let m = apply_operations(&self.scene.scene_ops, p.matrix(t, sx, sy), t, sx, sy);
                to_slide * m * to_physical
            })
            .collect()
    }

    fn upload_geometry(&mut self) -> SlideFxResult<()> {
        let mut data: Vec<f32> = Vec::new();
        let ranges = |prims: &[Primitive], data: &mut Vec<f32>| -> Vec<DrawRange> {
            prims
                .iter()
                .map(|p| {
                    let first = data.len() / VERTEX_STRIDE;
                    for v in p.vertices() {
                        data.extend_from_slice(v);
                    }
                    DrawRange {
                        first,
                        count: p.vertices().len(),
                    }
                })
                .collect()
        };
        self.entering_ranges = ranges(&self.scene.entering, &mut data);
        self.leaving_ranges = ranges(&self.scene.leaving, &mut data);
        self.pipeline.init_buffers(&data)
    }
}

impl Transition for SimpleTransition {
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
            .entering_bitmap
            .take()
            .ok_or_else(|| SlideFxError::render("entering bitmap already released"))?;

        self.pipeline.init_program(Arc::new(TexturedShader))?;
        self.upload_geometry()?;
        self.pipeline
            .upload_textures(self.leaving_bitmap.as_ref(), &entering)?;
        self.pipeline.init_uniforms(&[
            Uniform::Time(0.0),
            Uniform::Alpha(1.0),
            Uniform::Perspective(true),
        ]);
        self.leaving_bitmap = None;
        tracing::debug!(
            transition = self.name,
            primitives = self.entering_ranges.len() + self.leaving_ranges.len(),
            "prepared"
        );
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
        let matrices = self.matrices(t);
        let ctx = self.pipeline.context();
        ctx.clear_color([0.0, 0.0, 0.0, 1.0]);
        ctx.set_depth_test(true);
        ctx.set_blend(false);
        ctx.clear();
        self.pipeline.bind();
        ctx.uniform(Uniform::Time(t as f32));

        let passes = [
            (TextureUnit::Entering, &self.entering_ranges),
            (TextureUnit::Leaving, &self.leaving_ranges),
        ];
        let mut matrix = matrices.iter();
        for (unit, ranges) in passes {
            ctx.uniform(Uniform::Sampler(unit));
            for range in ranges.iter() {
                let Some(m) = matrix.next() else {
                    break;
                };
                ctx.uniform(Uniform::Transform(*m));
                ctx.draw_arrays(range.first, range.count);
            }
        }
        ctx.set_depth_test(false);
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
        self.leaving_bitmap = None;
        self.entering_bitmap = None;
    }

    fn request_frame(&mut self) {
        self.pipeline.request_frame();
    }

    fn is_complete(&self) -> bool {
        self.completion.is_fired()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/simple3d.rs"]
mod tests;
