//! GPU resources shared by every transition implementation.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::foundation::core::FrameRGBA;
use crate::foundation::error::SlideFxResult;
use crate::gpu::context::{Attribute, FrameRequestId, RenderContext};
use crate::gpu::resources::{GpuBuffer, GpuProgram, GpuTexture, GpuVertexArray};
use crate::gpu::shader::{FragmentShader, TextureUnit, Uniform};

/// Floats per interleaved vertex: `xyz` position then `uv`.
pub(crate) const VERTEX_STRIDE: usize = 5;

/// Program, vertex array, buffers and textures owned by one transition.
///
/// Handles are released in a fixed order by [`dispose`](Self::dispose), which may be called any
/// number of times. Once disposed, or once the context is disposed, every method is inert.
#[derive(Debug)]
pub struct GpuPipeline {
    ctx: RenderContext,
    program: Option<GpuProgram>,
    vao: Option<GpuVertexArray>,
    buffers: SmallVec<[GpuBuffer; 2]>,
    leaving: Option<GpuTexture>,
    entering: Option<GpuTexture>,
    vertex_count: usize,
    frame_request: Option<FrameRequestId>,
    disposed: bool,
}

impl GpuPipeline {
    pub fn new(ctx: RenderContext) -> Self {
        Self {
            ctx,
            program: None,
            vao: None,
            buffers: SmallVec::new(),
            leaving: None,
            entering: None,
            vertex_count: 0,
            frame_request: None,
            disposed: false,
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    /// `false` after [`dispose`](Self::dispose) or once the context itself is gone.
    pub fn is_live(&self) -> bool {
        !self.disposed && !self.ctx.is_disposed()
    }

    pub fn is_prepared(&self) -> bool {
        self.program.is_some() && self.vao.is_some()
    }

    /// Vertices uploaded by [`init_buffers`](Self::init_buffers).
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn init_program(&mut self, shader: Arc<dyn FragmentShader>) -> SlideFxResult<()> {
        self.program = Some(self.ctx.create_program(shader)?);
        Ok(())
    }

    /// Upload interleaved `xyz uv` vertices and record the attribute layout.
    pub fn init_buffers(&mut self, vertices: &[f32]) -> SlideFxResult<()> {
        let vao = self.ctx.create_vertex_array()?;
        let buffer = self.ctx.create_buffer()?;
        self.ctx.bind_vertex_array(Some(&vao));
        self.ctx.bind_buffer(Some(&buffer));
        self.ctx.buffer_data(&buffer, vertices);
        self.ctx
            .vertex_attrib_pointer(&vao, Attribute::Position, &buffer, 3, VERTEX_STRIDE, 0);
        self.ctx
            .vertex_attrib_pointer(&vao, Attribute::TexCoord, &buffer, 2, VERTEX_STRIDE, 3);
        self.ctx.bind_buffer(None);
        self.ctx.bind_vertex_array(None);

        self.vertex_count = vertices.len() / VERTEX_STRIDE;
        self.buffers.push(buffer);
        self.vao = Some(vao);
        Ok(())
    }

    pub fn upload_textures(
        &mut self,
        leaving: Option<&FrameRGBA>,
        entering: &FrameRGBA,
    ) -> SlideFxResult<()> {
        self.leaving = leaving.map(|f| self.ctx.create_texture(f)).transpose()?;
        self.entering = Some(self.ctx.create_texture(entering)?);
        Ok(())
    }

    pub fn has_leaving_texture(&self) -> bool {
        self.leaving.is_some()
    }

    /// Set uniforms on the program once, right after linking.
    pub fn init_uniforms(&self, values: &[Uniform]) {
        if !self.is_live() {
            return;
        }
        self.ctx.use_program(self.program.as_ref());
        for v in values {
            self.ctx.uniform(*v);
        }
    }

    /// Bind program, vertex array and both textures to their fixed units.
    pub fn bind(&self) {
        if !self.is_live() {
            return;
        }
        self.ctx.use_program(self.program.as_ref());
        self.ctx.bind_vertex_array(self.vao.as_ref());
        self.ctx
            .bind_texture(TextureUnit::Leaving, self.leaving.as_ref());
        self.ctx
            .bind_texture(TextureUnit::Entering, self.entering.as_ref());
    }

    pub fn request_frame(&mut self) {
        if !self.is_live() {
            return;
        }
        self.frame_request = self.ctx.request_frame();
    }

    /// Release everything this pipeline owns.
    ///
    /// Order: cancel the pending frame, clear, delete the vertex array, delete the program,
    /// unbind buffers, vertex array and textures, reset the program binding, flush. Textures and
    /// buffers are released last, after they are unbound.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if self.ctx.is_disposed() {
            tracing::debug!("pipeline dispose after context loss");
            self.drop_handles();
            return;
        }

        if let Some(id) = self.frame_request.take() {
            self.ctx.cancel_frame(id);
        }
        self.ctx.clear();
        self.vao = None;
        self.program = None;
        self.ctx.bind_buffer(None);
        self.ctx.bind_vertex_array(None);
        self.ctx.unbind_all_textures();
        self.ctx.use_program(None);
        self.ctx.flush();
        self.drop_handles();
    }

    fn drop_handles(&mut self) {
        self.frame_request = None;
        self.vao = None;
        self.program = None;
        self.buffers.clear();
        self.leaving = None;
        self.entering = None;
        self.vertex_count = 0;
    }
}

impl Drop for GpuPipeline {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/pipeline.rs"]
mod tests;
