use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::foundation::core::{Canvas, FrameRGBA, Point};
use crate::foundation::error::{SlideFxError, SlideFxResult};
use crate::gpu::raster::{RasterTarget, Vertex, draw_triangles};
use crate::gpu::resources::{
    BufferId, GpuBuffer, GpuProgram, GpuTexture, GpuVertexArray, ProgramId, TextureId,
    VertexArrayId,
};
use crate::gpu::shader::{
    FragmentShader, MAX_TEXTURE_UNITS, Samplers, TextureData, TextureUnit, Uniform, Uniforms,
};

/// Options for a new [`RenderContext`].
#[derive(Clone, Copy, Debug)]
pub struct ContextOpts {
    /// Shade rows in parallel on the rayon pool.
    pub parallel: bool,
}

impl Default for ContextOpts {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Vertex attributes understood by the rasterizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// `xyz` position.
    Position,
    /// `uv` texture coordinate.
    TexCoord,
}

/// Pending frame callback handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub u64);

/// Counts of live objects, for leak checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiveObjects {
    /// Programs.
    pub programs: usize,
    /// Vertex arrays.
    pub vertex_arrays: usize,
    /// Buffers.
    pub buffers: usize,
    /// Textures.
    pub textures: usize,
}

impl LiveObjects {
    /// Total object count.
    pub fn total(self) -> usize {
        self.programs + self.vertex_arrays + self.buffers + self.textures
    }
}

#[derive(Clone, Copy, Debug)]
struct AttribBinding {
    buffer: BufferId,
    components: usize,
    stride: usize,
    offset: usize,
}

#[derive(Debug)]
struct ProgramObject {
    shader: Arc<dyn FragmentShader>,
    uniforms: Uniforms,
}

struct ContextState {
    canvas: Canvas,
    opts: ContextOpts,
    disposed: bool,
    calls: u64,

    color: Vec<u8>,
    depth: Vec<f32>,
    clear_color: [f32; 4],
    depth_test: bool,
    blend: bool,

    next_handle: u32,
    programs: HashMap<ProgramId, ProgramObject>,
    vertex_arrays: HashMap<VertexArrayId, HashMap<Attribute, AttribBinding>>,
    buffers: HashMap<BufferId, Vec<f32>>,
    textures: HashMap<TextureId, TextureData>,

    current_program: Option<ProgramId>,
    bound_vertex_array: Option<VertexArrayId>,
    bound_buffer: Option<BufferId>,
    texture_units: [Option<TextureId>; MAX_TEXTURE_UNITS],

    next_frame: u64,
    pending_frame: Option<FrameRequestId>,
}

impl ContextState {
    fn alloc_handle(&mut self) -> u32 {
        self.next_handle = self.next_handle.wrapping_add(1).max(1);
        self.next_handle
    }
}

/// Explicit rendering context shared by transitions, loaders and the session.
///
/// A software implementation of the small GPU surface the engine needs: programs, vertex arrays,
/// buffers, textures, uniforms, one draw call and a frame request slot. Cloning yields another
/// handle to the same context. All calls run on the single render-loop thread.
///
/// Every call on a disposed context returns immediately and is not counted in
/// [`call_count`](Self::call_count).
#[derive(Clone)]
pub struct RenderContext {
    state: Rc<RefCell<ContextState>>,
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.state.borrow();
        f.debug_struct("RenderContext")
            .field("canvas", &s.canvas)
            .field("disposed", &s.disposed)
            .field("calls", &s.calls)
            .finish_non_exhaustive()
    }
}

impl RenderContext {
    /// Create a context rendering into a `canvas`-sized framebuffer.
    pub fn new(canvas: Canvas, opts: ContextOpts) -> Self {
        let px = canvas.pixel_count();
        Self {
            state: Rc::new(RefCell::new(ContextState {
                canvas,
                opts,
                disposed: false,
                calls: 0,
                color: vec![0; px * 4],
                depth: vec![f32::NEG_INFINITY; px],
                clear_color: [0.0, 0.0, 0.0, 1.0],
                depth_test: false,
                blend: false,
                next_handle: 0,
                programs: HashMap::new(),
                vertex_arrays: HashMap::new(),
                buffers: HashMap::new(),
                textures: HashMap::new(),
                current_program: None,
                bound_vertex_array: None,
                bound_buffer: None,
                texture_units: [None; MAX_TEXTURE_UNITS],
                next_frame: 0,
                pending_frame: None,
            })),
        }
    }

    /// Framebuffer size.
    pub fn canvas(&self) -> Canvas {
        self.state.borrow().canvas
    }

    /// Whether the context has been disposed (context loss or session end).
    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Number of calls issued on the live context so far.
    pub fn call_count(&self) -> u64 {
        self.state.borrow().calls
    }

    /// Live object counts.
    pub fn live_objects(&self) -> LiveObjects {
        let s = self.state.borrow();
        LiveObjects {
            programs: s.programs.len(),
            vertex_arrays: s.vertex_arrays.len(),
            buffers: s.buffers.len(),
            textures: s.textures.len(),
        }
    }

    /// Dispose the context, dropping every object it owns. Idempotent.
    pub fn dispose(&self) {
        let mut s = self.state.borrow_mut();
        if s.disposed {
            return;
        }
        s.disposed = true;
        s.programs.clear();
        s.vertex_arrays.clear();
        s.buffers.clear();
        s.textures.clear();
        s.current_program = None;
        s.bound_vertex_array = None;
        s.bound_buffer = None;
        s.texture_units = [None; MAX_TEXTURE_UNITS];
        s.pending_frame = None;
        tracing::debug!("render context disposed");
    }

    /// Run `f` on the live state, counting one call. Returns `None` when disposed.
    fn with_live<R>(&self, f: impl FnOnce(&mut ContextState) -> R) -> Option<R> {
        let mut s = self.state.borrow_mut();
        if s.disposed {
            return None;
        }
        s.calls = s.calls.saturating_add(1);
        Some(f(&mut s))
    }

    fn disposed_error() -> SlideFxError {
        SlideFxError::render("render context is disposed")
    }

    /// Link a program around `shader`.
    pub fn create_program(&self, shader: Arc<dyn FragmentShader>) -> SlideFxResult<GpuProgram> {
        let id = self
            .with_live(|s| {
                let id = ProgramId(s.alloc_handle());
                s.programs.insert(
                    id,
                    ProgramObject {
                        shader,
                        uniforms: Uniforms {
                            viewport: [s.canvas.width as f32, s.canvas.height as f32],
                            ..Default::default()
                        },
                    },
                );
                id
            })
            .ok_or_else(Self::disposed_error)?;
        Ok(GpuProgram::new(self.clone(), id))
    }

    /// Create an empty vertex array.
    pub fn create_vertex_array(&self) -> SlideFxResult<GpuVertexArray> {
        let id = self
            .with_live(|s| {
                let id = VertexArrayId(s.alloc_handle());
                s.vertex_arrays.insert(id, HashMap::new());
                id
            })
            .ok_or_else(Self::disposed_error)?;
        Ok(GpuVertexArray::new(self.clone(), id))
    }

    /// Create an empty buffer.
    pub fn create_buffer(&self) -> SlideFxResult<GpuBuffer> {
        let id = self
            .with_live(|s| {
                let id = BufferId(s.alloc_handle());
                s.buffers.insert(id, Vec::new());
                id
            })
            .ok_or_else(Self::disposed_error)?;
        Ok(GpuBuffer::new(self.clone(), id))
    }

    /// Upload a bitmap into a new texture.
    pub fn create_texture(&self, bitmap: &FrameRGBA) -> SlideFxResult<GpuTexture> {
        let expected = (bitmap.width as usize) * (bitmap.height as usize) * 4;
        if bitmap.data.len() != expected {
            return Err(SlideFxError::evaluation(
                "texture upload expects width*height*4 bytes",
            ));
        }
        let id = self
            .with_live(|s| {
                let id = TextureId(s.alloc_handle());
                s.textures.insert(
                    id,
                    TextureData {
                        width: bitmap.width,
                        height: bitmap.height,
                        data: bitmap.data.clone(),
                    },
                );
                id
            })
            .ok_or_else(Self::disposed_error)?;
        Ok(GpuTexture::new(self.clone(), id))
    }

    /// Replace the contents of `buffer`.
    pub fn buffer_data(&self, buffer: &GpuBuffer, data: &[f32]) {
        self.with_live(|s| {
            if let Some(b) = s.buffers.get_mut(&buffer.id()) {
                b.clear();
                b.extend_from_slice(data);
            }
        });
    }

    /// Record where `attribute` reads from, in floats.
    pub fn vertex_attrib_pointer(
        &self,
        vao: &GpuVertexArray,
        attribute: Attribute,
        buffer: &GpuBuffer,
        components: usize,
        stride: usize,
        offset: usize,
    ) {
        self.with_live(|s| {
            if let Some(v) = s.vertex_arrays.get_mut(&vao.id()) {
                v.insert(
                    attribute,
                    AttribBinding {
                        buffer: buffer.id(),
                        components,
                        stride: stride.max(components),
                        offset,
                    },
                );
            }
        });
    }

    /// Make `program` current (`None` unbinds).
    pub fn use_program(&self, program: Option<&GpuProgram>) {
        self.with_live(|s| s.current_program = program.map(GpuProgram::id));
    }

    /// Bind a vertex array (`None` unbinds).
    pub fn bind_vertex_array(&self, vao: Option<&GpuVertexArray>) {
        self.with_live(|s| s.bound_vertex_array = vao.map(GpuVertexArray::id));
    }

    /// Bind the array buffer (`None` unbinds).
    pub fn bind_buffer(&self, buffer: Option<&GpuBuffer>) {
        self.with_live(|s| s.bound_buffer = buffer.map(GpuBuffer::id));
    }

    /// Bind a texture to a unit (`None` unbinds).
    pub fn bind_texture(&self, unit: TextureUnit, texture: Option<&GpuTexture>) {
        self.with_live(|s| s.texture_units[unit.index()] = texture.map(GpuTexture::id));
    }

    /// Unbind every texture unit.
    pub fn unbind_all_textures(&self) {
        self.with_live(|s| s.texture_units = [None; MAX_TEXTURE_UNITS]);
    }

    /// Assign a uniform on the current program.
    pub fn uniform(&self, value: Uniform) {
        self.with_live(|s| {
            if let Some(p) = s
                .current_program
                .and_then(|id| s.programs.get_mut(&id))
            {
                p.uniforms.apply(value);
            }
        });
    }

    /// Toggle depth testing.
    pub fn set_depth_test(&self, enabled: bool) {
        self.with_live(|s| s.depth_test = enabled);
    }

    /// Toggle premultiplied source-over blending.
    pub fn set_blend(&self, enabled: bool) {
        self.with_live(|s| s.blend = enabled);
    }

    /// Colour used by [`clear`](Self::clear), premultiplied.
    pub fn clear_color(&self, color: [f32; 4]) {
        self.with_live(|s| s.clear_color = color);
    }

    /// Clear colour and depth.
    pub fn clear(&self) {
        self.with_live(|s| {
            let px = s.clear_color.map(crate::foundation::math::unit_f32_to_u8);
            for chunk in s.color.chunks_exact_mut(4) {
                chunk.copy_from_slice(&px);
            }
            s.depth.fill(f32::NEG_INFINITY);
        });
    }

    /// Draw `count` vertices starting at `first` as a triangle list.
    ///
    /// Does nothing when no program or vertex array is bound.
    pub fn draw_arrays(&self, first: usize, count: usize) {
        self.with_live(|s| {
            let ContextState {
                canvas,
                opts,
                color,
                depth,
                depth_test,
                blend,
                programs,
                vertex_arrays,
                buffers,
                textures,
                current_program,
                bound_vertex_array,
                texture_units,
                ..
            } = s;

            let Some(program) = current_program.and_then(|id| programs.get(&id)) else {
                tracing::debug!("draw_arrays without a current program");
                return;
            };
            let Some(vao) = bound_vertex_array.and_then(|id| vertex_arrays.get(&id)) else {
                tracing::debug!("draw_arrays without a bound vertex array");
                return;
            };
            let vertices = gather_vertices(vao, buffers, first, count);

            let mut units = [None; MAX_TEXTURE_UNITS];
            for (slot, bound) in units.iter_mut().zip(texture_units.iter()) {
                *slot = bound.and_then(|id| textures.get(&id));
            }
            let samplers = Samplers::new(units);

            draw_triangles(
                RasterTarget {
                    width: canvas.width,
                    height: canvas.height,
                    color,
                    depth,
                    depth_test: *depth_test,
                    blend: *blend,
                    parallel: opts.parallel,
                },
                &vertices,
                program.shader.as_ref(),
                &program.uniforms,
                &samplers,
            );
        });
    }

    /// Flush queued work. Rendering is immediate, so this only marks the call.
    pub fn flush(&self) {
        self.with_live(|_| ());
    }

    /// Ask the host for another frame callback. Returns `None` when disposed.
    pub fn request_frame(&self) -> Option<FrameRequestId> {
        self.with_live(|s| {
            let id = FrameRequestId(s.next_frame);
            s.next_frame = s.next_frame.wrapping_add(1);
            s.pending_frame = Some(id);
            id
        })
    }

    /// Cancel a frame request if it is still pending.
    pub fn cancel_frame(&self, id: FrameRequestId) {
        self.with_live(|s| {
            if s.pending_frame == Some(id) {
                s.pending_frame = None;
            }
        });
    }

    /// Host side: consume the pending frame request, if any.
    pub fn take_frame_request(&self) -> Option<FrameRequestId> {
        self.state.borrow_mut().pending_frame.take()
    }

    /// Whether a frame callback is pending.
    pub fn has_pending_frame(&self) -> bool {
        self.state.borrow().pending_frame.is_some()
    }

    /// Copy the framebuffer out.
    pub fn read_pixels(&self) -> FrameRGBA {
        let s = self.state.borrow();
        FrameRGBA {
            width: s.canvas.width,
            height: s.canvas.height,
            data: s.color.clone(),
            premultiplied: true,
        }
    }

    pub(crate) fn delete_program(&self, id: ProgramId) {
        self.with_live(|s| {
            s.programs.remove(&id);
            if s.current_program == Some(id) {
                s.current_program = None;
            }
        });
    }

    pub(crate) fn delete_vertex_array(&self, id: VertexArrayId) {
        self.with_live(|s| {
            s.vertex_arrays.remove(&id);
            if s.bound_vertex_array == Some(id) {
                s.bound_vertex_array = None;
            }
        });
    }

    pub(crate) fn delete_buffer(&self, id: BufferId) {
        self.with_live(|s| {
            s.buffers.remove(&id);
            if s.bound_buffer == Some(id) {
                s.bound_buffer = None;
            }
        });
    }

    pub(crate) fn delete_texture(&self, id: TextureId) {
        self.with_live(|s| {
            s.textures.remove(&id);
            for unit in s.texture_units.iter_mut() {
                if *unit == Some(id) {
                    *unit = None;
                }
            }
        });
    }
}

fn gather_vertices(
    vao: &HashMap<Attribute, AttribBinding>,
    buffers: &HashMap<BufferId, Vec<f32>>,
    first: usize,
    count: usize,
) -> Vec<Vertex> {
    let read = |attr: Attribute, index: usize, out: &mut [f64]| -> bool {
        let Some(binding) = vao.get(&attr) else {
            return false;
        };
        let Some(data) = buffers.get(&binding.buffer) else {
            return false;
        };
        let base = binding.offset + index * binding.stride;
        let Some(src) = data.get(base..base + binding.components) else {
            return false;
        };
        for (o, &v) in out.iter_mut().zip(src) {
            *o = f64::from(v);
        }
        true
    };

    let mut out = Vec::with_capacity(count);
    for index in first..first.saturating_add(count) {
        let mut pos = [0.0f64; 3];
        if !read(Attribute::Position, index, &mut pos) {
            break;
        }
        let mut uv = [0.0f64; 2];
        read(Attribute::TexCoord, index, &mut uv);
        out.push(Vertex {
            position: pos,
            uv: Point::new(uv[0], uv[1]),
        });
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/context.rs"]
mod tests;
