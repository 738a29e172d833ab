use super::*;
use crate::gpu::raster::fullscreen_quad;
use crate::gpu::shader::{Fragment, TexturedShader};

#[derive(Debug)]
struct TimeShader;

impl FragmentShader for TimeShader {
    fn shade(&self, frag: &Fragment<'_>) -> [f32; 4] {
        let t = frag.uniforms.time;
        [t, t, t, 1.0]
    }
}

fn ctx(w: u32, h: u32) -> RenderContext {
    RenderContext::new(Canvas::new(w, h).unwrap(), ContextOpts { parallel: false })
}

fn quad(ctx: &RenderContext) -> (GpuVertexArray, GpuBuffer) {
    let vao = ctx.create_vertex_array().unwrap();
    let buf = ctx.create_buffer().unwrap();
    ctx.buffer_data(&buf, &fullscreen_quad());
    ctx.vertex_attrib_pointer(&vao, Attribute::Position, &buf, 3, 5, 0);
    ctx.vertex_attrib_pointer(&vao, Attribute::TexCoord, &buf, 2, 5, 3);
    (vao, buf)
}

#[test]
fn handles_release_on_drop() {
    let ctx = ctx(2, 2);
    {
        let _p = ctx.create_program(Arc::new(TimeShader)).unwrap();
        let _q = quad(&ctx);
        assert_eq!(
            ctx.live_objects(),
            LiveObjects {
                programs: 1,
                vertex_arrays: 1,
                buffers: 1,
                textures: 0
            }
        );
    }
    assert_eq!(ctx.live_objects().total(), 0);
}

#[test]
fn draw_uses_current_program_uniforms() {
    let ctx = ctx(3, 2);
    let program = ctx.create_program(Arc::new(TimeShader)).unwrap();
    let (vao, _buf) = quad(&ctx);
    ctx.use_program(Some(&program));
    ctx.uniform(Uniform::Time(1.0));
    ctx.bind_vertex_array(Some(&vao));
    ctx.draw_arrays(0, 6);
    let frame = ctx.read_pixels();
    assert!(frame.data.iter().all(|&b| b == 255));
}

#[test]
fn textured_draw_copies_texture() {
    let ctx = ctx(2, 2);
    let bitmap = FrameRGBA::from_data(
        2,
        2,
        vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ],
    )
    .unwrap();
    let tex = ctx.create_texture(&bitmap).unwrap();
    let program = ctx.create_program(Arc::new(TexturedShader)).unwrap();
    let (vao, _buf) = quad(&ctx);
    ctx.use_program(Some(&program));
    ctx.bind_vertex_array(Some(&vao));
    ctx.bind_texture(TextureUnit::Entering, Some(&tex));
    ctx.draw_arrays(0, 6);
    assert_eq!(ctx.read_pixels().data, bitmap.data);
}

#[test]
fn draw_without_program_is_inert() {
    let ctx = ctx(2, 2);
    ctx.clear_color([0.0, 0.0, 0.0, 0.0]);
    ctx.clear();
    let (vao, _buf) = quad(&ctx);
    ctx.bind_vertex_array(Some(&vao));
    ctx.draw_arrays(0, 6);
    assert!(ctx.read_pixels().data.iter().all(|&b| b == 0));
}

#[test]
fn disposed_context_ignores_calls_and_refuses_objects() {
    let ctx = ctx(2, 2);
    let program = ctx.create_program(Arc::new(TimeShader)).unwrap();
    ctx.dispose();
    ctx.dispose();
    assert!(ctx.is_disposed());
    assert_eq!(ctx.live_objects().total(), 0);

    let calls = ctx.call_count();
    ctx.use_program(Some(&program));
    ctx.clear();
    ctx.flush();
    drop(program);
    assert_eq!(ctx.call_count(), calls);
    assert!(ctx.create_buffer().is_err());
    assert!(ctx.request_frame().is_none());
}

#[test]
fn frame_requests_can_be_cancelled() {
    let ctx = ctx(1, 1);
    let a = ctx.request_frame().unwrap();
    assert!(ctx.has_pending_frame());
    ctx.cancel_frame(a);
    assert!(!ctx.has_pending_frame());

    let b = ctx.request_frame().unwrap();
    assert_ne!(a, b);
    assert_eq!(ctx.take_frame_request(), Some(b));
    assert_eq!(ctx.take_frame_request(), None);
}

#[test]
fn texture_upload_checks_length() {
    let ctx = ctx(1, 1);
    let bad = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 3],
        premultiplied: true,
    };
    assert!(ctx.create_texture(&bad).is_err());
}

#[test]
fn deleting_a_bound_texture_unbinds_it() {
    let ctx = ctx(1, 1);
    let tex = ctx
        .create_texture(&FrameRGBA::transparent(Canvas::new(1, 1).unwrap()))
        .unwrap();
    ctx.bind_texture(TextureUnit::Leaving, Some(&tex));
    drop(tex);
    assert_eq!(ctx.live_objects().textures, 0);
}
