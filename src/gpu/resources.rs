//! Owning handles for context objects.
//!
//! Each handle has exactly one owner and deletes its object when dropped. Dropping a handle after
//! its context has been disposed is a no-op, so teardown order never matters for correctness.

use crate::gpu::context::RenderContext;

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident, $id:ident, $delete:ident) => {
        #[doc = concat!("Raw id of a [`", stringify!($name), "`].")]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $id(pub(crate) u32);

        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            ctx: RenderContext,
            id: $id,
        }

        impl $name {
            pub(crate) fn new(ctx: RenderContext, id: $id) -> Self {
                Self { ctx, id }
            }

            /// Raw id.
            pub fn id(&self) -> $id {
                self.id
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                self.ctx.$delete(self.id);
            }
        }
    };
}

gpu_handle!(
    /// A linked shader program.
    GpuProgram,
    ProgramId,
    delete_program
);
gpu_handle!(
    /// A vertex array object recording attribute bindings.
    GpuVertexArray,
    VertexArrayId,
    delete_vertex_array
);
gpu_handle!(
    /// A vertex buffer.
    GpuBuffer,
    BufferId,
    delete_buffer
);
gpu_handle!(
    /// A 2-D RGBA texture.
    GpuTexture,
    TextureId,
    delete_texture
);
