//! Triangle rasterizer behind [`RenderContext::draw_arrays`](crate::gpu::context::RenderContext::draw_arrays).
//!
//! Vertices are transformed by the program's `transform` uniform, optionally perspective divided,
//! and rasterized with perspective-correct texture coordinates. Rows are shaded in parallel.

use rayon::prelude::*;

use crate::foundation::core::Point;
use crate::foundation::math::unit_f32_to_u8;
use crate::gpu::shader::{Fragment, FragmentShader, Samplers, Uniforms};

/// Distance of the eye from the `z = 0` slide plane, in model units.
///
/// With the slide spanning `[-1, 1]` this is `1 / tan(22.5°)`, a 45° vertical field of view.
pub(crate) const EYE_DISTANCE: f64 = 2.414_213_562_373_095;

/// A vertex as stored in the bound buffers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Vertex {
    pub(crate) position: [f64; 3],
    pub(crate) uv: Point,
}

#[derive(Clone, Copy, Debug)]
struct ScreenVertex {
    x: f64,
    y: f64,
    inv_w: f64,
    z_over_w: f64,
    u_over_w: f64,
    v_over_w: f64,
}

pub(crate) struct RasterTarget<'a> {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) color: &'a mut [u8],
    pub(crate) depth: &'a mut [f32],
    pub(crate) depth_test: bool,
    pub(crate) blend: bool,
    pub(crate) parallel: bool,
}

fn to_screen(v: &Vertex, uniforms: &Uniforms, width: u32, height: u32) -> Option<ScreenVertex> {
    let p = uniforms
        .transform
        .transform_point([v.position[0], v.position[1], v.position[2], 1.0]);
    let w = if uniforms.perspective {
        (EYE_DISTANCE - p[2]) / EYE_DISTANCE
    } else {
        1.0
    };
    if w <= 1e-6 {
        return None;
    }
    let inv_w = 1.0 / w;
    let ndc_x = p[0] * inv_w;
    let ndc_y = p[1] * inv_w;
    Some(ScreenVertex {
        x: (ndc_x + 1.0) * 0.5 * f64::from(width),
        y: (1.0 - ndc_y) * 0.5 * f64::from(height),
        inv_w,
        z_over_w: p[2] * inv_w,
        u_over_w: v.uv.x * inv_w,
        v_over_w: v.uv.y * inv_w,
    })
}

fn edge(a: &ScreenVertex, b: &ScreenVertex, px: f64, py: f64) -> f64 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

fn write_pixel(dst: &mut [u8], src: [f32; 4], blend: bool) {
    if blend {
        let inv = 1.0 - src[3].clamp(0.0, 1.0);
        for i in 0..4 {
            let d = f32::from(dst[i]) / 255.0;
            dst[i] = unit_f32_to_u8(src[i] + d * inv);
        }
    } else {
        for i in 0..4 {
            dst[i] = unit_f32_to_u8(src[i]);
        }
    }
}

/// Rasterize a triangle list. Incomplete trailing triangles are ignored.
pub(crate) fn draw_triangles(
    target: RasterTarget<'_>,
    vertices: &[Vertex],
    shader: &dyn FragmentShader,
    uniforms: &Uniforms,
    samplers: &Samplers<'_>,
) {
    let RasterTarget {
        width,
        height,
        color,
        depth,
        depth_test,
        blend,
        parallel,
    } = target;
    if width == 0 || height == 0 {
        return;
    }

    for tri in vertices.chunks_exact(3) {
        let projected: Option<Vec<ScreenVertex>> = tri
            .iter()
            .map(|v| to_screen(v, uniforms, width, height))
            .collect();
        let Some(sv) = projected else {
            continue;
        };
        let (a, b, c) = (sv[0], sv[1], sv[2]);
        let area = edge(&a, &b, c.x, c.y);
        if area.abs() < 1e-12 {
            continue;
        }

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
        let max_x = (a.x.max(b.x).max(c.x).ceil().min(f64::from(width))) as u32;
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
        let max_y = (a.y.max(b.y).max(c.y).ceil().min(f64::from(height))) as u32;
        if min_x >= max_x || min_y >= max_y {
            continue;
        }

        let row_bytes = width as usize * 4;
        let rows = min_y as usize..max_y as usize;
        let color_rows = &mut color[rows.start * row_bytes..rows.end * row_bytes];
        let depth_rows = &mut depth[rows.start * width as usize..rows.end * width as usize];

        let shade_row = |(ri, (crow, drow)): (usize, (&mut [u8], &mut [f32]))| {
            let py = (rows.start + ri) as f64 + 0.5;
            for x in min_x..max_x {
                let px = f64::from(x) + 0.5;
                let w0 = edge(&b, &c, px, py) / area;
                let w1 = edge(&c, &a, px, py) / area;
                let w2 = edge(&a, &b, px, py) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let inv_w = w0 * a.inv_w + w1 * b.inv_w + w2 * c.inv_w;
                if inv_w <= 0.0 {
                    continue;
                }
                let z = (w0 * a.z_over_w + w1 * b.z_over_w + w2 * c.z_over_w) / inv_w;
                let xi = x as usize;
                if depth_test {
                    if (z as f32) < drow[xi] {
                        continue;
                    }
                    drow[xi] = z as f32;
                }
                let uv = Point::new(
                    (w0 * a.u_over_w + w1 * b.u_over_w + w2 * c.u_over_w) / inv_w,
                    (w0 * a.v_over_w + w1 * b.v_over_w + w2 * c.v_over_w) / inv_w,
                );
                let out = shader.shade(&Fragment {
                    uv,
                    uniforms,
                    samplers,
                });
                write_pixel(&mut crow[xi * 4..xi * 4 + 4], out, blend);
            }
        };

        if parallel {
            color_rows
                .par_chunks_mut(row_bytes)
                .zip(depth_rows.par_chunks_mut(width as usize))
                .enumerate()
                .for_each(shade_row);
        } else {
            color_rows
                .chunks_mut(row_bytes)
                .zip(depth_rows.chunks_mut(width as usize))
                .enumerate()
                .for_each(shade_row);
        }
    }
}

/// Two triangles covering the whole viewport, `uv = (0, 0)` at the top-left.
pub(crate) fn fullscreen_quad() -> [f32; 30] {
    // x, y, z, u, v
    [
        -1.0, 1.0, 0.0, 0.0, 0.0, //
        -1.0, -1.0, 0.0, 0.0, 1.0, //
        1.0, 1.0, 0.0, 1.0, 0.0, //
        1.0, 1.0, 0.0, 1.0, 0.0, //
        -1.0, -1.0, 0.0, 0.0, 1.0, //
        1.0, -1.0, 0.0, 1.0, 1.0, //
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/raster.rs"]
mod tests;
