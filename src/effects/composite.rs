use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{SlideFxError, SlideFxResult};
use crate::foundation::math::mul_div255_u8;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Porter-Duff `src over dst` with an extra opacity applied to `src`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Blend `src` over `dst`, both tightly packed RGBA8 buffers of equal length.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> SlideFxResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SlideFxError::evaluation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Blend a whole bitmap over another of the same size.
pub fn over_frame(dst: &mut FrameRGBA, src: &FrameRGBA, opacity: f32) -> SlideFxResult<()> {
    if dst.canvas() != src.canvas() {
        return Err(SlideFxError::evaluation(format!(
            "cannot blend {}x{} over {}x{}",
            src.width, src.height, dst.width, dst.height
        )));
    }
    over_in_place(&mut dst.data, &src.data, opacity)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
