/// Headroom applied to the slide size before a tier is picked.
pub const RESOLUTION_HEADROOM: f64 = 1.2;

/// Resolution tiers, largest first. A slide whose scaled size exceeds a tier's
/// successor in either dimension gets that tier.
const TIERS: [[u32; 2]; 4] = [[3840, 2160], [2560, 1440], [1920, 1080], [1280, 720]];

/// Tier used when the slide fits inside every threshold.
const BASE_TIER: [u32; 2] = [960, 540];

/// Pick the rendering resolution tier for a slide of `width × height`.
pub fn compute_layer_resolution(width: u32, height: u32) -> [u32; 2] {
    let w = f64::from(width) * RESOLUTION_HEADROOM;
    let h = f64::from(height) * RESOLUTION_HEADROOM;
    TIERS
        .iter()
        .find(|&&[tw, th]| w > f64::from(tw) || h > f64::from(th))
        .copied()
        .unwrap_or(BASE_TIER)
}

/// Size of the layer bitmap for a slide: its tier, shrunk along one axis to the slide's aspect
/// ratio. Never exceeds the tier.
pub fn compute_layer_size(slide_width: u32, slide_height: u32) -> [u32; 2] {
    let [width, height] = compute_layer_resolution(slide_width, slide_height);
    if slide_width == 0 || slide_height == 0 {
        tracing::debug!(slide_width, slide_height, "degenerate slide size, using the tier");
        return [width, height];
    }

    let (sw, sh) = (f64::from(slide_width), f64::from(slide_height));
    let slide_ratio = sw / sh;
    let resolution_ratio = f64::from(width) / f64::from(height);

    if slide_ratio > resolution_ratio {
        let h = (f64::from(width) * sh / sw).trunc() as u32;
        [width, h.max(1)]
    } else if slide_ratio < resolution_ratio {
        let w = (f64::from(height) * sw / sh).trunc() as u32;
        [w.max(1), height]
    } else {
        [width, height]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compositor/sizing.rs"]
mod tests;
