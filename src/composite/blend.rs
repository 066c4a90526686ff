use crate::foundation::math::mul_div255;

/// Straight-alpha RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Source-over for straight (non-premultiplied) alpha.
///
/// Opaque sources replace the destination, fully transparent sources leave it untouched, and
/// partial alpha blends.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = u16::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255 - sa;
    let da_scaled = mul_div255(u16::from(dst[3]), inv);
    let out_a = sa + da_scaled;
    if out_a == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    out[3] = out_a.min(255) as u8;
    for i in 0..3 {
        let num = u32::from(src[i]) * u32::from(sa) + u32::from(dst[i]) * u32::from(da_scaled);
        let v = (num + u32::from(out_a) / 2) / u32::from(out_a);
        out[i] = v.min(255) as u8;
    }
    out
}

/// Flatten a straight-alpha pixel over an opaque background.
pub fn flatten(px: Rgba8, bg: Rgba8) -> Rgba8 {
    let a = u16::from(px[3]);
    let inv = 255 - a;
    let mut out = [0u8, 0, 0, 255];
    for i in 0..3 {
        out[i] = (mul_div255(u16::from(px[i]), a) + mul_div255(u16::from(bg[i]), inv)).min(255)
            as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/composite/blend.rs"]
mod tests;
