//! Pixel-level drawing primitives over an RGBA frame buffer.

use crate::app::entity::Rgba;

pub(crate) fn write_pixel(frame: &mut [u8], width: u32, x: i32, y: i32, color: Rgba) {
    if x < 0 || y < 0 || x >= width as i32 {
        return;
    }
    let offset = (y as usize * width as usize + x as usize) * 4;
    if let Some(pixel) = frame.get_mut(offset..offset + 4) {
        pixel.copy_from_slice(&color);
    }
}

/// Source-over blend; opaque colors take the fast path.
pub(crate) fn blend_pixel(frame: &mut [u8], width: u32, x: i32, y: i32, color: Rgba) {
    if color[3] == 255 {
        write_pixel(frame, width, x, y, color);
        return;
    }
    if color[3] == 0 || x < 0 || y < 0 || x >= width as i32 {
        return;
    }
    let offset = (y as usize * width as usize + x as usize) * 4;
    let Some(pixel) = frame.get_mut(offset..offset + 4) else {
        return;
    };
    let alpha = color[3] as u32;
    let inverse = 255 - alpha;
    for channel in 0..3 {
        let blended = (color[channel] as u32 * alpha + pixel[channel] as u32 * inverse) / 255;
        pixel[channel] = blended as u8;
    }
    pixel[3] = 255;
}

pub(crate) fn fill_rect(frame: &mut [u8], width: u32, height: u32, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(width as i32);
    let y1 = (y + h).min(height as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            blend_pixel(frame, width, px, py, color);
        }
    }
}

pub(crate) fn rect_outline(frame: &mut [u8], width: u32, height: u32, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
    if w <= 0 || h <= 0 {
        return;
    }
    fill_rect(frame, width, height, x, y, w, 1, color);
    fill_rect(frame, width, height, x, y + h - 1, w, 1, color);
    fill_rect(frame, width, height, x, y, 1, h, color);
    fill_rect(frame, width, height, x + w - 1, y, 1, h, color);
}

/// Filled axis-aligned ellipse inscribed in the given box.
pub(crate) fn fill_ellipse(frame: &mut [u8], width: u32, height: u32, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
    if w <= 0 || h <= 0 {
        return;
    }
    let rx = w as f32 / 2.0;
    let ry = h as f32 / 2.0;
    let cx = x as f32 + rx;
    let cy = y as f32 + ry;
    for py in y.max(0)..(y + h).min(height as i32) {
        for px in x.max(0)..(x + w).min(width as i32) {
            let nx = (px as f32 + 0.5 - cx) / rx;
            let ny = (py as f32 + 0.5 - cy) / ry;
            if nx * nx + ny * ny <= 1.0 {
                blend_pixel(frame, width, px, py, color);
            }
        }
    }
}

/// One-pixel ellipse outline inscribed in the given box.
pub(crate) fn ellipse_outline(frame: &mut [u8], width: u32, height: u32, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
    if w <= 0 || h <= 0 {
        return;
    }
    let rx = w as f32 / 2.0;
    let ry = h as f32 / 2.0;
    let cx = x as f32 + rx;
    let cy = y as f32 + ry;
    let steps = (4 * (w + h)).max(16);
    for step in 0..steps {
        let theta = std::f32::consts::TAU * step as f32 / steps as f32;
        let px = (cx + (rx - 0.5) * theta.cos()) as i32;
        let py = (cy + (ry - 0.5) * theta.sin()) as i32;
        if py >= 0 && py < height as i32 {
            write_pixel(frame, width, px, py, color);
        }
    }
}

/// Nearest-neighbor alpha-blended blit of an RGBA source into a destination
/// box.
#[allow(clippy::too_many_arguments)]
pub(crate) fn blit_scaled(
    frame: &mut [u8],
    width: u32,
    height: u32,
    dest_x: i32,
    dest_y: i32,
    dest_w: i32,
    dest_h: i32,
    src: &[u8],
    src_w: u32,
    src_h: u32,
) {
    if dest_w <= 0 || dest_h <= 0 || src_w == 0 || src_h == 0 {
        return;
    }
    for dy in 0..dest_h {
        let py = dest_y + dy;
        if py < 0 || py >= height as i32 {
            continue;
        }
        let sy = (dy as u32 * src_h / dest_h as u32).min(src_h - 1);
        for dx in 0..dest_w {
            let px = dest_x + dx;
            if px < 0 || px >= width as i32 {
                continue;
            }
            let sx = (dx as u32 * src_w / dest_w as u32).min(src_w - 1);
            let offset = ((sy * src_w + sx) * 4) as usize;
            if let Some(texel) = src.get(offset..offset + 4) {
                blend_pixel(frame, width, px, py, [texel[0], texel[1], texel[2], texel[3]]);
            }
        }
    }
}
