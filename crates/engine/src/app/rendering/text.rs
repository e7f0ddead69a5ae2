//! Built-in 3x5 bitmap glyphs for HUD and debug text.
//!
//! Each glyph packs its five rows into one `u16`, three bits per row, top
//! row in the highest bits. Lowercase letters fold to uppercase; characters
//! outside the set render as blanks.

use crate::app::entity::Rgba;

use super::draw::write_pixel;

pub const GLYPH_WIDTH: i32 = 3;
pub const GLYPH_HEIGHT: i32 = 5;

/// Horizontal pen advance per character at the given scale.
pub fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale
}

/// Vertical advance between text lines at the given scale.
pub fn line_advance(scale: i32) -> i32 {
    (GLYPH_HEIGHT + 2) * scale
}

/// Pixel width of a rendered string at the given scale.
pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * glyph_advance(scale)
}

pub fn draw_text(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    text: &str,
    color: Rgba,
    scale: i32,
) {
    let scale = scale.max(1);
    let mut pen_x = x;
    for ch in text.chars() {
        draw_glyph(frame, width, height, pen_x, y, glyph_rows(ch), color, scale);
        pen_x += glyph_advance(scale);
    }
}

/// Text with a one-glyph-thick plus-shaped shadow around it, the way the
/// original framework draws its outlined strings.
#[allow(clippy::too_many_arguments)]
pub fn draw_outlined_text(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    text: &str,
    foreground: Rgba,
    shadow: Rgba,
    thickness: i32,
    scale: i32,
) {
    for offset in -thickness..=thickness {
        if offset == 0 {
            continue;
        }
        draw_text(frame, width, height, x + offset, y, text, shadow, scale);
        draw_text(frame, width, height, x, y + offset, text, shadow, scale);
    }
    draw_text(frame, width, height, x, y, text, foreground, scale);
}

fn draw_glyph(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rows: u16,
    color: Rgba,
    scale: i32,
) {
    if rows == 0 {
        return;
    }
    for row in 0..GLYPH_HEIGHT {
        let bits = (rows >> ((GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH)) & 0b111;
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            for sy in 0..scale {
                let py = y + row * scale + sy;
                if py < 0 || py >= height as i32 {
                    continue;
                }
                for sx in 0..scale {
                    write_pixel(frame, width, x + col * scale + sx, py, color);
                }
            }
        }
    }
}

/// Packed rows for one character; `0` means "no glyph, draw nothing".
pub(crate) fn glyph_rows(ch: char) -> u16 {
    match ch.to_ascii_uppercase() {
        'A' => 0b010_101_111_101_101,
        'B' => 0b110_101_110_101_110,
        'C' => 0b011_100_100_100_011,
        'D' => 0b110_101_101_101_110,
        'E' => 0b111_100_110_100_111,
        'F' => 0b111_100_110_100_100,
        'G' => 0b011_100_101_101_011,
        'H' => 0b101_101_111_101_101,
        'I' => 0b111_010_010_010_111,
        'J' => 0b001_001_001_101_010,
        'K' => 0b101_101_110_101_101,
        'L' => 0b100_100_100_100_111,
        'M' => 0b101_111_111_101_101,
        'N' => 0b101_111_111_111_101,
        'O' => 0b010_101_101_101_010,
        'P' => 0b110_101_110_100_100,
        'Q' => 0b010_101_101_011_001,
        'R' => 0b110_101_110_101_101,
        'S' => 0b011_100_010_001_110,
        'T' => 0b111_010_010_010_010,
        'U' => 0b101_101_101_101_011,
        'V' => 0b101_101_101_010_010,
        'W' => 0b101_101_111_111_101,
        'X' => 0b101_010_010_010_101,
        'Y' => 0b101_101_010_010_010,
        'Z' => 0b111_001_010_100_111,
        '0' => 0b010_101_101_101_010,
        '1' => 0b010_110_010_010_111,
        '2' => 0b110_001_010_100_111,
        '3' => 0b110_001_010_001_110,
        '4' => 0b101_101_111_001_001,
        '5' => 0b111_100_110_001_110,
        '6' => 0b011_100_110_101_010,
        '7' => 0b111_001_010_010_010,
        '8' => 0b010_101_010_101_010,
        '9' => 0b010_101_011_001_110,
        ':' => 0b000_010_000_010_000,
        '|' => 0b010_010_010_010_010,
        '.' => 0b000_000_000_000_010,
        ',' => 0b000_000_000_010_100,
        '-' => 0b000_000_111_000_000,
        '+' => 0b000_010_111_010_000,
        '/' => 0b001_001_010_100_100,
        '(' => 0b001_010_010_010_001,
        ')' => 0b100_010_010_010_100,
        '!' => 0b010_010_010_000_010,
        '?' => 0b110_001_010_000_010,
        '%' => 0b101_001_010_100_101,
        '=' => 0b000_111_000_111_000,
        '_' => 0b000_000_000_000_111,
        '<' => 0b001_010_100_010_001,
        '>' => 0b100_010_001_010_100,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUD_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789:|.,-/()";

    #[test]
    fn hud_charset_is_fully_covered() {
        for ch in HUD_CHARSET.chars() {
            assert_ne!(glyph_rows(ch), 0, "missing glyph for '{ch}'");
        }
    }

    #[test]
    fn lowercase_folds_to_uppercase() {
        for ch in 'a'..='z' {
            assert_eq!(glyph_rows(ch), glyph_rows(ch.to_ascii_uppercase()));
        }
    }

    #[test]
    fn unknown_characters_are_blank() {
        assert_eq!(glyph_rows('\u{7f}'), 0);
        assert_eq!(glyph_rows('é'), 0);

        let mut frame = vec![0u8; 16 * 16 * 4];
        draw_text(&mut frame, 16, 16, 0, 0, "\u{1f600}", [255; 4], 1);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn text_width_counts_characters() {
        assert_eq!(text_width("", 1), 0);
        assert_eq!(text_width("FPS", 1), 3 * glyph_advance(1));
        assert_eq!(text_width("FPS", 2), 3 * glyph_advance(2));
    }

    #[test]
    fn drawing_writes_the_text_color() {
        let mut frame = vec![0u8; 8 * 8 * 4];
        draw_text(&mut frame, 8, 8, 0, 0, "I", [1, 2, 3, 255], 1);
        let lit = frame
            .chunks_exact(4)
            .filter(|px| *px == [1, 2, 3, 255])
            .count();
        // 'I': two rows of three plus three single-pixel rows.
        assert_eq!(lit, 9);
    }

    #[test]
    fn scaled_glyphs_cover_scale_squared_pixels() {
        let mut small = vec![0u8; 32 * 32 * 4];
        let mut large = vec![0u8; 32 * 32 * 4];
        draw_text(&mut small, 32, 32, 0, 0, ".", [255; 4], 1);
        draw_text(&mut large, 32, 32, 0, 0, ".", [255; 4], 3);
        let count = |frame: &[u8]| {
            frame
                .chunks_exact(4)
                .filter(|px| *px == [255, 255, 255, 255])
                .count()
        };
        assert_eq!(count(&small), 1);
        assert_eq!(count(&large), 9);
    }

    #[test]
    fn out_of_bounds_text_is_clipped_safely() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        draw_text(&mut frame, 4, 4, -10, -10, "PAUSE", [255; 4], 1);
        draw_text(&mut frame, 4, 4, 100, 100, "PAUSE", [255; 4], 1);
        assert_eq!(frame.len(), 4 * 4 * 4);
    }

    #[test]
    fn outlined_text_surrounds_glyph_pixels_with_shadow() {
        let mut frame = vec![0u8; 16 * 16 * 4];
        draw_outlined_text(&mut frame, 16, 16, 2, 2, "I", [255, 255, 255, 255], [9, 9, 9, 255], 1, 1);
        let has_shadow = frame.chunks_exact(4).any(|px| *px == [9, 9, 9, 255]);
        let has_fg = frame.chunks_exact(4).any(|px| *px == [255, 255, 255, 255]);
        assert!(has_shadow);
        assert!(has_fg);
    }
}
