use crate::geom::Size;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use serde::{Deserialize, Serialize};
use ttf_parser::Face;

/// Font parameters handed to a [`TextMeasure`] on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f32,
    pub line_height: f32,
}

impl Font {
    pub fn scaled(&self, factor: f32) -> Font {
        Font {
            family: self.family.clone(),
            size: self.size * factor,
            line_height: self.line_height,
        }
    }
}

/// Text measurement service used by layout.
///
/// Implementations must not touch the diagram; everything they need arrives
/// through the arguments.
pub trait TextMeasure {
    /// Advance width of a single line in pixels.
    fn line_width(&self, line: &str, font: &Font) -> f32;

    /// Preferred size of possibly multi-line text. Empty text measures zero.
    fn measure(&self, text: &str, font: &Font) -> Size {
        if text.is_empty() || font.size <= 0.0 {
            return Size::ZERO;
        }
        let lines = split_lines(text);
        let width = lines
            .iter()
            .map(|line| self.line_width(line, font))
            .fold(0.0_f32, f32::max);
        let height = lines.len() as f32 * font.size * font.line_height;
        Size::new(width.ceil() as i32, height.ceil() as i32)
    }
}

/// Deterministic measurement from calibrated per-character width factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastTextMeasure;

impl TextMeasure for FastTextMeasure {
    fn line_width(&self, line: &str, font: &Font) -> f32 {
        fallback_text_width(line, font.size)
    }
}

/// Measurement backed by a system font resolved once at construction.
///
/// Every request is measured with that face; `Font::family` only selects the
/// face when loading. Glyphs missing from the face fall back to the
/// calibrated factors.
pub struct FontTextMeasure {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
}

impl FontTextMeasure {
    pub fn load(font_family: &str) -> Option<Self> {
        let mut db = Database::new();
        db.load_system_fonts();
        Self::load_from(&db, font_family)
    }

    pub fn load_from(db: &Database, font_family: &str) -> Option<Self> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = db.query(&query)?;
        let loaded = db
            .with_face_data(id, |data, index| Self::from_bytes(data.to_vec(), index))
            .flatten();
        if loaded.is_none() {
            log::debug!("no usable face for font family {font_family:?}");
        }
        loaded
    }

    pub fn from_bytes(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        drop(face);
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
        })
    }
}

impl TextMeasure for FontTextMeasure {
    fn line_width(&self, line: &str, font: &Font) -> f32 {
        let scale = font.size / self.units_per_em as f32;
        let line = line.replace('\t', "    ");
        if line.is_ascii() {
            return line
                .bytes()
                .map(|byte| match self.ascii_advances[byte as usize] {
                    0 => char_width_factor(byte as char) * font.size,
                    advance => advance as f32 * scale,
                })
                .sum::<f32>()
                .max(0.0);
        }
        let Ok(face) = Face::parse(&self.data, self.index) else {
            return fallback_text_width(&line, font.size);
        };
        line.chars()
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(|advance| advance as f32 * scale)
                    .unwrap_or_else(|| char_width_factor(ch) * font.size)
            })
            .sum::<f32>()
            .max(0.0)
    }
}

/// Picks the measurer for a configuration: the calibrated table when `fast`
/// is set or no face for `font_family` can be loaded, the font otherwise.
pub fn measure_for(font_family: &str, fast: bool) -> Box<dyn TextMeasure> {
    if fast {
        return Box::new(FastTextMeasure);
    }
    match FontTextMeasure::load(font_family) {
        Some(measure) => Box::new(measure),
        None => {
            log::warn!("falling back to built-in text metrics for {font_family:?}");
            Box::new(FastTextMeasure)
        }
    }
}

pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').map(|line| line.trim_end_matches('\r')).collect()
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

pub(crate) fn char_width_factor(ch: char) -> f32 {
    // Relative advance widths of a common sans-serif stack at 1px.
    match ch {
        ' ' => 0.306,
        '\t' => 1.224,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font(size: f32) -> Font {
        Font {
            family: "sans-serif".to_string(),
            size,
            line_height: 1.25,
        }
    }

    #[test]
    fn empty_text_measures_zero() {
        assert_eq!(FastTextMeasure.measure("", &font(13.0)), Size::ZERO);
    }

    #[test]
    fn height_counts_lines() {
        let one = FastTextMeasure.measure("a", &font(16.0));
        let three = FastTextMeasure.measure("a\nb\nc", &font(16.0));
        assert_eq!(one.height, 20);
        assert_eq!(three.height, 60);
    }

    #[test]
    fn width_is_widest_line() {
        let wide = FastTextMeasure.measure("short\na much longer line", &font(16.0));
        let line = FastTextMeasure.measure("a much longer line", &font(16.0));
        assert_eq!(wide.width, line.width);
    }

    #[test]
    fn fallback_text_width_scales_with_font_size() {
        let w16 = fallback_text_width("Hello", 16.0);
        let w32 = fallback_text_width("Hello", 32.0);
        assert!((w32 - w16 * 2.0).abs() < 0.01, "width should double with font size");
    }

    #[test]
    fn char_width_factor_returns_positive_values() {
        for ch in ['a', 'Z', ' ', '0', '@', '\u{4e2d}'] {
            assert!(char_width_factor(ch) > 0.0, "char {:?} has zero width", ch);
        }
    }

    #[test]
    fn split_lines_keeps_blank_lines() {
        assert_eq!(split_lines("a\n\nb\r"), vec!["a", "", "b"]);
    }
}
