use serde::{Deserialize, Serialize};

use crate::geom::{Rect, Size};
use crate::text_metrics::{Font, TextMeasure, split_lines};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Justification {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Small,
    #[default]
    Normal,
    Large,
}

impl TextSize {
    pub fn scale(self) -> f32 {
        match self {
            TextSize::Small => 0.85,
            TextSize::Normal => 1.0,
            TextSize::Large => 1.2,
        }
    }
}

/// Block of text lines drawn inside a node compartment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MultiLineText {
    pub text: String,
    pub justification: Justification,
    pub size: TextSize,
    pub underlined: bool,
}

impl MultiLineText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    pub fn with_size(mut self, size: TextSize) -> Self {
        self.size = size;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn lines(&self) -> Vec<&str> {
        if self.text.is_empty() {
            Vec::new()
        } else {
            split_lines(&self.text)
        }
    }

    pub fn font(&self, base: &Font) -> Font {
        base.scaled(self.size.scale())
    }

    pub fn preferred_size(&self, measure: &dyn TextMeasure, base: &Font) -> Size {
        measure.measure(&self.text, &self.font(base))
    }

    /// SVG `<text>` element laying the lines out inside `region`, vertically centred.
    pub fn render_into(&self, region: &Rect, base: &Font, fill: &str, padding: i32) -> String {
        let lines = self.lines();
        if lines.is_empty() {
            return String::new();
        }
        let font = self.font(base);
        let line_step = font.size * font.line_height;
        let total_height = lines.len() as f32 * line_step;
        let top = region.y as f32 + (region.height as f32 - total_height) / 2.0;
        // baseline sits roughly one font size below the top of each line box
        let first_baseline = top + (line_step - font.size) / 2.0 + font.size * 0.85;
        let (x, anchor) = match self.justification {
            Justification::Left => ((region.x + padding) as f32, "start"),
            Justification::Center => (region.x as f32 + region.width as f32 / 2.0, "middle"),
            Justification::Right => ((region.max_x() - padding) as f32, "end"),
        };
        let decoration = if self.underlined {
            " text-decoration=\"underline\""
        } else {
            ""
        };

        let mut out = format!(
            "<text x=\"{x:.2}\" y=\"{first_baseline:.2}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{:.2}\" fill=\"{fill}\"{decoration}>",
            escape_xml(&font.family),
            font.size,
        );
        for (idx, line) in lines.iter().enumerate() {
            let dy = if idx == 0 { 0.0 } else { line_step };
            out.push_str(&format!(
                "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
                escape_xml(line)
            ));
        }
        out.push_str("</text>");
        out
    }
}

impl From<&str> for MultiLineText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for MultiLineText {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
