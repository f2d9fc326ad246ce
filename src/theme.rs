use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::text_metrics::Font;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    /// Package fill.
    pub primary_color: String,
    pub primary_text_color: String,
    pub primary_border_color: String,
    /// Class fill.
    pub secondary_color: String,
    pub line_color: String,
    pub background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Dialog, Arial, sans-serif".to_string(),
            font_size: 12.0,
            primary_color: "#FFFFFF".to_string(),
            primary_text_color: "#000000".to_string(),
            primary_border_color: "#000000".to_string(),
            secondary_color: "#FFFFE0".to_string(),
            line_color: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            primary_color: "#F8FAFF".to_string(),
            primary_text_color: "#1C2430".to_string(),
            primary_border_color: "#7A8AA6".to_string(),
            secondary_color: "#EEF2F8".to_string(),
            line_color: "#7A8AA6".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    /// Font used to measure and draw labels.
    pub fn font(&self, config: &LayoutConfig) -> Font {
        Font {
            family: self.font_family.clone(),
            size: self.font_size,
            line_height: config.label_line_height,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
