use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TOP_WIDTH: i32 = 60;
pub const DEFAULT_TOP_HEIGHT: i32 = 20;
pub const DEFAULT_WIDTH: i32 = 100;
pub const DEFAULT_HEIGHT: i32 = 80;
pub const NAME_GAP: i32 = 3;
pub const XGAP: i32 = 5;
pub const YGAP: i32 = 5;

pub const DEFAULT_CLASS_WIDTH: i32 = 100;
pub const DEFAULT_CLASS_HEIGHT: i32 = 60;

/// Sizing parameters of package nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageLayoutConfig {
    /// Minimum header tab width.
    pub default_top_width: i32,
    /// Minimum header tab height.
    pub default_top_height: i32,
    /// Minimum overall width.
    pub default_width: i32,
    /// Minimum overall height, header included.
    pub default_height: i32,
    /// Horizontal padding around the label inside the header.
    pub name_gap: i32,
    /// Margin between the children and the left/right edges.
    pub x_gap: i32,
    /// Margin between the children and the body's top/bottom edges.
    pub y_gap: i32,
}

impl Default for PackageLayoutConfig {
    fn default() -> Self {
        Self {
            default_top_width: DEFAULT_TOP_WIDTH,
            default_top_height: DEFAULT_TOP_HEIGHT,
            default_width: DEFAULT_WIDTH,
            default_height: DEFAULT_HEIGHT,
            name_gap: NAME_GAP,
            x_gap: XGAP,
            y_gap: YGAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassLayoutConfig {
    pub default_width: i32,
    pub default_height: i32,
    pub padding_x: i32,
    pub padding_y: i32,
}

impl Default for ClassLayoutConfig {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_CLASS_WIDTH,
            default_height: DEFAULT_CLASS_HEIGHT,
            padding_x: 6,
            padding_y: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub label_line_height: f32,
    /// Use the calibrated character table instead of loading a system font.
    pub fast_text_metrics: bool,
    pub package: PackageLayoutConfig,
    pub class: ClassLayoutConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            label_line_height: 1.25,
            fast_text_metrics: true,
            package: PackageLayoutConfig::default(),
            class: ClassLayoutConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            padding: 8.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    primary_color: Option<String>,
    primary_text_color: Option<String>,
    primary_border_color: Option<String>,
    secondary_color: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageConfigFile {
    default_top_width: Option<i32>,
    default_top_height: Option<i32>,
    default_width: Option<i32>,
    default_height: Option<i32>,
    name_gap: Option<i32>,
    x_gap: Option<i32>,
    y_gap: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassConfigFile {
    default_width: Option<i32>,
    default_height: Option<i32>,
    padding_x: Option<i32>,
    padding_y: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    label_line_height: Option<f32>,
    fast_text_metrics: Option<bool>,
    package: Option<PackageConfigFile>,
    class: Option<ClassConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Applies a JSON document of optional overrides on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => log::warn!("unknown theme {other:?}, keeping the default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.primary_color {
            config.theme.primary_color = v;
        }
        if let Some(v) = vars.primary_text_color {
            config.theme.primary_text_color = v;
        }
        if let Some(v) = vars.primary_border_color {
            config.theme.primary_border_color = v;
        }
        if let Some(v) = vars.secondary_color {
            config.theme.secondary_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(v) = parsed.label_line_height {
        config.layout.label_line_height = v;
    }
    if let Some(v) = parsed.fast_text_metrics {
        config.layout.fast_text_metrics = v;
    }

    if let Some(package) = parsed.package {
        if let Some(v) = package.default_top_width {
            config.layout.package.default_top_width = v;
        }
        if let Some(v) = package.default_top_height {
            config.layout.package.default_top_height = v;
        }
        if let Some(v) = package.default_width {
            config.layout.package.default_width = v;
        }
        if let Some(v) = package.default_height {
            config.layout.package.default_height = v;
        }
        if let Some(v) = package.name_gap {
            config.layout.package.name_gap = v;
        }
        if let Some(v) = package.x_gap {
            config.layout.package.x_gap = v;
        }
        if let Some(v) = package.y_gap {
            config.layout.package.y_gap = v;
        }
    }

    if let Some(class) = parsed.class {
        if let Some(v) = class.default_width {
            config.layout.class.default_width = v;
        }
        if let Some(v) = class.default_height {
            config.layout.class.default_height = v;
        }
        if let Some(v) = class.padding_x {
            config.layout.class.padding_x = v;
        }
        if let Some(v) = class.padding_y {
            config.layout.class.padding_y = v;
        }
    }

    config.render.background = config.theme.background.clone();

    Ok(config)
}
