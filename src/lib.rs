#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagram;
pub mod document;
pub mod geom;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod text;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig};
pub use diagram::{
    CanBeContained, ClassNode, Diagram, HasChildren, Node, NodeId, NodeKind, PackageGeometry,
    PackageNode,
};
pub use document::{Document, DocumentError};
pub use geom::{Direction, Point, Rect, Size};
pub use render::render_svg;
pub use text::MultiLineText;
pub use text_metrics::{FastTextMeasure, Font, FontTextMeasure, TextMeasure};
pub use theme::Theme;

/// Builds, lays out and renders a JSON node document to SVG.
pub fn render_document(input: &str, config: &Config) -> anyhow::Result<String> {
    let document = Document::from_json(input)?;
    let (mut diagram, _) = document.build()?;
    let measure = text_metrics::measure_for(&config.theme.font_family, config.layout.fast_text_metrics);
    layout::layout_all(&mut diagram, measure.as_ref(), &config.theme, &config.layout);
    Ok(render_svg(&diagram, &config.theme, &config.layout, &config.render))
}
