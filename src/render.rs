use crate::config::{LayoutConfig, RenderConfig};
use crate::diagram::{ClassNode, Diagram, Node, NodeId, PackageNode};
use crate::geom::Rect;
use crate::text::{Justification, MultiLineText, escape_xml};
use crate::text_metrics::Font;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Renders every root of a laid-out diagram. Nodes whose geometry is stale
/// are skipped.
pub fn render_svg(diagram: &Diagram, theme: &Theme, config: &LayoutConfig, render: &RenderConfig) -> String {
    let font = theme.font(config);
    let extent = diagram_extent(diagram).unwrap_or_default();
    let pad = render.padding;
    let min_x = extent.x as f32 - pad;
    let min_y = extent.y as f32 - pad;
    let width = extent.width as f32 + 2.0 * pad;
    let height = extent.height as f32 + 2.0 * pad;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"{min_x} {min_y} {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect x=\"{min_x}\" y=\"{min_y}\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render.background
    ));

    for root in diagram.roots() {
        render_subtree(&mut svg, diagram, *root, theme, config, &font);
    }

    svg.push_str("</svg>");
    svg
}

/// Union of the bounds of every laid-out root.
pub fn diagram_extent(diagram: &Diagram) -> Option<Rect> {
    Rect::union_all(
        diagram
            .roots()
            .iter()
            .filter_map(|root| diagram.node(*root).bounds()),
    )
}

fn render_subtree(
    svg: &mut String,
    diagram: &Diagram,
    id: NodeId,
    theme: &Theme,
    config: &LayoutConfig,
    font: &Font,
) {
    match diagram.node(id) {
        Node::Package(package) => {
            if !render_package(svg, package, theme, config, font) {
                log::warn!("skipping package {:?}: layout is stale", package.name());
                return;
            }
        }
        Node::Class(class) => {
            if !render_class(svg, class, theme, config, font) {
                log::warn!("skipping class {:?}: layout is stale", class.name());
                return;
            }
        }
    }
    // children are painted over their container
    for child in diagram.children(id) {
        render_subtree(svg, diagram, *child, theme, config, font);
    }
}

fn render_package(
    svg: &mut String,
    package: &PackageNode,
    theme: &Theme,
    config: &LayoutConfig,
    font: &Font,
) -> bool {
    let Some(geometry) = package.geometry() else {
        return false;
    };
    svg.push_str("<g class=\"package\">");
    push_rect(svg, &geometry.header, &theme.primary_color, &theme.primary_border_color);
    push_rect(svg, &geometry.body, &theme.primary_color, &theme.primary_border_color);

    if !package.name().is_empty() {
        let label = MultiLineText::new(package.name()).with_justification(Justification::Left);
        svg.push_str(&label.render_into(
            &geometry.header,
            font,
            &theme.primary_text_color,
            config.package.name_gap,
        ));
    }
    svg.push_str(&package.contents().render_into(
        &geometry.body,
        font,
        &theme.primary_text_color,
        config.package.name_gap,
    ));
    svg.push_str("</g>");
    true
}

fn render_class(
    svg: &mut String,
    class: &ClassNode,
    theme: &Theme,
    config: &LayoutConfig,
    font: &Font,
) -> bool {
    let Some(bounds) = class.bounds() else {
        return false;
    };
    let name_band = Rect::new(bounds.x, bounds.y, bounds.width, class.name_band());
    svg.push_str("<g class=\"class\">");
    push_rect(svg, &bounds, &theme.secondary_color, &theme.primary_border_color);
    svg.push_str(&MultiLineText::new(class.name()).render_into(
        &name_band,
        font,
        &theme.primary_text_color,
        config.class.padding_x,
    ));
    if !class.contents().is_empty() {
        let divider_y = name_band.max_y();
        svg.push_str(&format!(
            "<line x1=\"{}\" y1=\"{divider_y}\" x2=\"{}\" y2=\"{divider_y}\" stroke=\"{}\" stroke-width=\"1\"/>",
            bounds.x,
            bounds.max_x(),
            escape_xml(&theme.primary_border_color)
        ));
        let compartment = Rect::new(
            bounds.x,
            divider_y,
            bounds.width,
            bounds.max_y() - divider_y,
        );
        svg.push_str(&class.contents().render_into(
            &compartment,
            font,
            &theme.primary_text_color,
            config.class.padding_x,
        ));
    }
    svg.push_str("</g>");
    true
}

fn push_rect(svg: &mut String, rect: &Rect, fill: &str, stroke: &str) {
    svg.push_str(&format!(
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        escape_xml(fill),
        escape_xml(stroke)
    ));
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "sans-serif".to_string());
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{ClassNode, PackageNode};
    use crate::text_metrics::FastTextMeasure;

    fn sample() -> (Diagram, NodeId) {
        let mut diagram = Diagram::new();
        let package = diagram.add_package(
            PackageNode::named("model & view").with_contents(MultiLineText::new("notes")),
        );
        let class = diagram.add_class(
            ClassNode::named("Widget").with_contents(MultiLineText::new("+ draw()")),
        );
        diagram.add_child(package, class);
        (diagram, package)
    }

    #[test]
    fn render_svg_draws_both_regions_and_children() {
        let (mut diagram, package) = sample();
        let theme = Theme::classic();
        let config = LayoutConfig::default();
        diagram.layout(package, &FastTextMeasure, &theme, &config);
        let svg = render_svg(&diagram, &theme, &config, &RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("model &amp; view"));
        assert!(svg.contains("Widget"));
        assert!(svg.contains("<line"));

        let geometry = *diagram.package(package).unwrap().geometry().unwrap();
        for rect in [geometry.header, geometry.body] {
            let tag = format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
                rect.x, rect.y, rect.width, rect.height
            );
            assert!(svg.contains(&tag), "missing {tag}");
        }
    }

    #[test]
    fn stale_nodes_are_skipped() {
        let (diagram, _) = sample();
        let svg = render_svg(&diagram, &Theme::classic(), &LayoutConfig::default(), &RenderConfig::default());
        assert!(!svg.contains("class=\"package\""));
        assert!(!svg.contains("Widget"));
    }

    #[test]
    fn extent_covers_all_roots() {
        let mut diagram = Diagram::new();
        let a = diagram.add_package(PackageNode::new());
        let b = diagram.add_class(ClassNode::new().with_origin(crate::geom::Point::new(300, 0)));
        let theme = Theme::classic();
        let config = LayoutConfig::default();
        diagram.layout(a, &FastTextMeasure, &theme, &config);
        diagram.layout(b, &FastTextMeasure, &theme, &config);
        assert_eq!(diagram_extent(&diagram), Some(Rect::new(0, 0, 400, 80)));
    }
}
