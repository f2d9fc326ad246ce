//! Bottom-up layout of containment trees.
//!
//! Children are laid out before their container, which then grows to enclose
//! them plus its header and margins.

mod class;
mod connection;
mod package;

pub use connection::{connection_point, correct_connection_point, shape};

use crate::config::LayoutConfig;
use crate::diagram::{Diagram, Node, NodeId};
use crate::geom::Rect;
use crate::text_metrics::{Font, TextMeasure};
use crate::theme::Theme;

struct LayoutContext<'a> {
    measure: &'a dyn TextMeasure,
    font: Font,
    config: &'a LayoutConfig,
}

/// Lays out the subtree rooted at `id`, children first, and returns the
/// resulting bounds of `id`.
pub fn layout_subtree(
    diagram: &mut Diagram,
    id: NodeId,
    measure: &dyn TextMeasure,
    theme: &Theme,
    config: &LayoutConfig,
) -> Rect {
    let ctx = LayoutContext {
        measure,
        font: theme.font(config),
        config,
    };
    layout_node(diagram, id, &ctx)
}

/// Lays out every root of the diagram independently.
pub fn layout_all(
    diagram: &mut Diagram,
    measure: &dyn TextMeasure,
    theme: &Theme,
    config: &LayoutConfig,
) {
    let roots = diagram.roots().to_vec();
    for root in roots {
        layout_subtree(diagram, root, measure, theme, config);
    }
}

fn layout_node(diagram: &mut Diagram, id: NodeId, ctx: &LayoutContext<'_>) -> Rect {
    let children = diagram.children(id).to_vec();
    let child_bounds = Rect::union_all(
        children
            .iter()
            .map(|child| layout_node(diagram, *child, ctx))
            .collect::<Vec<_>>(),
    );
    if let Some(union) = child_bounds {
        log::trace!("children of {id:?} span {union:?}");
    }

    match diagram.node_mut_untracked(id) {
        Node::Package(package) => {
            let geometry = package::package_geometry(
                package,
                child_bounds,
                ctx.measure,
                &ctx.font,
                &ctx.config.package,
            );
            log::debug!(
                "package {:?} laid out at {:?} (header {:?})",
                package.name(),
                geometry.bounds,
                geometry.header
            );
            package.set_geometry(geometry);
            geometry.bounds
        }
        Node::Class(class) => {
            let (bounds, name_band) =
                class::class_bounds(class, ctx.measure, &ctx.font, &ctx.config.class);
            class.set_bounds(bounds, name_band);
            bounds
        }
    }
}

impl Diagram {
    /// Runs a layout pass over the subtree rooted at `id`.
    pub fn layout(
        &mut self,
        id: NodeId,
        measure: &dyn TextMeasure,
        theme: &Theme,
        config: &LayoutConfig,
    ) -> Rect {
        layout_subtree(self, id, measure, theme, config)
    }
}
