use crate::config::PackageLayoutConfig;
use crate::diagram::{PackageGeometry, PackageNode};
use crate::geom::{Rect, Size};
use crate::text_metrics::{Font, TextMeasure};

/// Natural size of the header tab for a label.
pub(super) fn header_size(
    name: &str,
    measure: &dyn TextMeasure,
    font: &Font,
    config: &PackageLayoutConfig,
) -> Size {
    let label = measure.measure(name, font);
    Size::new(
        (label.width + 2 * config.name_gap).max(config.default_top_width),
        label.height.max(config.default_top_height),
    )
}

/// Geometry of `package` given the union of its children's laid-out bounds.
///
/// Without children the previous top-left corner is kept. With children the
/// corner follows them so the body starts `y_gap` above the topmost child and
/// `x_gap` left of the leftmost one. Width and height take the largest of the
/// default footprint, the header footprint, the contents and the children
/// plus margins; the header height always stacks on top of the body.
pub(super) fn package_geometry(
    package: &PackageNode,
    child_bounds: Option<Rect>,
    measure: &dyn TextMeasure,
    font: &Font,
    config: &PackageLayoutConfig,
) -> PackageGeometry {
    let top = header_size(package.name(), measure, font, config);
    let contents = package.contents().preferred_size(measure, font);

    let bounds = match child_bounds {
        None => {
            let origin = package.raw_geometry().bounds.origin();
            Rect::new(
                origin.x,
                origin.y,
                compute_width(config, top.width, contents.width, 0),
                compute_height(config, top.height, contents.height, 0),
            )
        }
        Some(children) => Rect::new(
            children.x - config.x_gap,
            children.y - top.height - config.y_gap,
            compute_width(
                config,
                top.width,
                contents.width,
                children.width + 2 * config.x_gap,
            ),
            compute_height(
                config,
                top.height,
                contents.height,
                children.height + 2 * config.y_gap,
            ),
        ),
    };

    PackageGeometry::partition(bounds, top)
}

fn compute_width(
    config: &PackageLayoutConfig,
    top_width: i32,
    content_width: i32,
    children_width: i32,
) -> i32 {
    [
        config.default_width,
        top_width + config.default_width - config.default_top_width,
        content_width,
        children_width,
    ]
    .into_iter()
    .max()
    .unwrap_or(config.default_width)
}

fn compute_height(
    config: &PackageLayoutConfig,
    top_height: i32,
    content_height: i32,
    children_height: i32,
) -> i32 {
    let body = [
        config.default_height - config.default_top_height,
        content_height,
        children_height,
    ]
    .into_iter()
    .max()
    .unwrap_or(0);
    top_height + body
}
