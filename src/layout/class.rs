use crate::config::ClassLayoutConfig;
use crate::diagram::ClassNode;
use crate::geom::Rect;
use crate::text_metrics::{Font, TextMeasure};

/// Bounds of a class box and the height of its name compartment. The
/// top-left corner is kept.
pub(super) fn class_bounds(
    class: &ClassNode,
    measure: &dyn TextMeasure,
    font: &Font,
    config: &ClassLayoutConfig,
) -> (Rect, i32) {
    let name = measure.measure(class.name(), font);
    let contents = class.contents().preferred_size(measure, font);

    let name_band = name.height + 2 * config.padding_y;
    let contents_band = if class.contents().is_empty() {
        0
    } else {
        contents.height + 2 * config.padding_y
    };
    let width = config
        .default_width
        .max(name.width + 2 * config.padding_x)
        .max(contents.width + 2 * config.padding_x);
    let height = config.default_height.max(name_band + contents_band);

    let origin = class.raw_bounds().origin();
    (Rect::new(origin.x, origin.y, width, height), name_band)
}
