use crate::diagram::{Node, PackageGeometry};
use crate::geom::{Direction, Point, Rect, rectangular_connection_point};

/// Pulls a bounds-based connection point out of the package's empty top-right notch.
///
/// A candidate above the body and right of the header is moved onto the top
/// edge of the body, shifted toward the centre in proportion to the header
/// height, and never left of the header's right edge.
pub fn correct_connection_point(geometry: &PackageGeometry, candidate: Point) -> Point {
    let PackageGeometry {
        bounds,
        header,
        body,
    } = geometry;
    if candidate.y >= body.y || candidate.x <= header.max_x() {
        return candidate;
    }
    let delta = if bounds.height == 0 {
        0
    } else {
        header.height * (candidate.x - bounds.center().x) * 2 / bounds.height
    };
    let mut x = candidate.x - delta;
    if x < header.max_x() {
        x = header.max_x() + 1;
    }
    let corrected = Point::new(x, body.y);
    log::trace!("connection point {candidate:?} moved out of the notch to {corrected:?}");
    corrected
}

/// Connection point on the node's silhouette, or `None` while its geometry is stale.
pub fn connection_point(node: &Node, direction: Direction) -> Option<Point> {
    match node {
        Node::Package(package) => {
            let geometry = package.geometry()?;
            let candidate = rectangular_connection_point(&geometry.bounds, direction);
            Some(correct_connection_point(geometry, candidate))
        }
        Node::Class(class) => Some(rectangular_connection_point(&class.bounds()?, direction)),
    }
}

/// Rectangles making up the visible outline.
pub fn shape(node: &Node) -> Option<Vec<Rect>> {
    match node {
        Node::Package(package) => {
            let geometry = package.geometry()?;
            Some(vec![geometry.header, geometry.body])
        }
        Node::Class(class) => Some(vec![class.bounds()?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Size;

    fn default_geometry() -> PackageGeometry {
        PackageGeometry::partition(Rect::new(0, 0, 100, 80), Size::new(60, 20))
    }

    #[test]
    fn notch_point_moves_onto_body_top() {
        let g = default_geometry();
        assert_eq!(g.header, Rect::new(0, 0, 60, 20));
        assert_eq!(g.body, Rect::new(0, 20, 100, 60));
        let corrected = correct_connection_point(&g, Point::new(90, 0));
        assert_eq!(corrected.y, 20);
        assert!(corrected.x > 61 && corrected.x < 100, "got {corrected:?}");
        assert_eq!(corrected, Point::new(70, 20));
    }

    #[test]
    fn correction_never_reenters_the_header() {
        // narrow notch: a large delta would push x left of the header
        let g = PackageGeometry::partition(Rect::new(0, 0, 100, 30), Size::new(90, 20));
        let corrected = correct_connection_point(&g, Point::new(95, 0));
        assert_eq!(corrected, Point::new(91, 20));
    }

    #[test]
    fn points_outside_the_notch_are_untouched() {
        let g = default_geometry();
        for p in [
            Point::new(30, 0),
            Point::new(60, 0),
            Point::new(100, 40),
            Point::new(50, 80),
            Point::new(0, 40),
        ] {
            assert_eq!(correct_connection_point(&g, p), p);
        }
    }

    #[test]
    fn every_direction_lands_on_the_silhouette() {
        let g = default_geometry();
        for direction in Direction::ALL {
            let candidate = rectangular_connection_point(&g.bounds, direction);
            let p = correct_connection_point(&g, candidate);
            let on_header = g.header.contains_point(p);
            let on_body = g.body.contains_point(p);
            assert!(on_header || on_body, "{direction:?} gave {p:?}");
        }
    }
}
