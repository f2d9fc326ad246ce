use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CLASS_HEIGHT, DEFAULT_CLASS_WIDTH, PackageLayoutConfig};
use crate::geom::{Point, Rect, Size};
use crate::text::MultiLineText;

use super::NodeId;

/// A node that can own an ordered list of children.
pub trait HasChildren {
    fn children(&self) -> &[NodeId];
}

/// A node that can be placed inside a container.
pub trait CanBeContained {
    fn parent(&self) -> Option<NodeId>;

    /// Whether the node is only legal inside a container.
    fn requires_parent(&self) -> bool;

    fn accepts_container(&self, container: NodeKind) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Package,
    Class,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Package => "package",
            NodeKind::Class => "class",
        }
    }
}

/// Computed geometry of a package: the overall bounds split into a header
/// tab stacked flush-left above a full-width body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PackageGeometry {
    pub bounds: Rect,
    pub header: Rect,
    pub body: Rect,
}

impl PackageGeometry {
    /// Splits `bounds` below a header of `header_size` anchored at the top-left corner.
    pub fn partition(bounds: Rect, header_size: Size) -> Self {
        let header = Rect::new(bounds.x, bounds.y, header_size.width, header_size.height);
        let body = Rect::new(
            bounds.x,
            bounds.y + header_size.height,
            bounds.width,
            bounds.height - header_size.height,
        );
        Self {
            bounds,
            header,
            body,
        }
    }

    pub fn with_defaults(config: &PackageLayoutConfig) -> Self {
        Self::partition(
            Rect::new(0, 0, config.default_width, config.default_height),
            Size::new(config.default_top_width, config.default_top_height),
        )
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            bounds: self.bounds.translated(dx, dy),
            header: self.header.translated(dx, dy),
            body: self.body.translated(dx, dy),
        }
    }

    /// Actual top-right corner of the silhouette, as opposed to the bounds.
    pub fn top_right_corner(&self) -> Point {
        Point::new(self.body.max_x(), self.body.y)
    }
}

impl Default for PackageGeometry {
    fn default() -> Self {
        Self::with_defaults(&PackageLayoutConfig::default())
    }
}

/// A UML package: a named container with free-form contents.
#[derive(Debug, Clone)]
pub struct PackageNode {
    name: String,
    contents: MultiLineText,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    geometry: PackageGeometry,
    stale: bool,
}

impl PackageNode {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            contents: MultiLineText::default(),
            parent: None,
            children: Vec::new(),
            geometry: PackageGeometry::default(),
            stale: true,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_contents(mut self, contents: MultiLineText) -> Self {
        self.contents = contents;
        self
    }

    /// Places the top-left corner used while the package has no children.
    pub fn with_origin(mut self, origin: Point) -> Self {
        let current = self.geometry.bounds.origin();
        self.geometry = self
            .geometry
            .translated(origin.x - current.x, origin.y - current.y);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &MultiLineText {
        &self.contents
    }

    /// Geometry from the last layout pass, or `None` if it has gone stale since.
    pub fn geometry(&self) -> Option<&PackageGeometry> {
        if self.stale {
            None
        } else {
            Some(&self.geometry)
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_contents(&mut self, contents: MultiLineText) {
        self.contents = contents;
    }

    /// Geometry regardless of staleness. Layout reads the previous corner from here.
    pub(crate) fn raw_geometry(&self) -> &PackageGeometry {
        &self.geometry
    }

    pub(crate) fn set_geometry(&mut self, geometry: PackageGeometry) {
        self.geometry = geometry;
        self.stale = false;
    }

    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        self.geometry = self.geometry.translated(dx, dy);
    }
}

impl Default for PackageNode {
    fn default() -> Self {
        Self::new()
    }
}

impl HasChildren for PackageNode {
    fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl CanBeContained for PackageNode {
    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn requires_parent(&self) -> bool {
        false
    }

    fn accepts_container(&self, container: NodeKind) -> bool {
        container == NodeKind::Package
    }
}

/// A leaf classifier box. It can sit inside a package but never owns children.
#[derive(Debug, Clone)]
pub struct ClassNode {
    name: String,
    contents: MultiLineText,
    parent: Option<NodeId>,
    bounds: Rect,
    name_band: i32,
    stale: bool,
}

impl ClassNode {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            contents: MultiLineText::default(),
            parent: None,
            bounds: Rect::new(0, 0, DEFAULT_CLASS_WIDTH, DEFAULT_CLASS_HEIGHT),
            name_band: 0,
            stale: true,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_contents(mut self, contents: MultiLineText) -> Self {
        self.contents = contents;
        self
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.bounds = Rect::new(origin.x, origin.y, self.bounds.width, self.bounds.height);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &MultiLineText {
        &self.contents
    }

    pub fn bounds(&self) -> Option<Rect> {
        if self.stale { None } else { Some(self.bounds) }
    }

    /// Height of the name compartment from the last layout pass.
    pub fn name_band(&self) -> i32 {
        self.name_band
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_contents(&mut self, contents: MultiLineText) {
        self.contents = contents;
    }

    pub(crate) fn raw_bounds(&self) -> Rect {
        self.bounds
    }

    pub(crate) fn set_bounds(&mut self, bounds: Rect, name_band: i32) {
        self.bounds = bounds;
        self.name_band = name_band;
        self.stale = false;
    }

    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }
}

impl Default for ClassNode {
    fn default() -> Self {
        Self::new()
    }
}

impl CanBeContained for ClassNode {
    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn requires_parent(&self) -> bool {
        false
    }

    fn accepts_container(&self, container: NodeKind) -> bool {
        container == NodeKind::Package
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Package(PackageNode),
    Class(ClassNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Package(_) => NodeKind::Package,
            Node::Class(_) => NodeKind::Class,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Package(package) => package.name(),
            Node::Class(class) => class.name(),
        }
    }

    pub fn contents(&self) -> &MultiLineText {
        match self {
            Node::Package(package) => package.contents(),
            Node::Class(class) => class.contents(),
        }
    }

    pub fn as_package(&self) -> Option<&PackageNode> {
        match self {
            Node::Package(package) => Some(package),
            Node::Class(_) => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassNode> {
        match self {
            Node::Class(class) => Some(class),
            Node::Package(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&dyn HasChildren> {
        match self {
            Node::Package(package) => Some(package),
            Node::Class(_) => None,
        }
    }

    pub fn as_contained(&self) -> &dyn CanBeContained {
        match self {
            Node::Package(package) => package,
            Node::Class(class) => class,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.as_contained().parent()
    }

    /// Child ids in order; empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        self.as_container()
            .map(|container| container.children())
            .unwrap_or(&[])
    }

    /// Overall bounds from the last layout pass, or `None` while stale.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Node::Package(package) => package.geometry().map(|geometry| geometry.bounds),
            Node::Class(class) => class.bounds(),
        }
    }

    pub fn is_stale(&self) -> bool {
        match self {
            Node::Package(package) => package.is_stale(),
            Node::Class(class) => class.is_stale(),
        }
    }

    pub(crate) fn raw_bounds(&self) -> Rect {
        match self {
            Node::Package(package) => package.raw_geometry().bounds,
            Node::Class(class) => class.raw_bounds(),
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        match self {
            Node::Package(package) => package.set_name(name),
            Node::Class(class) => class.set_name(name),
        }
    }

    pub(crate) fn set_contents(&mut self, contents: MultiLineText) {
        match self {
            Node::Package(package) => package.set_contents(contents),
            Node::Class(class) => class.set_contents(contents),
        }
    }

    /// Raw back-reference write. `Diagram` keeps the container's list in sync.
    pub(crate) fn set_parent_id(&mut self, parent: Option<NodeId>) {
        match self {
            Node::Package(package) => package.parent = parent,
            Node::Class(class) => class.parent = parent,
        }
    }

    /// Child list of a container, `None` for leaves.
    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            Node::Package(package) => Some(&mut package.children),
            Node::Class(_) => None,
        }
    }

    pub(crate) fn mark_stale(&mut self) {
        match self {
            Node::Package(package) => package.mark_stale(),
            Node::Class(class) => class.mark_stale(),
        }
    }

    pub(crate) fn translate_own(&mut self, dx: i32, dy: i32) {
        match self {
            Node::Package(package) => package.translate(dx, dy),
            Node::Class(class) => {
                class.bounds = class.bounds.translated(dx, dy);
            }
        }
    }
}

impl From<PackageNode> for Node {
    fn from(package: PackageNode) -> Self {
        Node::Package(package)
    }
}

impl From<ClassNode> for Node {
    fn from(class: ClassNode) -> Self {
        Node::Class(class)
    }
}
