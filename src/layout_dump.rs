use crate::diagram::{Diagram, Node, NodeId};
use crate::geom::{Direction, Rect};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub nodes: Vec<NodeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub index: usize,
    pub kind: String,
    pub name: String,
    pub parent: Option<usize>,
    pub depth: usize,
    pub stale: bool,
    pub bounds: Option<[i32; 4]>,
    pub header: Option<[i32; 4]>,
    pub body: Option<[i32; 4]>,
    pub connection_points: BTreeMap<String, [i32; 2]>,
}

impl LayoutDump {
    /// Flattens the diagram in pre-order, root by root. `parent` refers to
    /// the `index` of another entry.
    pub fn from_diagram(diagram: &Diagram) -> Self {
        let order: Vec<NodeId> = diagram
            .roots()
            .iter()
            .flat_map(|root| diagram.descendants(*root))
            .collect();
        let nodes = order
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let node = diagram.node(*id);
                let parent = node
                    .parent()
                    .and_then(|parent| order.iter().position(|candidate| *candidate == parent));
                let (header, body) = match node {
                    Node::Package(package) => match package.geometry() {
                        Some(geometry) => (Some(rect_array(&geometry.header)), Some(rect_array(&geometry.body))),
                        None => (None, None),
                    },
                    Node::Class(_) => (None, None),
                };
                let connection_points = Direction::ALL
                    .iter()
                    .filter_map(|direction| {
                        diagram
                            .connection_point(*id, *direction)
                            .map(|point| (format!("{direction:?}"), [point.x, point.y]))
                    })
                    .collect();
                NodeDump {
                    index,
                    kind: node.kind().as_str().to_string(),
                    name: node.name().to_string(),
                    parent,
                    depth: diagram.depth(*id),
                    stale: node.is_stale(),
                    bounds: node.bounds().map(|bounds| rect_array(&bounds)),
                    header,
                    body,
                    connection_points,
                }
            })
            .collect();
        LayoutDump { nodes }
    }
}

fn rect_array(rect: &Rect) -> [i32; 4] {
    [rect.x, rect.y, rect.width, rect.height]
}

pub fn write_layout_dump(path: &Path, diagram: &Diagram) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_diagram(diagram);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

pub fn layout_dump_json(diagram: &Diagram) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_diagram(diagram))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::diagram::{ClassNode, PackageNode};
    use crate::text_metrics::FastTextMeasure;
    use crate::theme::Theme;

    #[test]
    fn dump_lists_nodes_in_preorder_with_parents() {
        let mut diagram = Diagram::new();
        let root = diagram.add_package(PackageNode::named("root"));
        let leaf = diagram.add_class(ClassNode::named("Leaf"));
        diagram.add_child(root, leaf);
        diagram.layout(root, &FastTextMeasure, &Theme::classic(), &LayoutConfig::default());

        let dump = LayoutDump::from_diagram(&diagram);
        assert_eq!(dump.nodes.len(), 2);
        assert_eq!(dump.nodes[0].name, "root");
        assert_eq!(dump.nodes[0].parent, None);
        assert_eq!(dump.nodes[1].parent, Some(0));
        assert_eq!(dump.nodes[1].depth, 1);
        assert!(dump.nodes[0].header.is_some());
        assert!(dump.nodes[1].header.is_none());
        assert_eq!(dump.nodes[0].connection_points.len(), 8);

        let json = layout_dump_json(&diagram).unwrap();
        assert!(json.contains("\"NorthEast\""));
    }
}
