//! Serialized form of a containment tree.
//!
//! A node is stored as its kind, name, contents and ordered children. Derived
//! geometry is never stored; only the optional top-left corner of a childless
//! node is kept, since layout reuses it as the node's position.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::diagram::{ClassNode, Diagram, NodeId, NodeKind, PackageNode};
use crate::geom::Point;
use crate::text::MultiLineText;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("class node {name:?} cannot contain children")]
    LeafWithChildren { name: String },
    #[error("invalid document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDocument {
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "MultiLineText::is_empty")]
    pub contents: MultiLineText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDocument>,
}

impl Document {
    pub fn from_json(input: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rebuilds the tree, replaying every child through `add_child` in order.
    /// Returns the diagram and its root ids.
    pub fn build(&self) -> Result<(Diagram, Vec<NodeId>), DocumentError> {
        let mut diagram = Diagram::new();
        let mut roots = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            roots.push(build_node(&mut diagram, node)?);
        }
        Ok((diagram, roots))
    }

    /// Captures every root of `diagram` and its descendants in child order.
    pub fn from_diagram(diagram: &Diagram) -> Self {
        Self {
            nodes: diagram
                .roots()
                .iter()
                .map(|root| capture_node(diagram, *root))
                .collect(),
        }
    }
}

fn build_node(diagram: &mut Diagram, doc: &NodeDocument) -> Result<NodeId, DocumentError> {
    let id = match doc.kind {
        NodeKind::Package => {
            let mut package = PackageNode::named(doc.name.clone()).with_contents(doc.contents.clone());
            if let Some(at) = doc.at {
                package = package.with_origin(at);
            }
            diagram.add_package(package)
        }
        NodeKind::Class => {
            if !doc.children.is_empty() {
                return Err(DocumentError::LeafWithChildren {
                    name: doc.name.clone(),
                });
            }
            let mut class = ClassNode::named(doc.name.clone()).with_contents(doc.contents.clone());
            if let Some(at) = doc.at {
                class = class.with_origin(at);
            }
            diagram.add_class(class)
        }
    };
    for child in &doc.children {
        let child_id = build_node(diagram, child)?;
        diagram.add_child(id, child_id);
    }
    Ok(id)
}

fn capture_node(diagram: &Diagram, id: NodeId) -> NodeDocument {
    let node = diagram.node(id);
    let children = node.children();
    let at = if children.is_empty() {
        Some(node.raw_bounds().origin()).filter(|origin| *origin != Point::default())
    } else {
        None
    };
    NodeDocument {
        kind: node.kind(),
        name: node.name().to_string(),
        contents: node.contents().clone(),
        at,
        children: children
            .iter()
            .map(|child| capture_node(diagram, *child))
            .collect(),
    }
}

pub fn load_document(path: &Path) -> anyhow::Result<Document> {
    let contents = std::fs::read_to_string(path)?;
    Ok(Document::from_json(&contents)?)
}
