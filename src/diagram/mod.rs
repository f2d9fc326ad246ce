//! Containment tree of diagram nodes.
//!
//! Nodes live in an arena owned by [`Diagram`]. A container's child list is
//! the owning edge; the child's `parent` is a plain id used to keep the
//! single-container invariant and to re-parent.

mod node;

pub use node::*;

use slotmap::{SlotMap, new_key_type};

use crate::geom::{Direction, Point, Rect};
use crate::text::MultiLineText;

new_key_type! {
    pub struct NodeId;
}

#[derive(Debug, Clone, Default)]
pub struct Diagram {
    nodes: SlotMap<NodeId, Node>,
    roots: Vec<NodeId>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached node. It starts out as a root.
    pub fn add_node(&mut self, node: impl Into<Node>) -> NodeId {
        let mut node = node.into();
        node.set_parent_id(None);
        assert!(
            node.children().is_empty(),
            "a node must be added before its children"
        );
        let id = self.nodes.insert(node);
        self.roots.push(id);
        id
    }

    pub fn add_package(&mut self, package: PackageNode) -> NodeId {
        self.add_node(package)
    }

    pub fn add_class(&mut self, class: ClassNode) -> NodeId {
        self.add_node(class)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Looks up a live node. Panics on an id that is not part of this diagram.
    pub fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not part of this diagram"),
        }
    }

    pub(crate) fn node_mut_untracked(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not part of this diagram"),
        }
    }

    /// Mutable access to a node; marks it and its ancestors stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.invalidate(id);
        self.node_mut_untracked(id)
    }

    pub fn package(&self, id: NodeId) -> Option<&PackageNode> {
        self.get(id).and_then(Node::as_package)
    }

    pub fn class(&self, id: NodeId) -> Option<&ClassNode> {
        self.get(id).and_then(Node::as_class)
    }

    /// Top-level nodes in the order they became roots.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.node(id).parent().is_none()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    pub fn requires_parent(&self, id: NodeId) -> bool {
        self.node(id).as_contained().requires_parent()
    }

    /// Ids of `id` and every descendant, parents before children.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for child in self.children(current).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|candidate| candidate == ancestor)
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    /// Inserts `child` at `index` in `parent`'s children, first detaching it
    /// from any previous container.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        assert!(self.contains(child), "child {child:?} is not part of this diagram");
        let parent_kind = self.node(parent).kind();
        assert!(
            self.node(parent).as_container().is_some(),
            "a {} node cannot hold children",
            parent_kind.as_str()
        );
        assert!(
            self.node(child).as_contained().accepts_container(parent_kind),
            "a {} node cannot be placed inside a {} node",
            self.node(child).kind().as_str(),
            parent_kind.as_str()
        );
        assert!(
            child != parent && !self.is_ancestor(child, parent),
            "inserting {child:?} under {parent:?} would create a cycle"
        );

        let len = self.children(parent).len();
        assert!(index <= len, "child index {index} out of range 0..={len}");

        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child);
        }
        // Re-inserting into the same parent shortens the list by one.
        let index = index.min(self.children(parent).len());

        self.roots.retain(|id| *id != child);
        if let Some(children) = self.node_mut_untracked(parent).children_mut() {
            children.insert(index, child);
        }
        self.node_mut_untracked(child).set_parent_id(Some(parent));
        self.invalidate(parent);
    }

    /// Removes the first occurrence of `child` and clears its back-reference.
    /// Removing a node that is not a child is a no-op.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let removed = self
            .node_mut_untracked(parent)
            .children_mut()
            .and_then(|children| {
                let position = children.iter().position(|id| *id == child)?;
                children.remove(position);
                Some(())
            })
            .is_some();
        if !removed {
            return;
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.set_parent_id(None);
            self.roots.push(child);
        }
        self.invalidate(parent);
    }

    /// Rewrites only the back-reference of `child`. The container's child
    /// list is left alone; `insert_child` and `remove_child` keep both sides
    /// consistent and should be preferred.
    ///
    /// Nodes are never handed out mutably, so this is the only way to write a
    /// back-reference directly:
    ///
    /// ```compile_fail
    /// use package_diagram::{ClassNode, Diagram, PackageNode};
    /// let mut diagram = Diagram::new();
    /// let package = diagram.add_package(PackageNode::new());
    /// let class = diagram.add_class(ClassNode::new());
    /// diagram.node_mut(package).set_parent_id(Some(class));
    /// ```
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) {
        if let Some(parent) = parent {
            let parent_kind = self.node(parent).kind();
            assert!(
                self.node(child).as_contained().accepts_container(parent_kind),
                "a {} node cannot be placed inside a {} node",
                self.node(child).kind().as_str(),
                parent_kind.as_str()
            );
            assert!(
                child != parent && !self.is_ancestor(child, parent),
                "making {parent:?} the parent of {child:?} would create a cycle"
            );
        }
        let was_root = self.node(child).parent().is_none();
        self.node_mut_untracked(child).set_parent_id(parent);
        match (was_root, parent.is_none()) {
            (true, false) => self.roots.retain(|id| *id != child),
            (false, true) => self.roots.push(child),
            _ => {}
        }
    }

    /// Detaches `id` from its container and drops it with all descendants.
    pub fn remove_subtree(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
        for node in self.descendants(id) {
            self.nodes.remove(node);
        }
        self.roots.retain(|root| *root != id);
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        self.node_mut(id).set_name(name.into());
    }

    /// Replaces the contents wholesale.
    pub fn set_contents(&mut self, id: NodeId, contents: MultiLineText) {
        self.node_mut(id).set_contents(contents);
    }

    /// Marks `id` and all of its ancestors as needing layout.
    pub fn invalidate(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node_mut_untracked(node_id);
            node.mark_stale();
            current = node.parent();
        }
    }

    /// Moves the geometry of `id` and its whole subtree by `(dx, dy)`.
    /// Containers of `id` become stale; the moved subtree keeps its state.
    pub fn translate(&mut self, id: NodeId, dx: i32, dy: i32) {
        for node in self.descendants(id) {
            self.node_mut_untracked(node).translate_own(dx, dy);
        }
        if let Some(parent) = self.parent(id) {
            self.invalidate(parent);
        }
    }

    /// Deep copy of the subtree rooted at `id`. The copy is a new root; the
    /// source subtree and its container are untouched.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let clone = self.clone_detached(id);
        self.roots.push(clone);
        clone
    }

    fn clone_detached(&mut self, id: NodeId) -> NodeId {
        let mut copy = self.node(id).clone();
        let source_children = copy.children().to_vec();
        copy.set_parent_id(None);
        if let Some(children) = copy.children_mut() {
            children.clear();
        }
        let clone = self.nodes.insert(copy);
        for child in source_children {
            let child_clone = self.clone_detached(child);
            // The source child keeps its container, so `insert_child` is not an option here.
            self.node_mut_untracked(child_clone).set_parent_id(Some(clone));
            if let Some(children) = self.node_mut_untracked(clone).children_mut() {
                children.push(child_clone);
            }
        }
        clone
    }

    /// Silhouette rectangles from the last layout, or `None` while stale.
    pub fn shape(&self, id: NodeId) -> Option<Vec<Rect>> {
        crate::layout::shape(self.node(id))
    }

    /// Boundary point for an edge leaving `id` toward `direction`, following
    /// the node's actual silhouette. `None` while the node is stale.
    pub fn connection_point(&self, id: NodeId, direction: Direction) -> Option<Point> {
        crate::layout::connection_point(self.node(id), direction)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_back_references(diagram: &Diagram) {
        for (id, node) in diagram.iter() {
            for child in node.children() {
                assert_eq!(diagram.parent(*child), Some(id));
            }
            if let Some(parent) = node.parent() {
                let count = diagram
                    .children(parent)
                    .iter()
                    .filter(|child| **child == id)
                    .count();
                assert_eq!(count, 1);
            }
        }
        for root in diagram.roots() {
            assert!(diagram.is_root(*root));
        }
    }

    #[test]
    fn add_child_appends_and_sets_parent() {
        let mut diagram = Diagram::new();
        let parent = diagram.add_package(PackageNode::named("p"));
        let a = diagram.add_class(ClassNode::named("A"));
        let b = diagram.add_class(ClassNode::named("B"));
        diagram.add_child(parent, a);
        diagram.add_child(parent, b);
        assert_eq!(diagram.children(parent), &[a, b]);
        assert_eq!(diagram.parent(a), Some(parent));
        assert_eq!(diagram.roots(), &[parent]);
        assert_back_references(&diagram);
    }

    #[test]
    fn insert_child_respects_index() {
        let mut diagram = Diagram::new();
        let parent = diagram.add_package(PackageNode::new());
        let a = diagram.add_class(ClassNode::new());
        let b = diagram.add_class(ClassNode::new());
        let c = diagram.add_package(PackageNode::new());
        diagram.add_child(parent, a);
        diagram.add_child(parent, b);
        diagram.insert_child(parent, 1, c);
        assert_eq!(diagram.children(parent), &[a, c, b]);
    }

    #[test]
    fn moving_a_child_detaches_it_from_the_old_parent() {
        let mut diagram = Diagram::new();
        let first = diagram.add_package(PackageNode::named("first"));
        let second = diagram.add_package(PackageNode::named("second"));
        let child = diagram.add_package(PackageNode::named("child"));
        diagram.add_child(first, child);
        diagram.add_child(second, child);
        assert!(diagram.children(first).is_empty());
        assert_eq!(diagram.children(second), &[child]);
        assert_eq!(diagram.parent(child), Some(second));
        assert_back_references(&diagram);
    }

    #[test]
    fn reinserting_into_the_same_parent_does_not_duplicate() {
        let mut diagram = Diagram::new();
        let parent = diagram.add_package(PackageNode::new());
        let a = diagram.add_class(ClassNode::new());
        let b = diagram.add_class(ClassNode::new());
        diagram.add_child(parent, a);
        diagram.add_child(parent, b);
        diagram.insert_child(parent, 0, b);
        assert_eq!(diagram.children(parent), &[b, a]);
        assert_back_references(&diagram);
    }

    #[test]
    fn remove_child_is_idempotent() {
        let mut diagram = Diagram::new();
        let parent = diagram.add_package(PackageNode::new());
        let child = diagram.add_class(ClassNode::new());
        diagram.add_child(parent, child);
        diagram.remove_child(parent, child);
        assert!(diagram.children(parent).is_empty());
        assert_eq!(diagram.parent(child), None);
        diagram.remove_child(parent, child);
        assert_eq!(diagram.roots(), &[parent, child]);
        assert_back_references(&diagram);
    }

    #[test]
    fn remove_child_leaves_foreign_nodes_alone() {
        let mut diagram = Diagram::new();
        let a = diagram.add_package(PackageNode::new());
        let b = diagram.add_package(PackageNode::new());
        let child = diagram.add_class(ClassNode::new());
        diagram.add_child(a, child);
        diagram.remove_child(b, child);
        assert_eq!(diagram.parent(child), Some(a));
    }

    #[test]
    #[should_panic(expected = "cannot hold children")]
    fn classes_cannot_hold_children() {
        let mut diagram = Diagram::new();
        let class = diagram.add_class(ClassNode::new());
        let package = diagram.add_package(PackageNode::new());
        diagram.add_child(class, package);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn insert_out_of_range_panics() {
        let mut diagram = Diagram::new();
        let parent = diagram.add_package(PackageNode::new());
        let child = diagram.add_class(ClassNode::new());
        diagram.insert_child(parent, 1, child);
    }

    #[test]
    #[should_panic(expected = "cycle")]
    fn insert_ancestor_panics() {
        let mut diagram = Diagram::new();
        let outer = diagram.add_package(PackageNode::new());
        let inner = diagram.add_package(PackageNode::new());
        diagram.add_child(outer, inner);
        diagram.add_child(inner, outer);
    }

    #[test]
    #[should_panic(expected = "cannot be placed inside")]
    fn set_parent_rejects_leaf_container() {
        let mut diagram = Diagram::new();
        let class = diagram.add_class(ClassNode::new());
        let package = diagram.add_package(PackageNode::new());
        diagram.set_parent(package, Some(class));
    }

    #[test]
    #[should_panic(expected = "cycle")]
    fn set_parent_rejects_cycles() {
        let mut diagram = Diagram::new();
        let a = diagram.add_package(PackageNode::named("a"));
        let b = diagram.add_package(PackageNode::named("b"));
        diagram.set_parent(a, Some(b));
        diagram.set_parent(b, Some(a));
    }

    #[test]
    #[should_panic(expected = "cycle")]
    fn set_parent_rejects_self() {
        let mut diagram = Diagram::new();
        let a = diagram.add_package(PackageNode::new());
        diagram.set_parent(a, Some(a));
    }

    #[test]
    fn set_parent_updates_roots_both_ways() {
        let mut diagram = Diagram::new();
        let package = diagram.add_package(PackageNode::named("p"));
        let class = diagram.add_class(ClassNode::named("C"));
        assert_eq!(diagram.roots(), &[package, class]);

        diagram.set_parent(class, Some(package));
        assert_eq!(diagram.parent(class), Some(package));
        assert!(!diagram.is_root(class));
        assert_eq!(diagram.roots(), &[package]);
        // only the back-reference is written
        assert!(diagram.children(package).is_empty());

        diagram.set_parent(class, None);
        assert_eq!(diagram.parent(class), None);
        assert!(diagram.is_root(class));
        assert_eq!(diagram.roots(), &[package, class]);
    }

    #[test]
    fn set_parent_between_packages_is_accepted() {
        let mut diagram = Diagram::new();
        let outer = diagram.add_package(PackageNode::new());
        let inner = diagram.add_package(PackageNode::new());
        let leaf = diagram.add_class(ClassNode::new());
        diagram.set_parent(inner, Some(outer));
        diagram.set_parent(leaf, Some(inner));
        assert_eq!(diagram.depth(leaf), 2);
        assert!(diagram.is_ancestor(outer, leaf));
        diagram.layout(
            outer,
            &crate::text_metrics::FastTextMeasure,
            &crate::theme::Theme::classic(),
            &crate::config::LayoutConfig::default(),
        );
        assert!(!diagram.node(outer).is_stale());
        diagram.set_name(leaf, "renamed");
        assert!(diagram.node(outer).is_stale());
    }

    #[test]
    #[should_panic(expected = "not part of this diagram")]
    fn dead_ids_panic() {
        let mut diagram = Diagram::new();
        let parent = diagram.add_package(PackageNode::new());
        let child = diagram.add_class(ClassNode::new());
        diagram.remove_subtree(child);
        diagram.add_child(parent, child);
    }

    #[test]
    fn packages_do_not_require_parents() {
        let mut diagram = Diagram::new();
        let package = diagram.add_package(PackageNode::new());
        let class = diagram.add_class(ClassNode::new());
        assert!(!diagram.requires_parent(package));
        assert!(!diagram.requires_parent(class));
    }

    #[test]
    fn clone_subtree_is_independent() {
        let mut diagram = Diagram::new();
        let outer = diagram.add_package(PackageNode::named("outer"));
        let source = diagram.add_package(PackageNode::named("source"));
        let a = diagram.add_class(ClassNode::named("A"));
        let b = diagram.add_package(PackageNode::named("B"));
        diagram.add_child(outer, source);
        diagram.add_child(source, a);
        diagram.add_child(source, b);

        let clone = diagram.clone_subtree(source);
        assert_eq!(diagram.parent(clone), None);
        assert_eq!(diagram.parent(source), Some(outer));
        assert_eq!(diagram.children(outer), &[source]);

        let cloned_children = diagram.children(clone).to_vec();
        assert_eq!(cloned_children.len(), 2);
        for child in &cloned_children {
            assert_eq!(diagram.parent(*child), Some(clone));
        }
        diagram.set_name(cloned_children[0], "renamed");
        assert_eq!(diagram.node(a).name(), "A");
        assert_eq!(diagram.node(cloned_children[0]).name(), "renamed");
        assert_eq!(diagram.children(source), &[a, b]);
        assert_back_references(&diagram);
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let mut diagram = Diagram::new();
        let outer = diagram.add_package(PackageNode::new());
        let inner = diagram.add_package(PackageNode::new());
        let leaf = diagram.add_class(ClassNode::new());
        diagram.add_child(outer, inner);
        diagram.add_child(inner, leaf);
        diagram.remove_subtree(inner);
        assert!(diagram.children(outer).is_empty());
        assert!(!diagram.contains(inner));
        assert!(!diagram.contains(leaf));
        assert_eq!(diagram.len(), 1);
    }

    #[test]
    fn descendants_are_preorder() {
        let mut diagram = Diagram::new();
        let root = diagram.add_package(PackageNode::new());
        let a = diagram.add_package(PackageNode::new());
        let a1 = diagram.add_class(ClassNode::new());
        let b = diagram.add_class(ClassNode::new());
        diagram.add_child(root, a);
        diagram.add_child(a, a1);
        diagram.add_child(root, b);
        assert_eq!(diagram.descendants(root), vec![root, a, a1, b]);
        assert_eq!(diagram.depth(a1), 2);
    }
}
