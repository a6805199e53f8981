//! Transform hierarchy
//!
//! Nodes live in a [`SlotMap`] arena and refer to each other through
//! [`NodeId`] handles: a parent keeps an ordered child list and every child
//! keeps a back-reference to its parent. World matrices are never cached;
//! [`SceneGraph::world_matrix`] walks the ancestor chain on every call, so a
//! change anywhere up the chain is visible immediately.

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::{Mat4, Transform};

use super::animator::Animator;
use super::behavior::Behavior;
use super::renderable::Renderable;
use super::{SceneError, SceneResult};

new_key_type! {
    /// Handle to a node in a [`SceneGraph`]
    pub struct NodeId;
}

/// One node of the hierarchy
#[derive(Debug, Default)]
pub struct Node {
    /// Local transform relative to the parent
    pub transform: Transform,
    /// Debug name
    pub name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    animator: Option<Animator>,
    triggered: Vec<(String, Animator)>,
    behavior: Behavior,
    renderable: Option<Renderable>,
}

impl Node {
    /// Create a detached node with an identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: start from this transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: drive the transform with this animator
    pub fn with_animator(mut self, animator: Animator) -> Self {
        self.animator = Some(animator);
        self
    }

    /// Builder: move the node with this behavior
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Builder: make this node drawable
    pub fn with_renderable(mut self, renderable: Renderable) -> Self {
        self.renderable = Some(renderable);
        self
    }

    /// Parent, if attached
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in update order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Attached animator
    pub const fn animator(&self) -> Option<&Animator> {
        self.animator.as_ref()
    }

    /// Names of triggered animations that are still running, in trigger order
    pub fn active_animations(&self) -> impl Iterator<Item = &str> {
        self.triggered.iter().map(|(name, _)| name.as_str())
    }

    /// Current behavior
    pub const fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Render payload, present on entity nodes
    pub const fn renderable(&self) -> Option<&Renderable> {
        self.renderable.as_ref()
    }

    /// Mutable render payload
    pub fn renderable_mut(&mut self) -> Option<&mut Renderable> {
        self.renderable.as_mut()
    }

    /// `T * R * S` of the local transform
    pub fn local_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }

    /// Advance animator, triggered animations, then behavior; children are not touched
    fn advance(&mut self, delta_time: f32) {
        if let Some(animator) = self.animator.as_mut() {
            animator.update(&mut self.transform, delta_time);
        }
        for (_, animator) in &mut self.triggered {
            animator.update(&mut self.transform, delta_time);
        }
        self.triggered.retain(|(_, animator)| animator.is_active());
        self.behavior.update(&mut self.transform.position, delta_time);
    }
}

/// Arena of nodes forming a forest of transform trees
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
}

impl SceneGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a detached node
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = self.nodes.insert(node);
        log::trace!("Created node {id:?}");
        id
    }

    /// Insert a detached node with an identity transform
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(Node::new(name))
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by handle
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable node by handle
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Local transform of a node
    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.nodes.get(id).map(|node| &node.transform)
    }

    /// Mutable local transform of a node
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(id).map(|node| &mut node.transform)
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Children of a node, empty for unknown handles
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// All nodes without a parent, in arena order
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
    }

    /// True if `ancestor` is `id` itself or appears on its parent chain
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Append `child` to `parent`'s children
    ///
    /// A child that already has a parent is detached from it first, so a node
    /// is never listed by two parents.
    ///
    /// # Errors
    /// [`SceneError::NodeNotFound`] for a stale handle and
    /// [`SceneError::WouldCreateCycle`] when `child` is `parent` or one of its
    /// ancestors. The graph is unchanged on error.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        for id in [parent, child] {
            if !self.contains(id) {
                return Err(SceneError::NodeNotFound(id));
            }
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::WouldCreateCycle { parent, child });
        }

        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child);
        }

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        log::trace!("Attached {child:?} to {parent:?}");
        Ok(())
    }

    /// Detach `child` from `parent`
    ///
    /// Returns `false` and changes nothing if `child` is not one of
    /// `parent`'s children. The child itself stays alive as a root.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(parent) else {
            return false;
        };
        let Some(index) = node.children.iter().position(|&c| c == child) else {
            return false;
        };
        node.children.remove(index);

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
        true
    }

    /// Detach a node from its parent, if it has one
    pub fn detach(&mut self, id: NodeId) -> bool {
        match self.parent(id) {
            Some(parent) => self.remove_child(parent, id),
            None => false,
        }
    }

    /// Remove a node from the arena
    ///
    /// Only this node is freed. It is detached from its parent and its
    /// children become roots.
    pub fn destroy_node(&mut self, id: NodeId) -> Option<Node> {
        self.detach(id);
        let mut node = self.nodes.remove(id)?;
        for child in node.children.drain(..) {
            if let Some(child) = self.nodes.get_mut(child) {
                child.parent = None;
            }
        }
        log::trace!("Destroyed node {id:?}");
        Some(node)
    }

    /// Local matrix of a node
    pub fn local_matrix(&self, id: NodeId) -> Option<Mat4> {
        self.nodes.get(id).map(Node::local_matrix)
    }

    /// `parent.world * local`, recomputed from the ancestor chain
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let node = self.nodes.get(id)?;
        let mut world = node.local_matrix();
        let mut current = node.parent;
        while let Some(parent_id) = current {
            let Some(parent) = self.nodes.get(parent_id) else {
                break;
            };
            world = parent.local_matrix() * world;
            current = parent.parent;
        }
        Some(world)
    }

    /// Advance a node and then its subtree, depth-first in child order
    pub fn update(&mut self, id: NodeId, delta_time: f32) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current) else {
                continue;
            };
            node.advance(delta_time);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Attach or replace the animator driving a node
    pub fn attach_animator(&mut self, id: NodeId, animator: Animator) -> SceneResult<()> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))?;
        node.animator = Some(animator);
        Ok(())
    }

    /// Remove a node's animator
    pub fn detach_animator(&mut self, id: NodeId) -> Option<Animator> {
        self.nodes.get_mut(id).and_then(|node| node.animator.take())
    }

    /// Animator driving a node
    pub fn animator(&self, id: NodeId) -> Option<&Animator> {
        self.nodes.get(id).and_then(|node| node.animator.as_ref())
    }

    /// Mutable animator, for example to `reset` it
    pub fn animator_mut(&mut self, id: NodeId) -> Option<&mut Animator> {
        self.nodes.get_mut(id).and_then(|node| node.animator.as_mut())
    }

    /// Start a named one-shot animation on top of the node's animator
    ///
    /// Returns `Ok(false)` and leaves the running one alone if an animation
    /// with this name is still active. Finished animations are dropped during
    /// the update, after which the name can be triggered again.
    pub fn trigger_animation(&mut self, id: NodeId, name: &str, animator: Animator) -> SceneResult<bool> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))?;
        if node.triggered.iter().any(|(active, _)| active == name) {
            return Ok(false);
        }
        log::debug!("Triggered animation '{name}' on '{}'", node.name);
        node.triggered.push((name.to_owned(), animator));
        Ok(true)
    }

    /// Whether the named triggered animation is still running on `id`
    pub fn is_animation_active(&self, id: NodeId, name: &str) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|node| node.active_animations().any(|active| active == name))
    }

    /// Replace a node's behavior
    pub fn set_behavior(&mut self, id: NodeId, behavior: Behavior) -> SceneResult<()> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))?;
        node.behavior = behavior;
        Ok(())
    }

    /// Render payload of an entity node
    pub fn renderable(&self, id: NodeId) -> Option<&Renderable> {
        self.nodes.get(id).and_then(Node::renderable)
    }

    /// Mutable render payload of an entity node
    pub fn renderable_mut(&mut self, id: NodeId) -> Option<&mut Renderable> {
        self.nodes.get_mut(id).and_then(Node::renderable_mut)
    }

    /// Iterate over all nodes
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Every render payload in the graph, listed entity or not
    pub fn renderables_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut Renderable)> {
        self.nodes
            .iter_mut()
            .filter_map(|(id, node)| node.renderable.as_mut().map(|renderable| (id, renderable)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{constants, Point3, Quat, Vec3};
    use approx::assert_relative_eq;

    fn graph_with_chain() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        let c = graph.create_node("c");
        graph.add_child(a, b).unwrap();
        graph.add_child(b, c).unwrap();
        (graph, a, b, c)
    }

    #[test]
    fn root_world_equals_local() {
        let mut graph = SceneGraph::new();
        let id = graph.insert(Node::new("root").with_transform(Transform::from_position(Vec3::new(1.0, 2.0, 3.0))));
        assert_eq!(graph.world_matrix(id), graph.local_matrix(id));
    }

    #[test]
    fn world_composes_parent_first() {
        let (mut graph, a, b, _) = graph_with_chain();
        *graph.transform_mut(a).unwrap() = Transform::new(
            Vec3::new(5.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), constants::PI * 0.5),
            Vec3::new(2.0, 2.0, 2.0),
        );
        graph.transform_mut(b).unwrap().position = Vec3::new(1.0, 0.0, 0.0);

        // b's origin: scaled to (2,0,0), rotated about Y to (0,0,-2), moved to (5,0,-2)
        let world = graph.world_matrix(b).unwrap();
        let origin = world.transform_point(&Point3::origin());
        assert_relative_eq!(origin, Point3::new(5.0, 0.0, -2.0), epsilon = 1e-5);
    }

    #[test]
    fn parent_changes_are_visible_without_invalidation() {
        let (mut graph, a, _, c) = graph_with_chain();
        let before = graph.world_matrix(c).unwrap();
        graph.transform_mut(a).unwrap().position.y = 10.0;
        let after = graph.world_matrix(c).unwrap();
        assert_relative_eq!(after[(1, 3)] - before[(1, 3)], 10.0);
    }

    #[test]
    fn reparenting_detaches_from_old_parent() {
        let (mut graph, a, b, c) = graph_with_chain();
        graph.add_child(a, c).unwrap();

        assert_eq!(graph.children(b), &[] as &[NodeId]);
        assert_eq!(graph.children(a), &[b, c]);
        assert_eq!(graph.parent(c), Some(a));
    }

    #[test]
    fn cycles_are_rejected() {
        let (mut graph, a, b, c) = graph_with_chain();
        assert!(matches!(graph.add_child(c, a), Err(SceneError::WouldCreateCycle { .. })));
        assert!(matches!(graph.add_child(b, b), Err(SceneError::WouldCreateCycle { .. })));
        assert_eq!(graph.parent(a), None);
        assert_eq!(graph.children(b), &[c]);
    }

    #[test]
    fn stale_handles_are_reported() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let gone = graph.create_node("gone");
        graph.destroy_node(gone);
        assert!(matches!(graph.add_child(a, gone), Err(SceneError::NodeNotFound(id)) if id == gone));
    }

    #[test]
    fn remove_child_is_silent_for_strangers() {
        let (mut graph, a, b, c) = graph_with_chain();
        assert!(!graph.remove_child(a, c));
        assert_eq!(graph.parent(c), Some(b));

        assert!(graph.remove_child(b, c));
        assert_eq!(graph.parent(c), None);
        assert!(graph.contains(c));
    }

    #[test]
    fn destroy_orphans_children() {
        let (mut graph, a, b, c) = graph_with_chain();
        let node = graph.destroy_node(b).unwrap();
        assert_eq!(node.name, "b");
        assert!(graph.children(a).is_empty());
        assert_eq!(graph.parent(c), None);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.roots().count(), 2);
    }

    #[test]
    fn triggered_animations_run_once_per_name() {
        let mut graph = SceneGraph::new();
        let id = graph.create_node("lamp");
        let lift = || Animator::translation(Vec3::new(0.0, 1.0, 0.0), 1.0);

        assert!(graph.trigger_animation(id, "lift", lift()).unwrap());
        assert!(!graph.trigger_animation(id, "lift", lift()).unwrap());
        assert!(graph.is_animation_active(id, "lift"));

        graph.update(id, 0.5);
        assert_relative_eq!(graph.transform(id).unwrap().position.y, 0.5);
        graph.update(id, 0.5);
        assert_relative_eq!(graph.transform(id).unwrap().position.y, 1.0);
        assert!(!graph.is_animation_active(id, "lift"));
        assert_eq!(graph.node(id).unwrap().active_animations().count(), 0);

        // Retriggering starts from where the first run ended
        assert!(graph.trigger_animation(id, "lift", lift()).unwrap());
        graph.update(id, 1.0);
        assert_relative_eq!(graph.transform(id).unwrap().position.y, 2.0);
    }

    #[test]
    fn triggered_animation_composes_with_animator() {
        let mut graph = SceneGraph::new();
        let id = graph.insert(
            Node::new("spinner").with_animator(Animator::rotation(Vec3::y(), constants::PI, 2.0)),
        );
        graph
            .trigger_animation(id, "grow", Animator::scale_to(Vec3::new(2.0, 2.0, 2.0), 1.0))
            .unwrap();

        graph.update(id, 1.0);

        let transform = graph.transform(id).unwrap();
        assert_relative_eq!(transform.scale, Vec3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(transform.rotation.angle(), constants::PI * 0.5, epsilon = 1e-5);
        assert!(matches!(
            graph.trigger_animation(NodeId::default(), "grow", Animator::scale_to(Vec3::zeros(), 1.0)),
            Err(SceneError::NodeNotFound(_))
        ));
    }

    #[test]
    fn update_reaches_whole_subtree_in_order() {
        let (mut graph, a, b, c) = graph_with_chain();
        let d = graph.create_node("d");
        graph.add_child(a, d).unwrap();
        for id in [a, b, c, d] {
            graph
                .attach_animator(id, Animator::translation(Vec3::new(1.0, 0.0, 0.0), 1.0))
                .unwrap();
        }

        graph.update(a, 0.5);

        for id in [a, b, c, d] {
            assert_relative_eq!(graph.transform(id).unwrap().position.x, 0.5);
        }
        let untouched = graph.create_node("e");
        graph.update(untouched, 0.5);
        assert_relative_eq!(graph.transform(d).unwrap().position.x, 0.5);
    }
}
