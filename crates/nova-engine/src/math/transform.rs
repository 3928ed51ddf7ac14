use glam::{Affine2, Vec2};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

new_key_type! {
    /// Stable handle to a node in a [`TransformTree`].
    pub struct NodeId;
}

/// Which part of a node's world transform changed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TransformChange {
    Position,
    Rotation,
    Scale,
}

/// Queued change notification, produced when a world transform is recomputed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TransformEvent {
    pub node: NodeId,
    pub change: TransformChange,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("transform node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("attaching {child:?} to {parent:?} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },
}

#[derive(Debug, Clone)]
struct Node {
    position: Vec2,
    rotation: f32, // radians
    scale: Vec2,

    local: Affine2,
    local_dirty: bool,

    world: Affine2,
    world_dirty: bool,

    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
            scale: Vec2::ONE,
            local: Affine2::IDENTITY,
            local_dirty: true,
            world: Affine2::IDENTITY,
            world_dirty: true,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Arena of hierarchical 2D transforms.
///
/// Local matrices are `translate * rotate * scale`; world matrices are
/// `parent.world * local`. Both are recomputed lazily on read. Mutating a
/// node flags its whole subtree, so a read on any descendant sees the change.
///
/// Reads take `&mut self` because they refresh the caches.
#[derive(Debug, Default)]
pub struct TransformTree {
    nodes: SlotMap<NodeId, Node>,
    events: Vec<TransformEvent>,
}

impl TransformTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self) -> NodeId {
        self.create_at(Vec2::ZERO)
    }

    pub fn create_at(&mut self, position: Vec2) -> NodeId {
        self.nodes.insert(Node::new(position))
    }

    /// Removes a node. Its children become roots and keep their local transform.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.remove(id) else {
            return false;
        };

        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|c| *c != id);
        }

        for child in node.children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parent = None;
            }
            self.mark_world_dirty(child);
        }

        self.events.retain(|e| e.node != id);
        true
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── hierarchy ──────────────────────────────────────────────────────────

    /// Re-parents `child`. `None` detaches it and makes it a root.
    pub fn attach_to(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<(), TransformError> {
        if !self.contains(child) {
            return Err(TransformError::UnknownNode(child));
        }

        if let Some(p) = parent {
            if !self.contains(p) {
                return Err(TransformError::UnknownNode(p));
            }
            if p == child || self.is_ancestor(child, p) {
                return Err(TransformError::Cycle { child, parent: p });
            }
        }

        let old = self.nodes[child].parent;
        if old == parent {
            return Ok(());
        }

        if let Some(old) = old.and_then(|o| self.nodes.get_mut(o)) {
            old.children.retain(|c| *c != child);
        }
        if let Some(p) = parent {
            self.nodes[p].children.push(child);
        }
        self.nodes[child].parent = parent;
        self.mark_world_dirty(child);
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(p) = self.parent(node) {
            if p == ancestor {
                return true;
            }
            node = p;
        }
        false
    }

    // ── local mutators ─────────────────────────────────────────────────────

    pub fn set_position(&mut self, id: NodeId, position: Vec2) {
        self.mutate(id, |n| n.position = position);
    }

    pub fn translate(&mut self, id: NodeId, offset: Vec2) {
        self.mutate(id, |n| n.position += offset);
    }

    pub fn set_rotation_radians(&mut self, id: NodeId, radians: f32) {
        self.mutate(id, |n| n.rotation = radians);
    }

    pub fn set_rotation_degrees(&mut self, id: NodeId, degrees: f32) {
        self.set_rotation_radians(id, degrees.to_radians());
    }

    pub fn rotate_radians(&mut self, id: NodeId, radians: f32) {
        self.mutate(id, |n| n.rotation += radians);
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vec2) {
        self.mutate(id, |n| n.scale = scale);
    }

    pub fn set_uniform_scale(&mut self, id: NodeId, scale: f32) {
        self.set_scale(id, Vec2::splat(scale));
    }

    fn mutate(&mut self, id: NodeId, f: impl FnOnce(&mut Node)) {
        let Some(node) = self.nodes.get_mut(id) else {
            log::debug!("transform mutation on stale node {id:?} ignored");
            return;
        };
        f(node);
        node.local_dirty = true;
        self.mark_world_dirty(id);
    }

    fn mark_world_dirty(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current) else { continue };
            node.world_dirty = true;
            stack.extend_from_slice(&node.children);
        }
    }

    // ── local getters ──────────────────────────────────────────────────────

    pub fn position(&self, id: NodeId) -> Vec2 {
        self.nodes.get(id).map_or(Vec2::ZERO, |n| n.position)
    }

    pub fn rotation_radians(&self, id: NodeId) -> f32 {
        self.nodes.get(id).map_or(0.0, |n| n.rotation)
    }

    pub fn rotation_degrees(&self, id: NodeId) -> f32 {
        self.rotation_radians(id).to_degrees()
    }

    pub fn scale(&self, id: NodeId) -> Vec2 {
        self.nodes.get(id).map_or(Vec2::ONE, |n| n.scale)
    }

    pub fn local_transform(&mut self, id: NodeId) -> Affine2 {
        let Some(node) = self.nodes.get_mut(id) else {
            return Affine2::IDENTITY;
        };
        if node.local_dirty {
            node.local = Affine2::from_scale_angle_translation(node.scale, node.rotation, node.position);
            node.local_dirty = false;
        }
        node.local
    }

    // ── world getters ──────────────────────────────────────────────────────

    /// World transform of `id`; stale ids yield identity.
    ///
    /// Two reads without an intervening mutation return the same cached matrix.
    pub fn world_transform(&mut self, id: NodeId) -> Affine2 {
        let Some(node) = self.nodes.get(id) else {
            return Affine2::IDENTITY;
        };
        if !node.world_dirty {
            return node.world;
        }

        let parent = node.parent;
        let parent_world = parent.map_or(Affine2::IDENTITY, |p| self.world_transform(p));
        let local = self.local_transform(id);
        let world = parent_world * local;

        let node = &mut self.nodes[id];
        let previous = node.world;
        node.world = world;
        node.world_dirty = false;

        self.queue_changes(id, previous, world);
        world
    }

    pub fn world_position(&mut self, id: NodeId) -> Vec2 {
        self.world_transform(id).translation
    }

    pub fn world_rotation_radians(&mut self, id: NodeId) -> f32 {
        let (_, angle, _) = self.world_transform(id).to_scale_angle_translation();
        angle
    }

    pub fn world_scale(&mut self, id: NodeId) -> Vec2 {
        let (scale, _, _) = self.world_transform(id).to_scale_angle_translation();
        scale
    }

    /// Unit vector the node faces in world space.
    pub fn direction(&mut self, id: NodeId) -> Vec2 {
        Vec2::from_angle(self.world_rotation_radians(id))
    }

    // ── notifications ──────────────────────────────────────────────────────

    fn queue_changes(&mut self, node: NodeId, previous: Affine2, current: Affine2) {
        if previous == current {
            return;
        }
        let (s0, a0, t0) = previous.to_scale_angle_translation();
        let (s1, a1, t1) = current.to_scale_angle_translation();

        for (changed, change) in [
            (t0 != t1, TransformChange::Position),
            (a0 != a1, TransformChange::Rotation),
            (s0 != s1, TransformChange::Scale),
        ] {
            if changed {
                self.events.push(TransformEvent { node, change });
            }
        }
    }

    /// Takes all queued change notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<TransformEvent> {
        std::mem::take(&mut self.events)
    }
}
