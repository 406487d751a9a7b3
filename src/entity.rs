use glam::Vec2;

use crate::aabb::Aabb;
use crate::quadtree::NodeId;

/// What the tree needs from anything it stores.
///
/// The parent slot is a non-owning back-reference maintained by the tree:
/// callers should treat it as read-only and relocate entities with
/// [`QuadTree::move_entity`](crate::QuadTree::move_entity).
pub trait Entity {
    fn aabb(&self) -> Aabb;
    fn set_position(&mut self, position: Vec2);
    fn parent(&self) -> Option<NodeId>;
    fn set_parent(&mut self, parent: Option<NodeId>);
}

/// A plain box with a caller-chosen id, for callers without an entity type of
/// their own.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Body {
    pub id: u64,
    aabb: Aabb,
    parent: Option<NodeId>,
}

impl Body {
    pub fn new(id: u64, position: Vec2, size: Vec2) -> Self {
        Self {
            id,
            aabb: Aabb::new(position, size),
            parent: None,
        }
    }

    pub fn square(id: u64, position: Vec2, size: f32) -> Self {
        Self::new(id, position, Vec2::splat(size))
    }
}

impl Entity for Body {
    fn aabb(&self) -> Aabb {
        self.aabb
    }

    fn set_position(&mut self, position: Vec2) {
        self.aabb.position = position;
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}
