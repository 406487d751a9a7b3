use std::fmt;

use glam::Vec2;
use tracing::{debug, trace};

use crate::aabb::{Aabb, Direction};
use crate::config::QuadTreeConfig;
use crate::entity::Entity;
use crate::error::{EntityInfo, NodeInfo, Operation, QuadTreeError, Result};
use crate::list::List;
use crate::QuadtreeVisitor;

/// Handle to a node in a [`QuadTree`].
///
/// Handles of pruned nodes are recycled without a generation count: once a
/// node is pruned, its handle reads as unknown until a later child creation
/// reuses the slot, after which it names that new node. Don't keep node
/// handles across mutations; re-read them from [`Entity::parent`] or
/// [`QuadTree::for_each`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to an entity held by a [`QuadTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A region of the tree. Child slots and the entity list stay `None` until
/// they are first needed.
#[derive(Clone, Debug)]
pub struct Node {
    region: Aabb,
    parent: Option<NodeId>,
    children: Option<[Option<NodeId>; 4]>,
    entities: Option<Vec<EntityId>>,
}

impl Node {
    fn new(region: Aabb, parent: Option<NodeId>) -> Self {
        Self {
            region,
            parent,
            children: None,
            entities: None,
        }
    }

    pub fn region(&self) -> Aabb {
        self.region
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn child(&self, direction: Direction) -> Option<NodeId> {
        self.children.and_then(|children| children[direction.index()])
    }

    /// Present children in direction order.
    pub fn children(&self) -> impl Iterator<Item = (Direction, NodeId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.child(direction).map(|child| (direction, child)))
    }

    /// Entities stored directly at this node.
    pub fn entities(&self) -> &[EntityId] {
        self.entities.as_deref().unwrap_or(&[])
    }

    pub fn has_entities(&self) -> bool {
        !self.entities().is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children().next().is_none()
    }
}

/// Quadtree over entity AABBs.
///
/// Nodes live in an arena and are created on demand when an insertion needs
/// them. Each entity is stored at the deepest node whose region fully contains
/// it, and nodes left without entities or children are pruned straight away.
///
/// ```
/// use entity_quadtree::{Body, QuadTree};
/// use glam::Vec2;
///
/// let mut tree = QuadTree::default();
/// let a = tree.spawn(Body::square(1, Vec2::new(10.0, 10.0), 4.0));
/// let b = tree.spawn(Body::square(2, Vec2::new(12.0, 12.0), 4.0));
/// tree.insert(a).unwrap();
/// tree.insert(b).unwrap();
///
/// assert!(tree.collide(a).unwrap());
/// assert!(tree.move_entity(b, Vec2::new(40.0, 40.0)).unwrap());
/// assert!(!tree.collide(a).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct QuadTree<E: Entity> {
    root: NodeId,
    max_depth: u8,
    nodes: List<Node>,
    entities: List<E>,
}

impl<E: Entity> Default for QuadTree<E> {
    fn default() -> Self {
        Self::with_config(QuadTreeConfig::default())
    }
}

impl<E: Entity> QuadTree<E> {
    /// Creates a tree whose root is the square of side `size` anchored at `origin`.
    pub fn new(origin: Vec2, size: f32) -> Self {
        Self::with_config(QuadTreeConfig::default().with_origin(origin).with_size(size))
    }

    pub fn with_config(config: QuadTreeConfig) -> Self {
        let mut nodes = List::new();
        let root = NodeId(nodes.insert(Node::new(Aabb::square(config.origin, config.size), None)));
        Self {
            root,
            max_depth: config.resolved_max_depth(),
            nodes,
            entities: List::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_region(&self) -> Aabb {
        self.nodes
            .get(self.root.0)
            .map(Node::region)
            .unwrap_or_else(|| Aabb::square(Vec2::ZERO, 0.0))
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.0)
    }

    pub fn entity(&self, entity: EntityId) -> Option<&E> {
        self.entities.get(entity.0)
    }

    /// Every entity held by the tree, attached or not.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &E)> {
        self.entities.iter().map(|(index, entity)| (EntityId(index), entity))
    }

    pub fn len(&self) -> usize {
        self.entities.size()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.size()
    }

    fn node_ref(&self, node: NodeId) -> Result<&Node> {
        self.nodes.get(node.0).ok_or(QuadTreeError::UnknownNode(node))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(node.0).ok_or(QuadTreeError::UnknownNode(node))
    }

    fn entity_ref(&self, entity: EntityId) -> Result<&E> {
        self.entities.get(entity.0).ok_or(QuadTreeError::UnknownEntity(entity))
    }

    pub fn depth(&self, node: NodeId) -> Result<u8> {
        let mut depth = 0;
        let mut current = self.node_ref(node)?;
        while let Some(parent) = current.parent {
            current = self.node_ref(parent)?;
            depth += 1;
        }
        Ok(depth)
    }

    pub fn region(&self, node: NodeId) -> Result<Aabb> {
        Ok(self.node_ref(node)?.region)
    }

    pub fn describe(&self, node: NodeId) -> Result<NodeInfo> {
        let n = self.node_ref(node)?;
        Ok(NodeInfo {
            id: node,
            region: n.region,
            depth: self.depth(node)?,
            is_root: n.is_root(),
            is_leaf: n.is_leaf(),
            has_entities: n.has_entities(),
        })
    }

    fn entity_info(&self, entity: EntityId) -> Result<EntityInfo> {
        Ok(EntityInfo {
            id: entity,
            aabb: self.entity_ref(entity)?.aabb(),
        })
    }

    /// Hands `entity` to the tree without placing it. Use [`insert`](Self::insert)
    /// to attach it.
    pub fn spawn(&mut self, mut entity: E) -> EntityId {
        entity.set_parent(None);
        EntityId(self.entities.insert(entity))
    }

    /// Detaches `entity` if needed and gives it back to the caller.
    pub fn remove(&mut self, entity: EntityId) -> Result<E> {
        if let Some(node) = self.entity_ref(entity)?.parent() {
            self.detach_for(node, entity, Operation::Remove)?;
        }
        self.entities
            .erase(entity.0)
            .ok_or(QuadTreeError::UnknownEntity(entity))
    }

    /// Inserts `entity` starting at the root.
    pub fn insert(&mut self, entity: EntityId) -> Result<bool> {
        self.insert_at(self.root, entity)
    }

    /// Inserts `entity` into the subtree rooted at `node`, pushing it down to
    /// the deepest node whose region fully contains it.
    ///
    /// `node` must be a handle read since the last mutation; see [`NodeId`].
    pub fn insert_at(&mut self, node: NodeId, entity: EntityId) -> Result<bool> {
        let e = self.entity_ref(entity)?;
        if let Some(parent) = e.parent() {
            return Err(QuadTreeError::AlreadyAttached {
                node: self.describe(parent)?,
                entity: self.entity_info(entity)?,
            });
        }
        let aabb = e.aabb();
        let depth = self.depth(node)?;
        self.place(node, depth, entity, aabb)
    }

    fn place(&mut self, node: NodeId, depth: u8, entity: EntityId, aabb: Aabb) -> Result<bool> {
        if !self.node_ref(node)?.region.contains_aabb(&aabb) {
            return Err(QuadTreeError::OutOfBoundInsert {
                node: self.describe(node)?,
                entity: EntityInfo { id: entity, aabb },
            });
        }
        let direction = match depth < self.max_depth {
            true => self.containing_child_index(node, &aabb)?,
            false => None,
        };
        match direction {
            Some(direction) => {
                let child = self.ensure_child(node, direction)?;
                self.place(child, depth + 1, entity, aabb)
            }
            None => {
                self.push(node, entity)?;
                Ok(true)
            }
        }
    }

    /// The first direction, in canonical order, whose quadrant of `node` fully
    /// contains `aabb`.
    pub fn containing_child_index(&self, node: NodeId, aabb: &Aabb) -> Result<Option<Direction>> {
        let region = self.node_ref(node)?.region;
        Ok(Self::containing_quadrant(&region, aabb))
    }

    fn containing_quadrant(region: &Aabb, aabb: &Aabb) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&direction| region.quadrant(direction).contains_aabb(aabb))
    }

    fn ensure_child(&mut self, node: NodeId, direction: Direction) -> Result<NodeId> {
        let parent = self.node_ref(node)?;
        if let Some(child) = parent.child(direction) {
            return Ok(child);
        }
        let region = parent.region.quadrant(direction);
        let child = NodeId(self.nodes.insert(Node::new(region, Some(node))));
        self.node_mut(node)?.children.get_or_insert([None; 4])[direction.index()] = Some(child);
        trace!(parent = %node, %direction, %child, "created child node");
        Ok(child)
    }

    fn push(&mut self, node: NodeId, entity: EntityId) -> Result<()> {
        self.node_mut(node)?
            .entities
            .get_or_insert_with(Vec::new)
            .push(entity);
        if let Some(e) = self.entities.get_mut(entity.0) {
            e.set_parent(Some(node));
        }
        trace!(%node, %entity, "attached entity");
        Ok(())
    }

    /// Whether `aabb` overlaps any entity other than `ignored`, searching from the root.
    pub fn collide_aabb(&self, aabb: &Aabb, ignored: Option<EntityId>) -> bool {
        self.collide_aabb_at(self.root, aabb, ignored)
    }

    /// Whether `aabb` overlaps any entity other than `ignored` in the subtree
    /// of `node`. Queries that `node`'s region does not contain, and stale
    /// handles, never collide.
    pub fn collide_aabb_at(&self, node: NodeId, aabb: &Aabb, ignored: Option<EntityId>) -> bool {
        let Some(n) = self.nodes.get(node.0) else {
            return false;
        };
        if !n.region.contains_aabb(aabb) {
            return false;
        }
        let overlaps = |id: EntityId, entity: &E| Some(id) != ignored && entity.aabb().collide_aabb(aabb);

        let child = Self::containing_quadrant(&n.region, aabb).and_then(|direction| n.child(direction));
        if let Some(child) = child {
            // Entities straddling this node's quadrants are only stored here.
            let direct_hit = n
                .entities()
                .iter()
                .any(|&id| self.entities.get(id.0).is_some_and(|entity| overlaps(id, entity)));
            return direct_hit || self.collide_aabb_at(child, aabb, ignored);
        }
        self.reduce_entities(node, false, |hit, id, entity| hit || overlaps(id, entity))
    }

    /// [`collide_aabb`](Self::collide_aabb) with the entity's own box, ignoring itself.
    pub fn collide(&self, entity: EntityId) -> Result<bool> {
        let aabb = self.entity_ref(entity)?.aabb();
        Ok(self.collide_aabb(&aabb, Some(entity)))
    }

    /// Removes `entity` from `node`'s own list, clears its back-reference and
    /// prunes whatever became empty.
    ///
    /// A pruned `node` handle fails with [`QuadTreeError::UnknownNode`] until
    /// its slot is reused; see [`NodeId`].
    pub fn detach_entity(&mut self, node: NodeId, entity: EntityId) -> Result<()> {
        self.detach_for(node, entity, Operation::DetachEntity)
    }

    fn detach_for(&mut self, node: NodeId, entity: EntityId, operation: Operation) -> Result<()> {
        let index = self
            .node_ref(node)?
            .entities()
            .iter()
            .position(|&id| id == entity);
        let Some(index) = index else {
            return Err(QuadTreeError::EntityNotFound {
                node: self.describe(node)?,
                entity: self.entity_info(entity)?,
                operation,
            });
        };
        if let Some(list) = self.node_mut(node)?.entities.as_mut() {
            list.remove(index);
        }
        if let Some(e) = self.entities.get_mut(entity.0) {
            e.set_parent(None);
        }
        trace!(%node, %entity, "detached entity");
        self.clean(node);
        Ok(())
    }

    /// Detaches `entity` from whichever node holds it.
    pub fn detach(&mut self, entity: EntityId) -> Result<()> {
        match self.entity_ref(entity)?.parent() {
            Some(node) => self.detach_entity(node, entity),
            None => Err(QuadTreeError::EntityNotFound {
                node: self.describe(self.root)?,
                entity: self.entity_info(entity)?,
                operation: Operation::DetachEntity,
            }),
        }
    }

    /// Moves `entity` to `position` and inserts it again from the root.
    ///
    /// Fails with [`QuadTreeError::OutOfBoundInsert`] before touching the tree
    /// if the root cannot hold the entity at its new position.
    pub fn reinsert(&mut self, entity: EntityId, position: Vec2) -> Result<()> {
        let root = self.root;
        let e = self.entity_ref(entity)?;
        let aabb = e.aabb().with_position(position);
        let parent = e.parent();
        if !self.node_ref(root)?.region.contains_aabb(&aabb) {
            return Err(QuadTreeError::OutOfBoundInsert {
                node: self.describe(root)?,
                entity: EntityInfo { id: entity, aabb },
            });
        }
        if let Some(node) = parent {
            self.detach_for(node, entity, Operation::Reinsert)?;
        }
        if let Some(e) = self.entities.get_mut(entity.0) {
            e.set_position(position);
        }
        self.insert_at(root, entity)?;
        debug!(%entity, %position, "reinserted entity");
        Ok(())
    }

    /// Relocates `entity`. Returns `Ok(false)` and leaves everything as it was
    /// when the new position is outside the root.
    pub fn move_entity(&mut self, entity: EntityId, position: Vec2) -> Result<bool> {
        let aabb = self.entity_ref(entity)?.aabb().with_position(position);
        if !self.root_region().contains_aabb(&aabb) {
            debug!(%entity, %position, "rejected move outside the root region");
            return Ok(false);
        }
        self.reinsert(entity, position)?;
        Ok(true)
    }

    /// Prunes `node` if it is an empty non-root leaf, then its ancestors in
    /// turn until one of them is still in use.
    ///
    /// Handles of already pruned nodes are ignored; a recycled handle cleans
    /// whichever node now owns the slot. See [`NodeId`].
    pub fn clean(&mut self, node: NodeId) {
        let mut current = node;
        loop {
            let Some(n) = self.nodes.get(current.0) else {
                return;
            };
            let Some(parent) = n.parent else {
                return;
            };
            if n.has_entities() || !n.is_leaf() {
                return;
            }
            self.nodes.erase(current.0);
            if let Some(children) = self.nodes.get_mut(parent.0).and_then(|p| p.children.as_mut()) {
                for slot in children.iter_mut().filter(|slot| **slot == Some(current)) {
                    *slot = None;
                }
            }
            trace!(node = %current, %parent, "pruned empty node");
            current = parent;
        }
    }

    /// Left fold over every entity in the subtree of `node`: direct entities
    /// first, then each child's subtree in direction order.
    pub fn reduce_entities<B, F>(&self, node: NodeId, initial: B, mut combine: F) -> B
    where
        F: FnMut(B, EntityId, &E) -> B,
    {
        self.reduce_recursive(node, initial, &mut combine)
    }

    fn reduce_recursive<B, F>(&self, node: NodeId, initial: B, combine: &mut F) -> B
    where
        F: FnMut(B, EntityId, &E) -> B,
    {
        let Some(n) = self.nodes.get(node.0) else {
            return initial;
        };
        let mut acc = initial;
        for &id in n.entities() {
            if let Some(entity) = self.entities.get(id.0) {
                acc = combine(acc, id, entity);
            }
        }
        for (_, child) in n.children() {
            acc = self.reduce_recursive(child, acc, combine);
        }
        acc
    }

    /// Pre-order walk: `node`, then each present child in direction order.
    pub fn for_each<F>(&self, node: NodeId, mut visit: F)
    where
        F: FnMut(NodeId, &Node),
    {
        if let Ok(depth) = self.depth(node) {
            self.walk(node, depth, &mut |id, _, n| visit(id, n));
        }
    }

    fn walk<F>(&self, node: NodeId, depth: u8, visit: &mut F)
    where
        F: FnMut(NodeId, u8, &Node),
    {
        let Some(n) = self.nodes.get(node.0) else {
            return;
        };
        visit(node, depth, n);
        for (_, child) in n.children() {
            self.walk(child, depth + 1, visit);
        }
    }

    /// Reports every node and entity of the tree to `visitor`, in pre-order.
    pub fn traverse<V>(&self, visitor: &mut V)
    where
        V: QuadtreeVisitor,
    {
        self.walk(self.root, 0, &mut |_, depth, n| {
            match n.is_leaf() {
                true => visitor.leaf(depth, n.region),
                false => visitor.branch(depth, n.region),
            }
            for &id in n.entities() {
                if let Some(entity) = self.entities.get(id.0) {
                    visitor.entity(id, entity.aabb());
                }
            }
        });
    }

    /// Which slot of `node` holds `child`. Only meaningful on a branch.
    pub fn direction_of(&self, node: NodeId, child: NodeId) -> Result<Option<Direction>> {
        let n = self.node_ref(node)?;
        if n.is_leaf() {
            return Err(QuadTreeError::BranchFunctionOnLeaf {
                operation: Operation::DirectionOf,
            });
        }
        Ok(n.children().find(|&(_, c)| c == child).map(|(direction, _)| direction))
    }

    /// Minimum corner of `child`'s quadrant within `node`. Only meaningful on a branch.
    pub fn position_of(&self, node: NodeId, child: NodeId) -> Result<Option<Vec2>> {
        let n = self.node_ref(node)?;
        if n.is_leaf() {
            return Err(QuadTreeError::BranchFunctionOnLeaf {
                operation: Operation::PositionOf,
            });
        }
        let direction = self.direction_of(node, child)?;
        Ok(direction.map(|direction| n.region.quadrant(direction).position))
    }
}
