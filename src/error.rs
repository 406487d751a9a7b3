use std::fmt;

use thiserror::Error;

use crate::aabb::Aabb;
use crate::quadtree::{EntityId, NodeId};

pub type Result<T> = std::result::Result<T, QuadTreeError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum QuadTreeError {
    #[error("tried to insert out-of-bound entity {entity} in {node}")]
    OutOfBoundInsert { node: NodeInfo, entity: EntityInfo },

    #[error("{operation} could not find entity {entity} in {node}")]
    EntityNotFound {
        node: NodeInfo,
        entity: EntityInfo,
        operation: Operation,
    },

    #[error("tried to execute {operation} on a leaf node")]
    BranchFunctionOnLeaf { operation: Operation },

    #[error("entity {entity} is already attached to {node}")]
    AlreadyAttached { node: NodeInfo, entity: EntityInfo },

    #[error("no live node {0}")]
    UnknownNode(NodeId),

    #[error("no live entity {0}")]
    UnknownEntity(EntityId),
}

/// The tree operation that raised an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    DetachEntity,
    Reinsert,
    Remove,
    DirectionOf,
    PositionOf,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::DetachEntity => "detach_entity",
            Operation::Reinsert => "reinsert",
            Operation::Remove => "remove",
            Operation::DirectionOf => "direction_of",
            Operation::PositionOf => "position_of",
        };
        f.write_str(name)
    }
}

/// Snapshot of a node for diagnostics.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub region: Aabb,
    pub depth: u8,
    pub is_root: bool,
    pub is_leaf: bool,
    pub has_entities: bool,
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuadTree")?;
        if self.is_root {
            write!(f, " root")?;
        }
        write!(f, "{}", if self.is_leaf { " leaf" } else { " branch" })?;
        if self.has_entities {
            write!(f, " hasEntities")?;
        }
        write!(
            f,
            " {{ position: {}, size: {}, depth: {} }}",
            self.region.position, self.region.size.x, self.depth
        )
    }
}

/// Snapshot of an entity for diagnostics.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EntityInfo {
    pub id: EntityId,
    pub aabb: Aabb,
}

impl fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.aabb)
    }
}
