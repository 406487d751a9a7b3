mod aabb;
mod config;
mod entity;
mod error;
mod list;
mod quadtree;

/// Receives the nodes and entities of a tree from [`QuadTree::traverse`].
pub trait QuadtreeVisitor {
    fn entity(&mut self, entity_id: EntityId, aabb: Aabb);
    fn leaf(&mut self, depth: u8, region: Aabb);
    fn branch(&mut self, depth: u8, region: Aabb);
}

pub use aabb::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use quadtree::*;

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    #[derive(Default)]
    struct Counter {
        entities: Vec<EntityId>,
        leaves: Vec<(u8, Aabb)>,
        branches: Vec<(u8, Aabb)>,
    }

    impl QuadtreeVisitor for Counter {
        fn entity(&mut self, entity_id: EntityId, _aabb: Aabb) {
            self.entities.push(entity_id);
        }

        fn leaf(&mut self, depth: u8, region: Aabb) {
            self.leaves.push((depth, region));
        }

        fn branch(&mut self, depth: u8, region: Aabb) {
            self.branches.push((depth, region));
        }
    }

    #[test]
    fn traverse_reports_branches_leaves_and_entities() {
        let mut tree = QuadTree::default();
        let straddler = tree.spawn(Body::square(1, Vec2::new(30.0, 30.0), 4.0));
        let corner = tree.spawn(Body::square(2, Vec2::new(40.0, 1.0), 20.0));
        tree.insert(straddler).unwrap();
        tree.insert(corner).unwrap();

        let mut counter = Counter::default();
        tree.traverse(&mut counter);

        assert_eq!(counter.branches, vec![(0, Aabb::square(Vec2::ZERO, 64.0))]);
        assert_eq!(
            counter.leaves,
            vec![(1, Aabb::square(Vec2::new(32.0, 0.0), 32.0))]
        );
        assert_eq!(counter.entities, vec![straddler, corner]);
    }
}
