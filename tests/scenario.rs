use entity_quadtree::{Aabb, Body, Entity, EntityId, NodeId, QuadTree, QuadTreeError};
use glam::Vec2;

fn holder(tree: &QuadTree<Body>, id: EntityId) -> NodeId {
    tree.entity(id).and_then(|body| body.parent()).unwrap()
}

#[test]
fn walkthrough_on_default_root() {
    let mut tree = QuadTree::new(Vec2::ZERO, 64.0);
    let a = tree.spawn(Body::square(1, Vec2::new(10.0, 10.0), 4.0));
    let b = tree.spawn(Body::square(2, Vec2::new(30.0, 10.0), 10.0));
    assert_eq!(tree.insert(a), Ok(true));
    assert_eq!(tree.insert(b), Ok(true));

    let a_node = holder(&tree, a);
    let a_region = tree.region(a_node).unwrap();
    assert!(a_region.contains_aabb(&Aabb::square(Vec2::new(8.0, 8.0), 8.0)));
    assert_eq!(a_region, Aabb::square(Vec2::new(8.0, 8.0), 8.0));

    assert_eq!(holder(&tree, b), tree.root());
    assert_eq!(tree.node(tree.root()).unwrap().entities(), &[b]);

    assert_eq!(tree.move_entity(a, Vec2::new(200.0, 200.0)), Ok(false));
    assert_eq!(holder(&tree, a), a_node);
    assert_eq!(tree.entity(a).unwrap().aabb().position, Vec2::new(10.0, 10.0));
}

#[test]
fn offset_root_rejects_boxes_near_world_origin() {
    let mut tree = QuadTree::new(Vec2::new(-32.0, -32.0), 64.0);
    let inside = tree.spawn(Body::square(1, Vec2::new(-30.0, -30.0), 2.0));
    let outside = tree.spawn(Body::square(2, Vec2::new(31.0, 0.0), 2.0));
    assert_eq!(tree.insert(inside), Ok(true));
    assert!(matches!(
        tree.insert(outside),
        Err(QuadTreeError::OutOfBoundInsert { .. })
    ));
    assert_eq!(
        tree.region(holder(&tree, inside)),
        Ok(Aabb::square(Vec2::new(-30.0, -30.0), 2.0))
    );
}

#[test]
fn entities_collide_until_one_moves_away() {
    let mut tree = QuadTree::default();
    let ids: Vec<_> = [(1, 5.0), (2, 7.0), (3, 50.0)]
        .into_iter()
        .map(|(id, at)| tree.spawn(Body::square(id, Vec2::splat(at), 4.0)))
        .collect();
    for &id in &ids {
        tree.insert(id).unwrap();
    }
    assert_eq!(tree.collide(ids[0]), Ok(true));
    assert_eq!(tree.collide(ids[1]), Ok(true));
    assert_eq!(tree.collide(ids[2]), Ok(false));

    assert_eq!(tree.move_entity(ids[1], Vec2::new(20.0, 40.0)), Ok(true));
    assert_eq!(tree.collide(ids[0]), Ok(false));
    assert_eq!(tree.collide(ids[1]), Ok(false));

    assert_eq!(tree.move_entity(ids[0], Vec2::new(52.0, 52.0)), Ok(true));
    assert_eq!(tree.collide(ids[2]), Ok(true));
}

#[test]
fn emptying_the_tree_leaves_only_the_root() {
    let mut tree = QuadTree::default();
    let ids: Vec<_> = (0..16)
        .map(|i| {
            let position = Vec2::new((i % 4) as f32 * 16.0 + 1.0, (i / 4) as f32 * 16.0 + 1.0);
            tree.spawn(Body::square(i, position, 3.0))
        })
        .collect();
    for &id in &ids {
        tree.insert(id).unwrap();
    }
    assert!(tree.node_count() > 16);

    for &id in ids.iter().rev() {
        tree.detach(id).unwrap();
    }
    assert_eq!(tree.node_count(), 1);
    assert!(tree.node(tree.root()).unwrap().is_leaf());
    assert_eq!(tree.len(), ids.len());
    assert!(matches!(
        tree.detach(ids[0]),
        Err(QuadTreeError::EntityNotFound { .. })
    ));
}
