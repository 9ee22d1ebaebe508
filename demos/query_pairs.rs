//! Register a few boxes and list the overlapping pairs.
use hshg::prelude::*;

fn main() {
    let mut index = Hshg::new();
    let a = index.add_object(Aabb::new(0.0, 0.0, 1.0, 1.0)).unwrap(); // touches c
    let b = index.add_object(Aabb::new(2.0, 2.0, 3.0, 3.0)).unwrap(); // alone
    let c = index.add_object(Aabb::new(0.5, 0.5, 1.5, 1.5)).unwrap();
    let big = index.add_object(Aabb::new(-10.0, -10.0, 0.2, 0.2)).unwrap(); // touches a

    let pairs = index.query_for_collision_pairs();
    println!("Grid levels: {}", index.grid_count());
    println!("Pairs: {:?}", pairs);

    let has = |x: ObjectKey, y: ObjectKey| pairs.iter().any(|&p| p == (x, y) || p == (y, x));
    assert_eq!(pairs.len(), 2, "Expected 2 overlapping pairs");
    assert!(has(a, c), "a and c should overlap");
    assert!(has(a, big), "a and big should overlap");
    assert!(!pairs.iter().any(|&(x, y)| x == b || y == b), "b should not overlap anything");

    // Move b onto c; the index sees it after update
    *index.get_mut(b).unwrap() = Aabb::new(1.2, 1.2, 2.2, 2.2);
    index.update().unwrap();
    let moved_pairs = index.query_for_collision_pairs();
    println!("After move: {:?}", moved_pairs);
    assert_eq!(moved_pairs.len(), 3);
}
