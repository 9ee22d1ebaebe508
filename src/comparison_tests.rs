//! Comparison tests between Hshg pair queries and a brute-force O(n^2) scan

#[cfg(test)]
pub(crate) mod tests {
    use crate::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    /// Sorted pair list with each pair as (smaller key, larger key)
    pub(crate) fn normalized(pairs: &[CollisionPair]) -> Vec<CollisionPair> {
        let mut pairs: Vec<_> = pairs.iter().map(|&(a, b)| (a.min(b), a.max(b))).collect();
        pairs.sort();
        pairs
    }

    pub(crate) fn brute_force_pairs<T: Collidable>(index: &Hshg<T>) -> Vec<CollisionPair> {
        let objects: Vec<_> = index.iter().map(|(key, object)| (key, object.aabb())).collect();
        let mut pairs = Vec::new();
        for (i, (a, a_box)) in objects.iter().enumerate() {
            for (b, b_box) in &objects[i + 1..] {
                if a_box.overlaps(b_box) {
                    pairs.push((*a, *b));
                }
            }
        }
        normalized(&pairs)
    }

    /// Asserts same pairs as brute force, with no pair reported twice
    pub(crate) fn assert_matches_brute_force<T: Collidable>(index: &Hshg<T>) {
        let pairs = index.candidate_pairs(|a, b| a.aabb().overlaps(&b.aabb()));
        let unique: HashSet<_> = normalized(&pairs).into_iter().collect();
        assert_eq!(unique.len(), pairs.len(), "duplicate pairs reported");
        assert_eq!(normalized(&pairs), brute_force_pairs(index), "pair sets differ");
    }

    fn random_box<R: Rng>(rng: &mut R, extent: f64, min_size: f64, max_size: f64) -> Aabb {
        let x = rng.random_range(-extent..extent);
        let y = rng.random_range(-extent..extent);
        let width = rng.random_range(min_size..max_size);
        let height = rng.random_range(min_size..max_size);
        Aabb::from_origin_size(x, y, width, height)
    }

    #[test]
    fn test_unit_boxes_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut index = Hshg::new();
        for _ in 0..1000 {
            let x = rng.random_range(0.0..1000.0);
            let y = rng.random_range(0.0..1000.0);
            index.add_object(Aabb::from_origin_size(x, y, 1.0, 1.0)).unwrap();
        }
        assert_eq!(index.grid_count(), 1);
        assert_matches_brute_force(&index);
    }

    #[test]
    fn test_dense_boxes_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut index = Hshg::new();
        for _ in 0..1500 {
            let x = rng.random_range(0.0..60.0);
            let y = rng.random_range(0.0..60.0);
            index.add_object(Aabb::from_origin_size(x, y, 1.0, 1.0)).unwrap();
        }
        let pairs = index.query_for_collision_pairs();
        assert!(!pairs.is_empty());
        assert_matches_brute_force(&index);
    }

    #[test]
    fn test_mixed_sizes_match_brute_force() {
        let mut rng = StdRng::seed_from_u64(95756739);
        let mut index = Hshg::new();
        for i in 0..800 {
            // a few big boxes among many small ones
            let max_size = if i % 50 == 0 { 400.0 } else if i % 5 == 0 { 40.0 } else { 4.0 };
            index.add_object(random_box(&mut rng, 500.0, 0.0, max_size)).unwrap();
        }
        assert!(index.grid_count() > 2, "expected several grid levels");
        assert_matches_brute_force(&index);
    }

    #[test]
    fn test_match_after_movement_and_update() {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut index = Hshg::new();
        let keys: Vec<_> = (0..600)
            .map(|i| {
                let max_size = if i % 20 == 0 { 60.0 } else { 3.0 };
                index.add_object(random_box(&mut rng, 200.0, 0.5, max_size)).unwrap()
            })
            .collect();

        for _ in 0..10 {
            for &key in &keys {
                let dx = rng.random_range(-5.0..5.0);
                let dy = rng.random_range(-5.0..5.0);
                let aabb = index.get_mut(key).unwrap();
                *aabb = aabb.translate(dx, dy);
            }
            index.update().unwrap();
            index.assert_invariants();
            index.assert_hashes_current();
            assert_matches_brute_force(&index);
        }
    }

    #[test]
    fn test_match_after_removals() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut index = Hshg::new();
        let mut keys: Vec<_> = (0..400)
            .map(|_| index.add_object(random_box(&mut rng, 100.0, 0.1, 10.0)).unwrap())
            .collect();

        while keys.len() > 100 {
            let victim = keys.swap_remove(rng.random_range(0..keys.len()));
            index.remove_object(victim).unwrap();
        }
        index.assert_invariants();
        assert_matches_brute_force(&index);
    }

    #[test]
    fn test_far_away_objects_match_brute_force() {
        // Coordinates far outside one wrap of the torus alias onto the same
        // cells; the overlap test must still filter them out.
        let mut rng = StdRng::seed_from_u64(5);
        let mut index = Hshg::new();
        for _ in 0..500 {
            index.add_object(random_box(&mut rng, 1.0e6, 1.0, 2.0)).unwrap();
        }
        let cluster: Vec<_> = (0..20)
            .map(|i| index.add_object(Aabb::from_origin_size(1.0e5 + i as f64 * 0.5, -3.0e5, 1.0, 1.0)).unwrap())
            .collect();
        assert_eq!(cluster.len(), 20);
        assert_matches_brute_force(&index);
    }
}
