//! Nearest neighbor search implementations

use surfcrate_core::{NearestNeighborSearch, Point3f};

/// One split of the tree
///
/// Children are addressed by position in the node arena.
#[derive(Debug, Clone)]
struct Node {
    /// Index into the point array
    point: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// KD-Tree over a fixed point set
///
/// The tree is built once and never modified. Each level splits at the median of
/// the points along `depth % 3`, found by selection rather than a full sort.
/// Duplicate coordinates are allowed; an empty point set gives an empty tree.
#[derive(Debug, Clone)]
pub struct KdTree {
    points: Vec<Point3f>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl KdTree {
    pub fn new(points: &[Point3f]) -> Self {
        let mut tree = Self {
            points: points.to_vec(),
            nodes: Vec::with_capacity(points.len()),
            root: None,
        };
        let mut order: Vec<usize> = (0..points.len()).collect();
        tree.root = tree.build(&mut order, 0);
        tree
    }

    fn build(&mut self, order: &mut [usize], depth: usize) -> Option<usize> {
        if order.is_empty() {
            return None;
        }

        let axis = depth % 3;
        let mid = order.len() / 2;
        let points = &self.points;
        order.select_nth_unstable_by(mid, |&a, &b| points[a][axis].total_cmp(&points[b][axis]));

        let id = self.nodes.len();
        self.nodes.push(Node {
            point: order[mid],
            axis,
            left: None,
            right: None,
        });

        let (lower, rest) = order.split_at_mut(mid);
        let left = self.build(lower, depth + 1);
        let right = self.build(&mut rest[1..], depth + 1);
        self.nodes[id].left = left;
        self.nodes[id].right = right;
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The indexed points, in the order they were given
    pub fn points(&self) -> &[Point3f] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&Point3f> {
        self.points.get(index)
    }

    /// Near and far child of `node` relative to `query`, plus the distance from
    /// the query to the splitting plane
    fn split(&self, node: &Node, query: &Point3f) -> (Option<usize>, Option<usize>, f32) {
        let diff = query[node.axis] - self.points[node.point][node.axis];
        if diff < 0.0 {
            (node.left, node.right, -diff)
        } else {
            (node.right, node.left, diff)
        }
    }

    fn radius_search(&self, id: usize, query: &Point3f, radius: f32, out: &mut Vec<(usize, f32)>) {
        let node = &self.nodes[id];
        let (near, far, plane) = self.split(node, query);

        if let Some(near) = near {
            self.radius_search(near, query, radius, out);
        }

        let distance = nalgebra::distance(query, &self.points[node.point]);
        if distance < radius {
            out.push((node.point, distance));
        }

        if plane < radius {
            if let Some(far) = far {
                self.radius_search(far, query, radius, out);
            }
        }
    }

    fn knn_search(&self, id: usize, query: &Point3f, k: usize, best: &mut Vec<(usize, f32)>) {
        let node = &self.nodes[id];
        let (near, far, plane) = self.split(node, query);

        if let Some(near) = near {
            self.knn_search(near, query, k, best);
        }

        let distance = nalgebra::distance(query, &self.points[node.point]);
        let at = best.partition_point(|&(_, d)| d <= distance);
        if at < k {
            best.insert(at, (node.point, distance));
            best.truncate(k);
        }

        let worst = best.last().map_or(f32::INFINITY, |&(_, d)| d);
        if best.len() < k || plane < worst {
            if let Some(far) = far {
                self.knn_search(far, query, k, best);
            }
        }
    }
}

impl NearestNeighborSearch for KdTree {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let mut best = Vec::with_capacity(k.min(self.points.len()) + 1);
        if let (Some(root), true) = (self.root, k > 0) {
            self.knn_search(root, query, k, &mut best);
        }
        best
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        let mut found = Vec::new();
        if let Some(root) = self.root {
            self.radius_search(root, query, radius, &mut found);
        }
        found
    }
}

/// Simple brute force nearest neighbor search for small datasets
///
/// Uses the same distance and comparison rules as [`KdTree`], which makes it a
/// reference for checking the tree.
pub struct BruteForceSearch {
    points: Vec<Point3f>,
}

impl BruteForceSearch {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

impl NearestNeighborSearch for BruteForceSearch {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let mut distances: Vec<(usize, f32)> = self
            .points
            .iter()
            .enumerate()
            .map(|(idx, point)| (idx, nalgebra::distance(query, point)))
            .collect();

        distances.sort_by(|a, b| a.1.total_cmp(&b.1));
        distances.truncate(k);
        distances
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(idx, point)| {
                let distance = nalgebra::distance(query, point);
                (distance < radius).then_some((idx, distance))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points(n: usize) -> Vec<Point3f> {
        let mut points = Vec::new();
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    points.push(Point3f::new(i as f32, j as f32, k as f32));
                }
            }
        }
        points
    }

    fn sorted_indices(mut found: Vec<(usize, f32)>) -> Vec<usize> {
        found.sort_by_key(|&(i, _)| i);
        found.into_iter().map(|(i, _)| i).collect()
    }

    #[test]
    fn test_empty_tree() {
        let tree = KdTree::new(&[]);
        let query = Point3f::origin();

        assert!(tree.is_empty());
        assert!(tree.find_k_nearest(&query, 3).is_empty());
        assert!(tree.find_radius_neighbors(&query, 10.0).is_empty());
        assert!(tree.find_nearest(&query).is_none());
    }

    #[test]
    fn test_radius_is_strict() {
        let points = vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0)];
        let tree = KdTree::new(&points);

        let found = tree.find_radius_neighbors(&Point3f::origin(), 1.0);
        assert_eq!(sorted_indices(found), vec![0]);

        let found = tree.find_radius_neighbors(&Point3f::origin(), 1.0001);
        assert_eq!(sorted_indices(found), vec![0, 1]);
    }

    #[test]
    fn test_radius_matches_brute_force_on_grid() {
        let points = grid_points(5);
        let tree = KdTree::new(&points);
        let brute = BruteForceSearch::new(&points);

        for query in [
            Point3f::new(2.0, 2.0, 2.0),
            Point3f::new(0.3, 4.1, 1.7),
            Point3f::new(-1.0, -1.0, -1.0),
        ] {
            for radius in [0.5, 1.0, 1.5, 2.5] {
                assert_eq!(
                    sorted_indices(tree.find_radius_neighbors(&query, radius)),
                    sorted_indices(brute.find_radius_neighbors(&query, radius)),
                    "query {:?} radius {}",
                    query,
                    radius
                );
            }
        }
    }

    #[test]
    fn test_k_nearest_is_sorted() {
        let points = grid_points(4);
        let tree = KdTree::new(&points);
        let found = tree.find_k_nearest(&Point3f::new(1.2, 1.9, 0.4), 7);

        assert_eq!(found.len(), 7);
        assert!(found.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(found[0].0, (1 * 4 + 2) * 4);
    }

    #[test]
    fn test_k_larger_than_tree() {
        let points = vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(0.0, 1.0, 0.0)];
        let tree = KdTree::new(&points);

        assert_eq!(tree.find_k_nearest(&Point3f::origin(), 5).len(), 2);
        assert!(tree.find_k_nearest(&Point3f::origin(), 0).is_empty());
    }

    #[test]
    fn test_duplicate_points() {
        let points = vec![Point3f::new(1.0, 1.0, 1.0); 9];
        let tree = KdTree::new(&points);

        assert_eq!(tree.find_radius_neighbors(&Point3f::new(1.0, 1.0, 1.0), 0.1).len(), 9);
        assert_eq!(tree.find_k_nearest(&Point3f::origin(), 4).len(), 4);
    }
}
