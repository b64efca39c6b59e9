//! Static kd-tree over spot coordinates for nearest-neighbor matching.

/// Nearest stored point returned by [`SpotTree::nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the point in the slice passed to [`SpotTree::build`].
    pub index: usize,
    /// Euclidean distance to the query.
    pub distance: f64,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        dim: usize,
        value: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        start: usize,
        end: usize,
    },
}

const LEAF_SIZE: usize = 8;

/// kd-tree over `DIM`-dimensional points stored in a flat node array.
#[derive(Debug, Clone)]
pub struct SpotTree<const DIM: usize> {
    nodes: Vec<Node>,
    points: Vec<[f64; DIM]>,
    order: Vec<usize>,
}

impl<const DIM: usize> SpotTree<DIM> {
    /// Builds the tree; neighbors report indices into `points`.
    pub fn build(points: &[[f64; DIM]]) -> Self {
        let mut order: Vec<usize> = (0..points.len()).collect();
        let mut tree = Self {
            nodes: Vec::new(),
            points: Vec::with_capacity(points.len()),
            order: Vec::new(),
        };
        if !points.is_empty() {
            tree.split(points, &mut order, 0, points.len());
        }
        tree.points = order.iter().map(|&idx| points[idx]).collect();
        tree.order = order;
        tree
    }

    fn split(
        &mut self,
        points: &[[f64; DIM]],
        order: &mut [usize],
        start: usize,
        end: usize,
    ) -> usize {
        if end - start <= LEAF_SIZE {
            self.nodes.push(Node::Leaf { start, end });
            return self.nodes.len() - 1;
        }

        let dim = widest_dimension(points, &order[start..end]);
        order[start..end].sort_by(|a, b| points[*a][dim].total_cmp(&points[*b][dim]));
        let median = start + (end - start) / 2;
        let value = points[order[median]][dim];

        let node_idx = self.nodes.len();
        self.nodes.push(Node::Leaf { start: 0, end: 0 });
        let left = self.split(points, order, start, median);
        let right = self.split(points, order, median, end);
        self.nodes[node_idx] = Node::Split {
            dim,
            value,
            left,
            right,
        };
        node_idx
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closest point to `query`; equidistant points resolve to the lowest index.
    ///
    /// Returns `None` when no stored point has a finite distance to `query`.
    pub fn nearest(&self, query: &[f64; DIM]) -> Option<Neighbor> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best = (usize::MAX, f64::INFINITY);
        self.descend(0, query, &mut best);
        // NaN coordinates never compare, leaving the seed untouched
        if best.0 == usize::MAX {
            return None;
        }
        Some(Neighbor {
            index: best.0,
            distance: best.1.sqrt(),
        })
    }

    /// Closest point no further than `radius` from `query`.
    pub fn nearest_within(&self, query: &[f64; DIM], radius: f64) -> Option<Neighbor> {
        self.nearest(query).filter(|n| n.distance <= radius)
    }

    fn descend(&self, node_idx: usize, query: &[f64; DIM], best: &mut (usize, f64)) {
        match self.nodes[node_idx] {
            Node::Leaf { start, end } => {
                for pos in start..end {
                    let dsq = squared_distance(query, &self.points[pos]);
                    let index = self.order[pos];
                    if dsq < best.1 || (dsq == best.1 && index < best.0) {
                        *best = (index, dsq);
                    }
                }
            }
            Node::Split {
                dim,
                value,
                left,
                right,
            } => {
                let diff = query[dim] - value;
                let (near, far) = if diff <= 0.0 { (left, right) } else { (right, left) };
                self.descend(near, query, best);
                if diff * diff <= best.1 {
                    self.descend(far, query, best);
                }
            }
        }
    }
}

fn widest_dimension<const DIM: usize>(points: &[[f64; DIM]], order: &[usize]) -> usize {
    let mut best_dim = 0;
    let mut best_spread = f64::NEG_INFINITY;
    for dim in 0..DIM {
        let (lo, hi) = order.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &idx| {
            let v = points[idx][dim];
            (lo.min(v), hi.max(v))
        });
        if hi - lo > best_spread {
            best_spread = hi - lo;
            best_dim = dim;
        }
    }
    best_dim
}

fn squared_distance<const DIM: usize>(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
