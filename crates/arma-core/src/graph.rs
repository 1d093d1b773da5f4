//! Edge-list graph with batched-graph bookkeeping.
//!
//! Edges are stored as parallel `src`/`dst` index vectors, the layout
//! scatter-style aggregation wants. A batch is a disjoint union of graphs
//! whose node indices are offset so that graph `b` owns a contiguous range of
//! rows in any feature matrix.

use crate::{Error, Result};
use candle_core::Tensor;

/// Capabilities a message-passing layer needs from a graph.
///
/// ARMA convolutions only ever ask three things of the structure: how many
/// nodes it has, each node's in-degree, and the sum of neighbor features
/// along in-edges. Any graph engine exposing those can drive the layers.
pub trait MessagePassing {
    /// Number of nodes (rows of any feature matrix fed to this graph).
    fn num_nodes(&self) -> usize;

    /// In-degree per node, in node-index order.
    fn in_degrees(&self) -> Vec<u32>;

    /// Sum each node's in-neighbor rows: `out[i] = sum_{j -> i} h[j]`.
    ///
    /// Nodes without in-edges receive a zero row.
    fn sum_neighbors(&self, h: &Tensor) -> Result<Tensor>;

    /// Node count per graph when several graphs are batched together.
    fn batch_num_nodes(&self) -> Vec<usize> {
        vec![self.num_nodes()]
    }
}

/// An immutable directed graph.
///
/// Undirected graphs are represented with both edge directions present, in
/// which case in-degree equals out-degree. Nothing here enforces that; see
/// [`Graph::from_undirected_edges`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    num_nodes: usize,
    src: Vec<u32>,
    dst: Vec<u32>,
    /// Nodes per member graph (a single entry when unbatched).
    batch_num_nodes: Vec<usize>,
    /// Edges per member graph.
    batch_num_edges: Vec<usize>,
}

impl Graph {
    /// Build a graph from directed `(source, target)` pairs.
    ///
    /// Fails with [`Error::NodeOutOfRange`] if an endpoint is `>= num_nodes`,
    /// and with [`Error::IndexOverflow`] if `num_nodes` exceeds `u32::MAX`.
    pub fn from_edges(num_nodes: usize, edges: &[(usize, usize)]) -> Result<Self> {
        index_u32(num_nodes)?;
        let mut src = Vec::with_capacity(edges.len());
        let mut dst = Vec::with_capacity(edges.len());

        for &(s, d) in edges {
            for node in [s, d] {
                if node >= num_nodes {
                    return Err(Error::NodeOutOfRange { node, num_nodes });
                }
            }
            // both endpoints < num_nodes <= u32::MAX
            src.push(s as u32);
            dst.push(d as u32);
        }

        Ok(Self {
            num_nodes,
            batch_num_nodes: vec![num_nodes],
            batch_num_edges: vec![src.len()],
            src,
            dst,
        })
    }

    /// Build a graph from undirected pairs, inserting both directions.
    ///
    /// A self-loop `(i, i)` is inserted once.
    pub fn from_undirected_edges(num_nodes: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut directed = Vec::with_capacity(edges.len() * 2);
        for &(a, b) in edges {
            directed.push((a, b));
            if a != b {
                directed.push((b, a));
            }
        }
        Self::from_edges(num_nodes, &directed)
    }

    /// Disjoint union of `graphs`, in order.
    ///
    /// Graph `b`'s nodes occupy rows `offset_b..offset_b + n_b` of the
    /// batched node space, where `offset_b` is the node count of all graphs
    /// before it. Fails with [`Error::IndexOverflow`] if the combined node
    /// count exceeds `u32::MAX`.
    pub fn batch(graphs: &[Graph]) -> Result<Self> {
        if graphs.is_empty() {
            return Err(Error::EmptyBatch);
        }

        let total_edges = graphs.iter().map(|g| g.src.len()).sum();
        let mut src = Vec::with_capacity(total_edges);
        let mut dst = Vec::with_capacity(total_edges);
        let mut batch_num_nodes = Vec::new();
        let mut batch_num_edges = Vec::new();
        let mut offset = 0usize;

        for g in graphs {
            let total = offset
                .checked_add(g.num_nodes)
                .ok_or(Error::IndexOverflow { count: usize::MAX })?;
            index_u32(total)?;

            // offset + local index < total <= u32::MAX
            let base = offset as u32;
            src.extend(g.src.iter().map(|&s| s + base));
            dst.extend(g.dst.iter().map(|&d| d + base));
            batch_num_nodes.extend_from_slice(&g.batch_num_nodes);
            batch_num_edges.extend_from_slice(&g.batch_num_edges);
            offset = total;
        }

        log::debug!(
            "batched {} graphs: {} nodes, {} edges",
            batch_num_nodes.len(),
            offset,
            src.len()
        );

        Ok(Self {
            num_nodes: offset,
            src,
            dst,
            batch_num_nodes,
            batch_num_edges,
        })
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of directed edges.
    pub fn num_edges(&self) -> usize {
        self.src.len()
    }

    /// Number of member graphs (1 when unbatched).
    pub fn batch_size(&self) -> usize {
        self.batch_num_nodes.len()
    }

    /// Nodes per member graph.
    pub fn batch_num_nodes(&self) -> &[usize] {
        &self.batch_num_nodes
    }

    /// Edges per member graph.
    pub fn batch_num_edges(&self) -> &[usize] {
        &self.batch_num_edges
    }

    /// Iterate directed edges as `(source, target)`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.src
            .iter()
            .zip(&self.dst)
            .map(|(&s, &d)| (s as usize, d as usize))
    }

    /// In-degree per node.
    pub fn in_degrees(&self) -> Vec<u32> {
        count(&self.dst, self.num_nodes)
    }

    /// Out-degree per node.
    pub fn out_degrees(&self) -> Vec<u32> {
        count(&self.src, self.num_nodes)
    }

    /// Sum in-neighbor rows of `h` onto each target node.
    pub fn sum_neighbors(&self, h: &Tensor) -> Result<Tensor> {
        let rows = h.dim(0)?;
        if rows != self.num_nodes {
            return Err(Error::FeatureRows {
                expected: self.num_nodes,
                got: rows,
            });
        }

        let out = h.zeros_like()?;
        if self.src.is_empty() {
            return Ok(out);
        }

        // Gather source rows, then scatter-add them onto their targets
        let device = h.device();
        let src = Tensor::from_slice(&self.src, self.src.len(), device)?;
        let dst = Tensor::from_slice(&self.dst, self.dst.len(), device)?;
        let messages = h.index_select(&src, 0)?;
        Ok(out.index_add(&dst, &messages, 0)?)
    }
}

impl MessagePassing for Graph {
    fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    fn in_degrees(&self) -> Vec<u32> {
        Graph::in_degrees(self)
    }

    fn sum_neighbors(&self, h: &Tensor) -> Result<Tensor> {
        Graph::sum_neighbors(self, h)
    }

    fn batch_num_nodes(&self) -> Vec<usize> {
        self.batch_num_nodes.clone()
    }
}

fn index_u32(count: usize) -> Result<u32> {
    u32::try_from(count).map_err(|_| Error::IndexOverflow { count })
}

fn count(endpoints: &[u32], num_nodes: usize) -> Vec<u32> {
    let mut deg = vec![0u32; num_nodes];
    for &n in endpoints {
        deg[n as usize] += 1;
    }
    deg
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use proptest::prelude::*;

    fn path3() -> Graph {
        Graph::from_undirected_edges(3, &[(0, 1), (1, 2)]).unwrap()
    }

    #[test]
    fn test_undirected_degrees_match() {
        let g = path3();
        assert_eq!(g.num_edges(), 4);
        assert_eq!(g.in_degrees(), vec![1, 2, 1]);
        assert_eq!(g.in_degrees(), g.out_degrees());
    }

    #[test]
    fn test_self_loop_inserted_once() {
        let g = Graph::from_undirected_edges(2, &[(0, 0), (0, 1)]).unwrap();
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.in_degrees(), vec![2, 1]);
    }

    #[test]
    fn test_out_of_range_edge_rejected() {
        let err = Graph::from_edges(2, &[(0, 2)]).unwrap_err();
        assert!(matches!(err, Error::NodeOutOfRange { node: 2, num_nodes: 2 }));
    }

    #[test]
    fn test_sum_neighbors_path() {
        let device = Device::Cpu;
        let g = path3();
        let h = Tensor::new(&[[1f32, 10.], [2., 20.], [3., 30.]], &device).unwrap();

        let out = g.sum_neighbors(&h).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(out, vec![vec![2., 20.], vec![4., 40.], vec![2., 20.]]);
    }

    #[test]
    fn test_sum_neighbors_is_directional() {
        // Only 0 -> 1: node 1 receives, node 0 gets nothing
        let device = Device::Cpu;
        let g = Graph::from_edges(2, &[(0, 1)]).unwrap();
        let h = Tensor::new(&[[5f32], [7.]], &device).unwrap();

        let out = g.sum_neighbors(&h).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(out, vec![vec![0.], vec![5.]]);
    }

    #[test]
    fn test_sum_neighbors_no_edges() {
        let device = Device::Cpu;
        let g = Graph::from_edges(4, &[]).unwrap();
        let h = Tensor::ones((4, 3), DType::F32, &device).unwrap();

        let out = g.sum_neighbors(&h).unwrap();
        assert_eq!(out.dims(), &[4, 3]);
        assert_eq!(out.sum_all().unwrap().to_scalar::<f32>().unwrap(), 0.0);
    }

    #[test]
    fn test_sum_neighbors_row_mismatch() {
        let device = Device::Cpu;
        let g = path3();
        let h = Tensor::ones((5, 2), DType::F32, &device).unwrap();

        let err = g.sum_neighbors(&h).unwrap_err();
        assert!(matches!(err, Error::FeatureRows { expected: 3, got: 5 }));
    }

    #[test]
    fn test_batch_offsets_edges() {
        let a = path3();
        let b = Graph::from_undirected_edges(2, &[(0, 1)]).unwrap();
        let batched = Graph::batch(&[a, b]).unwrap();

        assert_eq!(batched.num_nodes(), 5);
        assert_eq!(batched.batch_size(), 2);
        assert_eq!(batched.batch_num_nodes(), &[3, 2]);
        assert_eq!(batched.batch_num_edges(), &[4, 2]);
        assert!(batched.edges().any(|e| e == (3, 4)));
        assert!(batched.edges().all(|(s, d)| (s < 3) == (d < 3)));
    }

    #[test]
    fn test_batch_of_batches_flattens() {
        let inner = Graph::batch(&[path3(), path3()]).unwrap();
        let outer = Graph::batch(&[inner, path3()]).unwrap();
        assert_eq!(outer.batch_num_nodes(), &[3, 3, 3]);
        assert_eq!(MessagePassing::batch_num_nodes(&outer), vec![3, 3, 3]);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_node_count_beyond_u32_rejected() {
        let n = u32::MAX as usize + 1;
        let err = Graph::from_edges(n, &[]).unwrap_err();
        assert!(matches!(err, Error::IndexOverflow { count } if count == n));
    }

    #[test]
    fn test_batch_beyond_u32_rejected() {
        // Edgeless graphs allocate nothing per node, so these stay cheap
        let big = Graph::from_edges(u32::MAX as usize, &[]).unwrap();
        let one = Graph::from_edges(1, &[]).unwrap();

        assert!(matches!(
            Graph::batch(&[big.clone(), one]),
            Err(Error::IndexOverflow { .. })
        ));
        assert_eq!(Graph::batch(&[big]).unwrap().num_nodes(), u32::MAX as usize);
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(Graph::batch(&[]), Err(Error::EmptyBatch)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn undirected_in_equals_out(
            n in 1usize..20,
            raw in proptest::collection::vec((0usize..20, 0usize..20), 0..40),
        ) {
            let edges: Vec<_> = raw.into_iter().map(|(a, b)| (a % n, b % n)).collect();
            let g = Graph::from_undirected_edges(n, &edges).unwrap();
            prop_assert_eq!(g.in_degrees(), g.out_degrees());
        }

        #[test]
        fn aggregate_total_matches_degree_weighted_sum(
            n in 1usize..12,
            raw in proptest::collection::vec((0usize..12, 0usize..12), 0..30),
        ) {
            // With h = node index, the aggregated total is sum_j out_deg(j) * j
            let edges: Vec<_> = raw.into_iter().map(|(a, b)| (a % n, b % n)).collect();
            let g = Graph::from_edges(n, &edges).unwrap();
            let values: Vec<f32> = (0..n).map(|i| i as f32).collect();
            let h = Tensor::from_vec(values, (n, 1), &Device::Cpu).unwrap();

            let total = g.sum_neighbors(&h).unwrap().sum_all().unwrap().to_scalar::<f32>().unwrap();
            let expected: f32 = g
                .out_degrees()
                .iter()
                .enumerate()
                .map(|(j, &d)| j as f32 * d as f32)
                .sum();
            prop_assert!((total - expected).abs() < 1e-3);
        }
    }
}
