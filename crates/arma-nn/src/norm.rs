//! Symmetric degree normalization.
//!
//! ARMA propagation wraps every aggregation in `D^{-1/2} (.) D^{-1/2}`. The
//! diagonal is kept as an `(N, 1)` column so it broadcasts across feature
//! columns.
//!
//! Degrees are clamped to at least 1 before the inverse square root, so an
//! isolated node gets factor 1.0, the same as a degree-one node. This changes
//! the effective weight of isolated nodes and is kept as-is: altering it
//! changes outputs on graphs with isolated nodes.

use crate::Result;
use arma_core::MessagePassing;
use candle_core::{DType, Device, Tensor};

/// Per-node factors `max(deg_in, 1)^{-1/2}`, in node order.
///
/// In-degree is used on the assumption that the graph is undirected
/// (in-degree == out-degree); directed inputs are not detected.
pub fn degree_norm_values<G: MessagePassing + ?Sized>(graph: &G) -> Vec<f32> {
    graph
        .in_degrees()
        .into_iter()
        .map(|d| (d.max(1) as f32).powf(-0.5))
        .collect()
}

/// Degree normalization as an `(N, 1)` tensor of the given dtype.
pub fn degree_norm<G: MessagePassing + ?Sized>(
    graph: &G,
    dtype: DType,
    device: &Device,
) -> Result<Tensor> {
    let values = degree_norm_values(graph);
    let n = values.len();
    Ok(Tensor::from_vec(values, (n, 1), device)?.to_dtype(dtype)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arma_core::Graph;

    #[test]
    fn test_isolated_node_clamped_to_degree_one() {
        // Node 2 is isolated, node 0 and 1 have degree one
        let g = Graph::from_undirected_edges(3, &[(0, 1)]).unwrap();
        let norm = degree_norm_values(&g);
        assert_eq!(norm[2], norm[0]);
        assert_eq!(norm[2], 1.0);
    }

    #[test]
    fn test_values_are_inverse_sqrt_degree() {
        // Star: hub 0 with four leaves
        let g = Graph::from_undirected_edges(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]).unwrap();
        let norm = degree_norm_values(&g);
        assert!((norm[0] - 0.5).abs() < 1e-6);
        for &leaf in &norm[1..] {
            assert!((leaf - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_tensor_shape_and_dtype() {
        let g = Graph::from_undirected_edges(4, &[(0, 1), (2, 3)]).unwrap();
        let t = degree_norm(&g, DType::F64, &Device::Cpu).unwrap();
        assert_eq!(t.dims(), &[4, 1]);
        assert_eq!(t.dtype(), DType::F64);
    }

    #[test]
    fn test_strictly_positive() {
        let g = Graph::from_edges(6, &[(0, 1), (1, 1), (2, 1), (5, 4)]).unwrap();
        assert!(degree_norm_values(&g).iter().all(|v| v.is_finite() && *v > 0.0));
    }
}
