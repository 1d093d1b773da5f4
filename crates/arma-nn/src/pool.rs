//! Graph-level readout.

use crate::Result;
use arma_core::MessagePassing;
use candle_core::Tensor;

/// Average node features within each graph of a batch.
///
/// Returns `(B, F)` for `B` batched graphs. Each row is a segment sum built
/// with `index_add` over the graph id of every node, divided by the graph's
/// node count, so memory stays linear in `N + B`. A graph with no nodes pools
/// to a zero row.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvgPooling;

impl AvgPooling {
    pub fn new() -> Self {
        Self
    }

    pub fn forward<G: MessagePassing + ?Sized>(&self, graph: &G, feats: &Tensor) -> Result<Tensor> {
        let sizes = graph.batch_num_nodes();
        let (n, f) = feats.dims2()?;
        let total: usize = sizes.iter().sum();
        if n != total {
            return Err(arma_core::Error::FeatureRows { expected: total, got: n }.into());
        }

        let num_graphs = sizes.len();
        let device = feats.device();

        let mut ids = Vec::with_capacity(n);
        for (b, &size) in sizes.iter().enumerate() {
            let id = u32::try_from(b).map_err(|_| arma_core::Error::IndexOverflow { count: b })?;
            ids.extend(std::iter::repeat(id).take(size));
        }

        let mut sums = Tensor::zeros((num_graphs, f), feats.dtype(), device)?;
        if n > 0 {
            let ids = Tensor::from_vec(ids, n, device)?;
            sums = sums.index_add(&ids, &feats.contiguous()?, 0)?;
        }

        // Empty graphs divide a zero row by 1
        let counts: Vec<f32> = sizes.iter().map(|&size| size.max(1) as f32).collect();
        let counts = Tensor::from_vec(counts, (num_graphs, 1), device)?.to_dtype(feats.dtype())?;
        Ok(sums.broadcast_div(&counts)?)
    }
}
