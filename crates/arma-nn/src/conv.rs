//! ARMA graph convolution.
//!
//! An ARMA_K filter is approximated by K parallel stacks of recursive
//! one-hop propagations, averaged at the end:
//!
//! ```text
//! X_k^{(0)}   = X
//! X_k^{(t+1)} = sigma( L_hat X_k^{(t)} W_k^{(t)} + X V_k )      t = 0..T-1
//! X'          = (1/K) sum_k X_k^{(T)}
//!
//! L_hat = D^{-1/2} A D^{-1/2}
//! W_k^{(0)} : in_dim  -> out_dim    (initial transform)
//! W_k^{(t)} : out_dim -> out_dim    (deep transform, shared for t >= 1)
//! V_k       : in_dim  -> out_dim    (skip transform, always reads X)
//! ```
//!
//! Compared to a polynomial (Chebyshev) filter of the same depth, the
//! recursion realizes a rational frequency response, which gives sharper
//! filters with fewer parameters.
//!
//! The skip term always reads the stack's original input `X`, never the
//! previous layer's output. Dropout is applied to the skip term only.
//!
//! # Reference
//!
//! Bianchi et al., "Graph Neural Networks with Convolutional ARMA Filters",
//! IEEE TPAMI 2021.

use crate::config::ArmaConvConfig;
use crate::norm::degree_norm;
use crate::{Error, Result};
use arma_core::MessagePassing;
use candle_core::{Tensor, D};
use candle_nn::{linear_b, Linear, Module, VarBuilder};

/// Learned transforms of one filter stack.
struct Stack {
    /// Applied at t = 0 (in_dim -> out_dim).
    init: Linear,
    /// Applied at t > 0 (out_dim -> out_dim).
    deep: Linear,
    /// Applied to the original input at every t (in_dim -> out_dim).
    skip: Linear,
}

/// Auto-Regressive Moving Average graph convolution layer.
///
/// Parameters are registered under `w_0.{k}`, `w.{k}` and `v.{k}` for the
/// initial, deep and skip transforms of stack `k`.
pub struct ArmaConv {
    config: ArmaConvConfig,
    stacks: Vec<Stack>,
}

impl ArmaConv {
    /// Create a new ARMA layer.
    ///
    /// # Arguments
    /// - `config`: Dimensions, K, T, activation, dropout, bias
    /// - `vb`: Variable builder for parameter initialization
    pub fn new(config: ArmaConvConfig, vb: VarBuilder) -> Result<Self> {
        config.validate()?;

        let stacks = (0..config.num_stacks)
            .map(|k| -> Result<Stack> {
                Ok(Stack {
                    init: linear_b(config.in_dim, config.out_dim, config.bias, vb.pp("w_0").pp(k))?,
                    deep: linear_b(config.out_dim, config.out_dim, config.bias, vb.pp("w").pp(k))?,
                    skip: linear_b(config.in_dim, config.out_dim, config.bias, vb.pp("v").pp(k))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "ArmaConv {} -> {}: K={}, T={}, activation={:?}, dropout={}",
            config.in_dim,
            config.out_dim,
            config.num_stacks,
            config.num_layers,
            config.activation,
            config.dropout
        );

        Ok(Self { config, stacks })
    }

    pub fn config(&self) -> &ArmaConvConfig {
        &self.config
    }

    pub fn in_dim(&self) -> usize {
        self.config.in_dim
    }

    pub fn out_dim(&self) -> usize {
        self.config.out_dim
    }

    /// Forward pass.
    ///
    /// # Arguments
    /// - `graph`: Graph with N nodes, assumed undirected
    /// - `feats`: Node features (N x in_dim)
    /// - `train`: Enables dropout on the skip contribution
    ///
    /// # Returns
    /// - Node features (N x out_dim), rows aligned with `feats`
    pub fn forward<G: MessagePassing + ?Sized>(
        &self,
        graph: &G,
        feats: &Tensor,
        train: bool,
    ) -> Result<Tensor> {
        let rows = feats.dim(0)?;
        if rows != graph.num_nodes() {
            return Err(arma_core::Error::FeatureRows {
                expected: graph.num_nodes(),
                got: rows,
            }
            .into());
        }

        let norm = degree_norm(graph, feats.dtype(), feats.device())?;

        // validate() guarantees K >= 1
        let mut sum = Tensor::zeros((rows, self.config.out_dim), feats.dtype(), feats.device())?;
        for stack in &self.stacks {
            sum = (sum + self.propagate(stack, graph, feats, &norm, train)?)?;
        }

        let output = (sum / self.stacks.len() as f64)?;
        log::trace!("ArmaConv output {:?}", output.shape());
        Ok(output)
    }

    /// Run the T recursive layers of one stack starting from `init_feats`.
    fn propagate<G: MessagePassing + ?Sized>(
        &self,
        stack: &Stack,
        graph: &G,
        init_feats: &Tensor,
        norm: &Tensor,
        train: bool,
    ) -> Result<Tensor> {
        let mut h = init_feats.clone();

        for t in 0..self.config.num_layers {
            h = h.broadcast_mul(norm)?;
            h = graph.sum_neighbors(&h)?;
            h = h.broadcast_mul(norm)?;

            let transform = if t == 0 { &stack.init } else { &stack.deep };
            h = project(transform, &h)?;

            let skip = project(&stack.skip, init_feats)?;
            h = (h + dropout(&skip, self.config.dropout, train)?)?;

            if let Some(activation) = &self.config.activation {
                h = activation.forward(&h)?;
            }
        }

        Ok(h)
    }
}

/// Apply `linear`, checking the input width against the weight first.
pub(crate) fn project(linear: &Linear, x: &Tensor) -> Result<Tensor> {
    // weight is (out, in)
    let expected = linear.weight().dim(1)?;
    let got = x.dim(D::Minus1)?;
    if expected != got {
        return Err(Error::DimensionMismatch { expected, got });
    }
    Ok(linear.forward(x)?)
}

/// Inverted dropout, active only in training mode with `p > 0`.
pub(crate) fn dropout(x: &Tensor, p: f32, train: bool) -> Result<Tensor> {
    if train && p > 0.0 {
        Ok(candle_nn::ops::dropout(x, p)?)
    } else {
        Ok(x.clone())
    }
}
