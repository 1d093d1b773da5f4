//! Task stacks built from [`ArmaConv`] layers.
//!
//! - [`Arma4Nc`]: two convolutions, per-node scores (node classification)
//! - [`Arma4Gc`]: three convolutions, average readout, linear head
//!   (graph classification)
//!
//! Both return raw scores; softmax and loss belong to the training harness.
//! Between layers the stacks apply ReLU followed by dropout, independent of
//! the activation configured inside the convolutions.

use crate::config::ArmaModelConfig;
use crate::conv::{dropout, project, ArmaConv};
use crate::pool::AvgPooling;
use crate::Result;
use arma_core::MessagePassing;
use candle_core::Tensor;
use candle_nn::{linear, Linear, VarBuilder};

/// Node classification: `ArmaConv -> relu -> dropout -> ArmaConv`.
///
/// Parameters live under `conv1.*` and `conv2.*`.
pub struct Arma4Nc {
    conv1: ArmaConv,
    conv2: ArmaConv,
    dropout: f32,
}

impl Arma4Nc {
    pub fn new(config: &ArmaModelConfig, vb: VarBuilder) -> Result<Self> {
        config.validate()?;

        let conv1 = ArmaConv::new(config.conv(config.in_dim, config.hid_dim), vb.pp("conv1"))?;
        let conv2 = ArmaConv::new(config.conv(config.hid_dim, config.out_dim), vb.pp("conv2"))?;

        log::debug!(
            "Arma4Nc {} -> {} -> {}",
            config.in_dim,
            config.hid_dim,
            config.out_dim
        );

        Ok(Self {
            conv1,
            conv2,
            dropout: config.dropout,
        })
    }

    /// Per-node scores `(N, out_dim)`.
    pub fn forward<G: MessagePassing + ?Sized>(
        &self,
        graph: &G,
        feats: &Tensor,
        train: bool,
    ) -> Result<Tensor> {
        let h = self.conv1.forward(graph, feats, train)?.relu()?;
        let h = dropout(&h, self.dropout, train)?;
        self.conv2.forward(graph, &h, train)
    }
}

/// Graph classification: three `ArmaConv` layers, average pooling and a
/// linear classifier.
///
/// ```text
/// conv1 -> relu -> dropout
/// conv2 -> relu -> dropout
/// conv3 -> relu -> dropout
/// avg pool -> relu -> dropout -> fc
/// ```
///
/// Parameters live under `conv1.*`, `conv2.*`, `conv3.*` and `fc.*`.
pub struct Arma4Gc {
    convs: [ArmaConv; 3],
    pool: AvgPooling,
    fc: Linear,
    dropout: f32,
}

impl Arma4Gc {
    pub fn new(config: &ArmaModelConfig, vb: VarBuilder) -> Result<Self> {
        config.validate()?;

        let (in_dim, hid_dim) = (config.in_dim, config.hid_dim);
        let convs = [
            ArmaConv::new(config.conv(in_dim, hid_dim), vb.pp("conv1"))?,
            ArmaConv::new(config.conv(hid_dim, hid_dim), vb.pp("conv2"))?,
            ArmaConv::new(config.conv(hid_dim, hid_dim), vb.pp("conv3"))?,
        ];
        let fc = linear(hid_dim, config.out_dim, vb.pp("fc"))?;

        log::debug!(
            "Arma4Gc {} -> {} (x3) -> {}",
            in_dim,
            hid_dim,
            config.out_dim
        );

        Ok(Self {
            convs,
            pool: AvgPooling::new(),
            fc,
            dropout: config.dropout,
        })
    }

    /// One score row per graph: `(batch_size, out_dim)`.
    pub fn forward<G: MessagePassing + ?Sized>(
        &self,
        graph: &G,
        feats: &Tensor,
        train: bool,
    ) -> Result<Tensor> {
        let mut h = feats.clone();
        for conv in &self.convs {
            h = conv.forward(graph, &h, train)?.relu()?;
            h = dropout(&h, self.dropout, train)?;
        }

        let pooled = self.pool.forward(graph, &h)?.relu()?;
        let pooled = dropout(&pooled, self.dropout, train)?;
        project(&self.fc, &pooled)
    }
}
