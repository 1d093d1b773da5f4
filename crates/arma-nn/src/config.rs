//! Layer and model configuration.
//!
//! Configurations are plain serde structs so a training harness can read them
//! from JSON (or any serde format) next to its own settings. Only the
//! dimensions are required; everything else has a default.

use crate::{Error, Result};
use candle_core::Tensor;
use candle_nn::Module;
use serde::{Deserialize, Serialize};

/// Element-wise nonlinearity applied after each ARMA layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    /// ELU with alpha = 1.
    Elu,
    /// Leaky ReLU with the given negative slope.
    LeakyRelu(f64),
    Tanh,
    Sigmoid,
}

impl Module for Activation {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match *self {
            Self::Relu => xs.relu(),
            Self::Elu => xs.elu(1.0),
            Self::LeakyRelu(slope) => candle_nn::ops::leaky_relu(xs, slope),
            Self::Tanh => xs.tanh(),
            Self::Sigmoid => candle_nn::ops::sigmoid(xs),
        }
    }
}

fn default_num_stacks() -> usize {
    2
}

fn default_num_layers() -> usize {
    1
}

fn default_bias() -> bool {
    true
}

/// Configuration for a single [`ArmaConv`](crate::conv::ArmaConv).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmaConvConfig {
    /// Input feature width.
    pub in_dim: usize,
    /// Output feature width.
    pub out_dim: usize,
    /// Number of parallel filter stacks (K).
    #[serde(default = "default_num_stacks")]
    pub num_stacks: usize,
    /// Recursive depth per stack (T).
    #[serde(default = "default_num_layers")]
    pub num_layers: usize,
    /// Nonlinearity after each layer; identity when `None`.
    #[serde(default)]
    pub activation: Option<Activation>,
    /// Dropout probability on the skip contribution.
    #[serde(default)]
    pub dropout: f32,
    /// Whether the linear transforms carry a bias.
    #[serde(default = "default_bias")]
    pub bias: bool,
}

impl ArmaConvConfig {
    /// Config with the given dimensions and default options
    /// (K = 2, T = 1, no activation, no dropout, bias on).
    pub fn new(in_dim: usize, out_dim: usize) -> Self {
        Self {
            in_dim,
            out_dim,
            num_stacks: default_num_stacks(),
            num_layers: default_num_layers(),
            activation: None,
            dropout: 0.0,
            bias: default_bias(),
        }
    }

    pub fn with_stacks(mut self, num_stacks: usize) -> Self {
        self.num_stacks = num_stacks;
        self
    }

    pub fn with_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    pub fn with_activation(mut self, activation: Option<Activation>) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_dropout(mut self, dropout: f32) -> Self {
        self.dropout = dropout;
        self
    }

    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }

    /// Check that every option is in range.
    pub fn validate(&self) -> Result<()> {
        check_dim("in_dim", self.in_dim)?;
        check_dim("out_dim", self.out_dim)?;
        check_dim("num_stacks", self.num_stacks)?;
        check_dim("num_layers", self.num_layers)?;
        check_dropout(self.dropout)
    }
}

/// Configuration shared by the node- and graph-classification stacks.
///
/// Every inner convolution receives the same K, T, activation and dropout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmaModelConfig {
    pub in_dim: usize,
    pub hid_dim: usize,
    pub out_dim: usize,
    #[serde(default = "default_num_stacks")]
    pub num_stacks: usize,
    #[serde(default = "default_num_layers")]
    pub num_layers: usize,
    #[serde(default)]
    pub activation: Option<Activation>,
    /// Used both inside the convolutions and between layers.
    #[serde(default)]
    pub dropout: f32,
}

impl ArmaModelConfig {
    pub fn new(in_dim: usize, hid_dim: usize, out_dim: usize) -> Self {
        Self {
            in_dim,
            hid_dim,
            out_dim,
            num_stacks: default_num_stacks(),
            num_layers: default_num_layers(),
            activation: None,
            dropout: 0.0,
        }
    }

    pub fn with_stacks(mut self, num_stacks: usize) -> Self {
        self.num_stacks = num_stacks;
        self
    }

    pub fn with_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    pub fn with_activation(mut self, activation: Option<Activation>) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_dropout(mut self, dropout: f32) -> Self {
        self.dropout = dropout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_dim("in_dim", self.in_dim)?;
        check_dim("hid_dim", self.hid_dim)?;
        check_dim("out_dim", self.out_dim)?;
        check_dim("num_stacks", self.num_stacks)?;
        check_dim("num_layers", self.num_layers)?;
        check_dropout(self.dropout)
    }

    /// Inner convolution config for the given widths (bias always on).
    pub fn conv(&self, in_dim: usize, out_dim: usize) -> ArmaConvConfig {
        ArmaConvConfig {
            in_dim,
            out_dim,
            num_stacks: self.num_stacks,
            num_layers: self.num_layers,
            activation: self.activation,
            dropout: self.dropout,
            bias: true,
        }
    }
}

fn check_dim(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidConfig(format!("{name} must be at least 1")));
    }
    Ok(())
}

fn check_dropout(p: f32) -> Result<()> {
    if !(0.0..1.0).contains(&p) {
        return Err(Error::InvalidConfig(format!(
            "dropout must be in [0, 1), got {p}"
        )));
    }
    Ok(())
}
