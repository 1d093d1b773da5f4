//! ARMA graph convolutions on candle.
//!
//! `arma-nn` provides the Auto-Regressive Moving Average convolution
//! ([`ArmaConv`]) and two task stacks built on it. It consumes graph
//! structure from `arma-core` and exposes pure forward passes; optimizers,
//! losses and data loading belong to the caller.
//!
//! # Modules
//!
//! - [`conv`]: the ARMA convolution layer
//! - [`norm`]: symmetric degree normalization
//! - [`pool`]: graph-level average readout
//! - [`models`]: [`Arma4Nc`] (node classification), [`Arma4Gc`] (graph classification)
//! - [`config`]: serde configurations and activations
//!
//! # Parameters
//!
//! Layers register their weights through a `VarBuilder`. Backed by a
//! `VarMap`, the parameters train with candle's autograd and persist with
//! `VarMap::save` / `VarMap::load` (safetensors).
//!
//! # Example: Node Classification Forward Pass
//!
//! ```rust
//! use arma_nn::{Activation, Arma4Nc, ArmaModelConfig, Graph};
//! use candle_core::{DType, Device, Tensor};
//! use candle_nn::{VarBuilder, VarMap};
//!
//! let device = Device::Cpu;
//! let varmap = VarMap::new();
//! let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
//!
//! let config = ArmaModelConfig::new(16, 32, 7)
//!     .with_stacks(2)
//!     .with_layers(2)
//!     .with_activation(Some(Activation::Relu))
//!     .with_dropout(0.5);
//! let model = Arma4Nc::new(&config, vb).unwrap();
//!
//! let graph = Graph::from_undirected_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
//! let x = Tensor::randn(0f32, 1f32, (4, 16), &device).unwrap();
//! let scores = model.forward(&graph, &x, false).unwrap();
//! assert_eq!(scores.dims(), &[4, 7]);
//! ```

pub mod config;
pub mod conv;
pub mod error;
pub mod models;
pub mod norm;
pub mod pool;

pub use arma_core::{Graph, MessagePassing};
pub use config::{Activation, ArmaConvConfig, ArmaModelConfig};
pub use conv::ArmaConv;
pub use error::{Error, Result};
pub use models::{Arma4Gc, Arma4Nc};
pub use pool::AvgPooling;
