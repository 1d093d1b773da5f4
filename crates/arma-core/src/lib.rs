//! Graph structure for message-passing layers.
//!
//! `arma-core` holds the pieces an ARMA convolution consumes but does not own:
//! the node/edge structure, per-node degrees, and the sum-over-in-neighbors
//! aggregation primitive. It sits below `arma-nn`.
//!
//! - [`Graph`]: immutable edge list, optionally a disjoint batch of graphs
//! - [`MessagePassing`]: the capabilities a convolution needs from a graph
//!
//! # Example
//!
//! ```rust
//! use arma_core::{Graph, MessagePassing};
//! use candle_core::{Device, Tensor};
//!
//! // Path graph 0 - 1 - 2
//! let g = Graph::from_undirected_edges(3, &[(0, 1), (1, 2)]).unwrap();
//! assert_eq!(g.in_degrees(), vec![1, 2, 1]);
//!
//! let h = Tensor::new(&[[1f32], [2.], [3.]], &Device::Cpu).unwrap();
//! let agg = g.sum_neighbors(&h).unwrap();
//! assert_eq!(agg.to_vec2::<f32>().unwrap(), vec![vec![2.], vec![4.], vec![2.]]);
//! ```

pub mod error;
pub mod graph;

pub use error::{Error, Result};
pub use graph::{Graph, MessagePassing};
