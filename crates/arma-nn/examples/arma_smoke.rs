//! Smoke test: build both ARMA task stacks on a toy batch and run them.
//!
//! ```bash
//! RUST_LOG=debug cargo run -p arma-nn --example arma_smoke
//! ```

use arma_nn::{Activation, Arma4Gc, Arma4Nc, ArmaModelConfig, Graph};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let device = Device::Cpu;

    let config = ArmaModelConfig::new(8, 16, 3)
        .with_stacks(2)
        .with_layers(2)
        .with_activation(Some(Activation::Relu))
        .with_dropout(0.25);

    // Node classification on a 6-cycle
    let ring = Graph::from_undirected_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)])?;
    let x = Tensor::randn(0f32, 1f32, (ring.num_nodes(), 8), &device)?;

    let nc_vars = VarMap::new();
    let nc = Arma4Nc::new(&config, VarBuilder::from_varmap(&nc_vars, DType::F32, &device))?;
    let node_scores = nc.forward(&ring, &x, false)?;
    println!("node scores: {:?}", node_scores.shape());

    // Graph classification on a batch of two graphs (one with an isolated node)
    let path = Graph::from_undirected_edges(4, &[(0, 1), (1, 2)])?;
    let batch = Graph::batch(&[ring, path])?;
    let xb = Tensor::randn(0f32, 1f32, (batch.num_nodes(), 8), &device)?;

    let gc_vars = VarMap::new();
    let gc = Arma4Gc::new(&config, VarBuilder::from_varmap(&gc_vars, DType::F32, &device))?;
    let graph_scores = gc.forward(&batch, &xb, true)?;
    println!("graph scores: {:?}", graph_scores.shape());
    println!("{graph_scores}");

    let out_path = std::env::temp_dir().join("arma_gc.safetensors");
    gc_vars.save(&out_path)?;
    println!("saved {} tensors to {}", gc_vars.all_vars().len(), out_path.display());

    Ok(())
}
