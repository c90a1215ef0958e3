//! # Equivariant GNN Library
//!
//! A Rust implementation of E(n) Equivariant Graph Neural Networks for
//! point clouds and molecular graphs.
//!
//! ## Overview
//!
//! The network only looks at pairwise distances between nodes, which gives it
//! the symmetries of 3D point data:
//! - Permutation equivariance: node ordering doesn't affect graph predictions
//! - Rotation invariance: rotating a molecule leaves the output unchanged
//! - Translation invariance: only relative positions matter
//!
//! ## Architecture
//!
//! - `nn`: Linear layers, normalization and activations on `ndarray`
//! - `egnn`: Fourier distance features, message-passing layer and full model
//! - `utils`: JSON configuration IO
//!
//! ## Example
//!
//! ```rust
//! use equivariant_gnn::{EGNNConfig, EGNNModel, Graph, GraphBatch, GraphNode};
//!
//! # fn main() -> equivariant_gnn::Result<()> {
//! let water = Graph::fully_connected(vec![
//!     GraphNode::new(vec![8.0], [0.0, 0.0, 0.0]),
//!     GraphNode::new(vec![1.0], [0.96, 0.0, 0.0]),
//!     GraphNode::new(vec![1.0], [-0.24, 0.93, 0.0]),
//! ]);
//! let batch = GraphBatch::collate(&[water])?;
//!
//! let model = EGNNModel::new(EGNNConfig::new(1, 32, 3))?;
//! let prediction = model.forward(&batch)?;
//! assert_eq!(prediction.dim(), (1, 1));
//! # Ok(())
//! # }
//! ```

pub mod egnn;
pub mod error;
pub mod nn;
pub mod utils;

// Re-export commonly used types
pub use egnn::{
    Aggregation, EGNNConfig, EGNNLayer, EGNNModel, Graph, GraphBatch, GraphEdge, GraphNode,
    Pooling, RandomFourierFeatures,
};
pub use error::{Error, Result};
pub use nn::{Activation, NormKind};
pub use utils::{load_config, load_json, save_json};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Spatial dimension of node positions
pub const COORD_DIM: usize = 3;
