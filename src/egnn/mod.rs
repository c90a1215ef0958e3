//! Equivariant Graph Neural Network Module
//!
//! Message passing over point clouds with 3D positions. Only edge lengths
//! enter the messages, so predictions are invariant to rotations and
//! translations of the input and equivariant to node permutations.

mod aggregate;
mod config;
mod graph;
mod layer;
mod network;
mod pool;
mod rff;

pub use aggregate::Aggregation;
pub use config::EGNNConfig;
pub use graph::{Graph, GraphBatch, GraphEdge, GraphNode};
pub use layer::EGNNLayer;
pub use network::EGNNModel;
pub use pool::Pooling;
pub use rff::RandomFourierFeatures;
