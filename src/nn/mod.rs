//! Neural network building blocks
//!
//! Dense layers, normalization and activations on `ndarray` matrices laid out
//! as `[rows, features]`. These are the pieces the message-passing layers and
//! the model head are assembled from.

mod activation;
mod feedforward;
mod linear;
mod norm;

pub use activation::Activation;
pub use feedforward::FeedForward;
pub use linear::Linear;
pub use norm::{BatchNorm1d, LayerNorm, Norm, NormKind};
