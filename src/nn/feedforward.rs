//! Two-layer feed-forward block
//!
//! Linear -> Norm -> Activation -> Linear -> Norm -> Activation.

use ndarray::Array2;
use rand::Rng;

use super::{Activation, Linear, Norm, NormKind};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct FeedForward {
    pub lin1: Linear,
    pub norm1: Norm,
    pub lin2: Linear,
    pub norm2: Norm,
    activation: Activation,
}

impl FeedForward {
    /// Build a block mapping `in_features` to `hidden` with the same
    /// normalization after both linear sub-layers
    pub fn new<R: Rng + ?Sized>(
        in_features: usize,
        hidden: usize,
        activation: Activation,
        norm: NormKind,
        rng: &mut R,
    ) -> Self {
        Self {
            lin1: Linear::new(in_features, hidden, rng),
            norm1: norm.build(hidden),
            lin2: Linear::new(hidden, hidden, rng),
            norm2: norm.build(hidden),
            activation,
        }
    }

    pub fn forward(&self, input: &Array2<f64>) -> Result<Array2<f64>> {
        let z1 = self.norm1.forward(&self.lin1.forward(input)?)?;
        let a1 = self.activation.forward(&z1);

        let z2 = self.norm2.forward(&self.lin2.forward(&a1)?)?;
        Ok(self.activation.forward(&z2))
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn in_features(&self) -> usize {
        self.lin1.in_features()
    }

    pub fn set_training(&mut self, training: bool) {
        self.norm1.set_training(training);
        self.norm2.set_training(training);
    }

    pub fn num_parameters(&self) -> usize {
        self.lin1.num_parameters()
            + self.norm1.num_parameters()
            + self.lin2.num_parameters()
            + self.norm2.num_parameters()
    }
}
