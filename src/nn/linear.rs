//! Fully connected layer

use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

use crate::error::{Error, Result};

/// Affine map `x · W + b`
#[derive(Debug, Clone)]
pub struct Linear {
    /// Weight matrix [in_features, out_features]
    pub weight: Array2<f64>,
    /// Bias vector [out_features]
    pub bias: Array1<f64>,
}

impl Linear {
    /// Create a linear layer with weights and bias drawn from
    /// `U(-1/sqrt(in), 1/sqrt(in))`
    pub fn new<R: Rng + ?Sized>(in_features: usize, out_features: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (in_features.max(1) as f64).sqrt();
        let dist = Uniform::new(-bound, bound);

        Self {
            weight: Array2::random_using((in_features, out_features), dist, rng),
            bias: Array1::random_using(out_features, dist, rng),
        }
    }

    /// Build from explicit parameters
    pub fn from_parts(weight: Array2<f64>, bias: Array1<f64>) -> Result<Self> {
        Error::check_width("linear bias", weight.ncols(), bias.len())?;
        Ok(Self { weight, bias })
    }

    pub fn in_features(&self) -> usize {
        self.weight.nrows()
    }

    pub fn out_features(&self) -> usize {
        self.weight.ncols()
    }

    /// Forward pass for input [rows, in_features]
    pub fn forward(&self, input: &Array2<f64>) -> Result<Array2<f64>> {
        Error::check_width("linear input", self.in_features(), input.ncols())?;
        Ok(input.dot(&self.weight) + &self.bias)
    }

    /// Number of trainable parameters
    pub fn num_parameters(&self) -> usize {
        self.weight.len() + self.bias.len()
    }
}
