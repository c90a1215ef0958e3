//! Normalization layers

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

const NORM_EPS: f64 = 1e-5;

/// Layer normalization over the feature axis of each row
#[derive(Debug, Clone)]
pub struct LayerNorm {
    /// Learnable scale parameter
    pub gamma: Array1<f64>,
    /// Learnable shift parameter
    pub beta: Array1<f64>,
    /// Epsilon for numerical stability
    pub eps: f64,
}

impl LayerNorm {
    /// Create a new LayerNorm layer
    pub fn new(normalized_shape: usize) -> Self {
        Self {
            gamma: Array1::ones(normalized_shape),
            beta: Array1::zeros(normalized_shape),
            eps: NORM_EPS,
        }
    }

    /// Forward pass for input [rows, features]
    pub fn forward(&self, input: &Array2<f64>) -> Result<Array2<f64>> {
        let dim = self.gamma.len();
        Error::check_width("layer norm input", dim, input.ncols())?;

        let mut output = input.clone();
        for mut row in output.axis_iter_mut(Axis(0)) {
            let mean = row.sum() / dim as f64;
            let variance = row.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / dim as f64;
            let std = (variance + self.eps).sqrt();
            for (j, val) in row.iter_mut().enumerate() {
                *val = (*val - mean) / std * self.gamma[j] + self.beta[j];
            }
        }

        Ok(output)
    }
}

/// Batch normalization over rows, one statistic per feature
#[derive(Debug, Clone)]
pub struct BatchNorm1d {
    /// Scale parameter (gamma)
    pub weight: Array1<f64>,
    /// Shift parameter (beta)
    pub bias: Array1<f64>,
    /// Running mean, used in evaluation mode
    pub running_mean: Array1<f64>,
    /// Running variance, used in evaluation mode
    pub running_var: Array1<f64>,
    /// Small constant for numerical stability
    pub eps: f64,
    /// Training mode: normalize with batch statistics
    pub training: bool,
}

impl BatchNorm1d {
    /// Create a new BatchNorm1d layer
    pub fn new(num_features: usize) -> Self {
        Self {
            weight: Array1::ones(num_features),
            bias: Array1::zeros(num_features),
            running_mean: Array1::zeros(num_features),
            running_var: Array1::ones(num_features),
            eps: NORM_EPS,
            training: true,
        }
    }

    /// Forward pass for input [rows, features].
    ///
    /// Running statistics are read in evaluation mode but never written here.
    pub fn forward(&self, input: &Array2<f64>) -> Result<Array2<f64>> {
        Error::check_width("batch norm input", self.weight.len(), input.ncols())?;

        if input.nrows() == 0 {
            return Ok(input.clone());
        }
        if self.training && input.nrows() == 1 {
            return Err(Error::InvalidBatch(
                "batch norm needs more than one row in training mode".to_string(),
            ));
        }

        let (mean, var) = if self.training {
            let mean = input.sum_axis(Axis(0)) / input.nrows() as f64;
            let var = input.var_axis(Axis(0), 0.0);
            (mean, var)
        } else {
            (self.running_mean.clone(), self.running_var.clone())
        };

        let scale = &self.weight / &var.mapv(|v| (v + self.eps).sqrt());
        Ok((input - &mean) * &scale + &self.bias)
    }
}

/// Which normalization to place after each linear sub-layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormKind {
    #[default]
    Layer,
    Batch,
    None,
}

impl NormKind {
    /// Instantiate the normalization for `dim` features
    pub fn build(self, dim: usize) -> Norm {
        match self {
            NormKind::Layer => Norm::Layer(LayerNorm::new(dim)),
            NormKind::Batch => Norm::Batch(BatchNorm1d::new(dim)),
            NormKind::None => Norm::Identity,
        }
    }
}

impl FromStr for NormKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "layer" => Ok(NormKind::Layer),
            "batch" => Ok(NormKind::Batch),
            "none" => Ok(NormKind::None),
            _ => Err(Error::unknown("norm", s)),
        }
    }
}

impl fmt::Display for NormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormKind::Layer => write!(f, "layer"),
            NormKind::Batch => write!(f, "batch"),
            NormKind::None => write!(f, "none"),
        }
    }
}

/// A normalization strategy chosen at construction time
#[derive(Debug, Clone)]
pub enum Norm {
    Layer(LayerNorm),
    Batch(BatchNorm1d),
    Identity,
}

impl Norm {
    pub fn forward(&self, input: &Array2<f64>) -> Result<Array2<f64>> {
        match self {
            Norm::Layer(norm) => norm.forward(input),
            Norm::Batch(norm) => norm.forward(input),
            Norm::Identity => Ok(input.clone()),
        }
    }

    /// Switch batch norm between batch and running statistics
    pub fn set_training(&mut self, training: bool) {
        if let Norm::Batch(norm) = self {
            norm.training = training;
        }
    }

    pub fn num_parameters(&self) -> usize {
        match self {
            Norm::Layer(norm) => norm.gamma.len() + norm.beta.len(),
            Norm::Batch(norm) => norm.weight.len() + norm.bias.len(),
            Norm::Identity => 0,
        }
    }
}
