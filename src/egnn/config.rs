//! E-GNN Configuration
//!
//! Configuration structures for Equivariant GNN models.

use serde::{Deserialize, Serialize};

use super::aggregate::Aggregation;
use super::pool::Pooling;
use crate::error::{Error, Result};
use crate::nn::{Activation, NormKind};

/// Configuration for E-GNN model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EGNNConfig {
    /// Number of message-passing layers
    pub depth: usize,

    /// Embedding width throughout the network
    pub hidden_features: usize,

    /// Input node feature width
    pub node_features: usize,

    /// Prediction width
    pub out_features: usize,

    /// Nonlinearity in every sub-network
    pub activation: Activation,

    /// Normalization after each linear sub-layer
    pub norm: NormKind,

    /// Message aggregation operator
    pub aggr: Aggregation,

    /// Graph-level readout
    pub pool: Pooling,

    /// Add each layer's output to its input
    pub residual: bool,

    /// Width of the random Fourier distance encoding. `None` feeds the raw
    /// distance to the message network.
    pub rff_dim: Option<usize>,

    /// Projection scale for the Fourier encoding (1.0 when unset)
    pub rff_sigma: Option<f64>,

    /// Default per-node active flags, used when a batch carries no mask
    pub mask: Option<Vec<bool>>,
}

impl Default for EGNNConfig {
    fn default() -> Self {
        Self {
            depth: 5,
            hidden_features: 128,
            node_features: 1,
            out_features: 1,
            activation: Activation::Relu,
            norm: NormKind::Layer,
            aggr: Aggregation::Sum,
            pool: Pooling::Add,
            residual: true,
            rff_dim: None,
            rff_sigma: None,
            mask: None,
        }
    }
}

impl EGNNConfig {
    /// Create a new configuration
    pub fn new(node_features: usize, hidden_features: usize, depth: usize) -> Self {
        Self {
            node_features,
            hidden_features,
            depth,
            ..Default::default()
        }
    }

    /// Set output width
    pub fn with_out_features(mut self, out_features: usize) -> Self {
        self.out_features = out_features;
        self
    }

    /// Set activation
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Set normalization
    pub fn with_norm(mut self, norm: NormKind) -> Self {
        self.norm = norm;
        self
    }

    /// Set message aggregation
    pub fn with_aggr(mut self, aggr: Aggregation) -> Self {
        self.aggr = aggr;
        self
    }

    /// Set graph pooling
    pub fn with_pool(mut self, pool: Pooling) -> Self {
        self.pool = pool;
        self
    }

    /// Toggle residual connections
    pub fn with_residual(mut self, residual: bool) -> Self {
        self.residual = residual;
        self
    }

    /// Enable random Fourier features for distances
    pub fn with_rff(mut self, dim: usize, sigma: f64) -> Self {
        self.rff_dim = Some(dim);
        self.rff_sigma = Some(sigma);
        self
    }

    /// Set default node mask
    pub fn with_mask(mut self, mask: Vec<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Projection scale actually used by the Fourier encoding
    pub fn effective_rff_sigma(&self) -> f64 {
        self.rff_sigma.unwrap_or(1.0)
    }

    /// Check widths and Fourier settings before any parameter is allocated
    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::InvalidConfig("depth must be at least 1".into()));
        }
        for (name, value) in [
            ("hidden_features", self.hidden_features),
            ("node_features", self.node_features),
            ("out_features", self.out_features),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{} must be positive", name)));
            }
        }
        if self.rff_dim == Some(0) {
            return Err(Error::InvalidConfig("rff_dim must be positive".into()));
        }
        let sigma = self.effective_rff_sigma();
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "rff_sigma must be a positive finite number, got {}",
                sigma
            )));
        }
        Ok(())
    }
}
