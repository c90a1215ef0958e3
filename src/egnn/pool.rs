//! Global readout from node embeddings to one embedding per graph

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::aggregate::Aggregation;
use crate::error::Error;

/// Graph-level pooling operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    /// Average of node embeddings
    Mean,
    /// Sum of node embeddings
    #[default]
    #[serde(alias = "sum")]
    Add,
}

impl Pooling {
    /// Pool `h` [num_nodes, dim] into [num_graphs, dim] using the per-node
    /// graph ids in `batch`
    pub(crate) fn pool(self, h: &Array2<f64>, batch: &[usize], num_graphs: usize) -> Array2<f64> {
        let aggregation = match self {
            Pooling::Mean => Aggregation::Mean,
            Pooling::Add => Aggregation::Sum,
        };
        aggregation.scatter(h, batch, num_graphs)
    }
}

impl FromStr for Pooling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(Pooling::Mean),
            "add" | "sum" => Ok(Pooling::Add),
            _ => Err(Error::unknown("pooling", s)),
        }
    }
}

impl fmt::Display for Pooling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pooling::Mean => write!(f, "mean"),
            Pooling::Add => write!(f, "add"),
        }
    }
}
