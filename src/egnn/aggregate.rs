//! Scatter aggregation of edge messages.
//!
//! Messages are grouped by destination node id and combined with an
//! associative, commutative operator. Nodes without incoming messages get a
//! zero vector.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Operator combining incoming messages into one vector per node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Sum all messages
    #[default]
    #[serde(alias = "add")]
    Sum,
    /// Average all messages
    Mean,
    /// Element-wise maximum
    Max,
    /// Element-wise minimum
    Min,
}

impl Aggregation {
    /// Combine rows of `messages` into `num_nodes` rows, row `k` going to
    /// `index[k]`.
    ///
    /// `index` must have one entry per message row, each `< num_nodes`.
    pub(crate) fn scatter(self, messages: &Array2<f64>, index: &[usize], num_nodes: usize) -> Array2<f64> {
        let dim = messages.ncols();
        let mut counts = vec![0usize; num_nodes];

        let init = match self {
            Aggregation::Sum | Aggregation::Mean => 0.0,
            Aggregation::Max => f64::NEG_INFINITY,
            Aggregation::Min => f64::INFINITY,
        };
        let mut out = Array2::from_elem((num_nodes, dim), init);

        for (msg, &node) in messages.outer_iter().zip(index) {
            counts[node] += 1;
            let mut row = out.row_mut(node);
            match self {
                Aggregation::Sum | Aggregation::Mean => row.scaled_add(1.0, &msg),
                Aggregation::Max => row.zip_mut_with(&msg, |acc, &v| *acc = acc.max(v)),
                Aggregation::Min => row.zip_mut_with(&msg, |acc, &v| *acc = acc.min(v)),
            }
        }

        for (mut row, &count) in out.outer_iter_mut().zip(&counts) {
            if count == 0 {
                row.fill(0.0);
            } else if self == Aggregation::Mean {
                row /= count as f64;
            }
        }

        out
    }
}

impl FromStr for Aggregation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" | "add" => Ok(Aggregation::Sum),
            "mean" => Ok(Aggregation::Mean),
            "max" => Ok(Aggregation::Max),
            "min" => Ok(Aggregation::Min),
            _ => Err(Error::unknown("aggregation", s)),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn messages() -> Array2<f64> {
        array![[1.0, -2.0], [3.0, 4.0], [5.0, 0.0]]
    }

    #[test]
    fn test_sum() {
        let out = Aggregation::Sum.scatter(&messages(), &[0, 0, 2], 3);
        assert_eq!(out, array![[4.0, 2.0], [0.0, 0.0], [5.0, 0.0]]);
    }

    #[test]
    fn test_mean() {
        let out = Aggregation::Mean.scatter(&messages(), &[0, 0, 2], 3);
        assert_eq!(out, array![[2.0, 1.0], [0.0, 0.0], [5.0, 0.0]]);
    }

    #[test]
    fn test_max_min() {
        let max = Aggregation::Max.scatter(&messages(), &[1, 1, 1], 2);
        assert_eq!(max, array![[0.0, 0.0], [5.0, 4.0]]);

        let min = Aggregation::Min.scatter(&messages(), &[1, 1, 1], 2);
        assert_eq!(min, array![[0.0, 0.0], [1.0, -2.0]]);
    }

    #[test]
    fn test_empty_messages() {
        let out = Aggregation::Max.scatter(&Array2::zeros((0, 4)), &[], 3);
        assert_eq!(out, Array2::<f64>::zeros((3, 4)));
    }

    #[test]
    fn test_parse() {
        assert_eq!("add".parse::<Aggregation>().unwrap(), Aggregation::Sum);
        assert_eq!("mean".parse::<Aggregation>().unwrap(), Aggregation::Mean);
        assert!("lstm".parse::<Aggregation>().is_err());
    }
}
