//! Activation functions

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Nonlinearity used inside every sub-network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// max(0, x)
    #[default]
    Relu,
    /// SiLU: x * sigmoid(x)
    #[serde(alias = "silu")]
    Swish,
}

impl Activation {
    /// Apply to a single value
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Relu => relu(x),
            Activation::Swish => silu(x),
        }
    }

    /// Apply element-wise
    pub fn forward(self, input: &Array2<f64>) -> Array2<f64> {
        input.mapv(|x| self.apply(x))
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relu" => Ok(Activation::Relu),
            "swish" | "silu" => Ok(Activation::Swish),
            _ => Err(Error::unknown("activation", s)),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activation::Relu => write!(f, "relu"),
            Activation::Swish => write!(f, "swish"),
        }
    }
}

/// ReLU activation
pub(crate) fn relu(x: f64) -> f64 {
    x.max(0.0)
}

/// SiLU activation function
fn silu(x: f64) -> f64 {
    x / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_relu() {
        assert_eq!(Activation::Relu.apply(-2.0), 0.0);
        assert_eq!(Activation::Relu.apply(3.0), 3.0);
    }

    #[test]
    fn test_silu() {
        assert_relative_eq!(Activation::Swish.apply(0.0), 0.0);
        assert_relative_eq!(Activation::Swish.apply(1.0), 1.0 / (1.0 + (-1.0f64).exp()));
        assert!(Activation::Swish.apply(-1.0) < 0.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("relu".parse::<Activation>().unwrap(), Activation::Relu);
        assert_eq!("swish".parse::<Activation>().unwrap(), Activation::Swish);
        assert_eq!("SiLU".parse::<Activation>().unwrap(), Activation::Swish);
        assert!("tanh".parse::<Activation>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let parsed: Activation = serde_json::from_str("\"silu\"").unwrap();
        assert_eq!(parsed, Activation::Swish);
        assert_eq!(serde_json::to_string(&Activation::Relu).unwrap(), "\"relu\"");
    }
}
