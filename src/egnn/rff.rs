//! Random Fourier Features
//!
//! Encodes a low-dimensional input (here: an edge length) as
//! `[sin(x · Bᵗ) | cos(x · Bᵗ)]` with a fixed Gaussian projection `B`.

use ndarray::{concatenate, s, Array2, Axis};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;
use std::fmt;

use crate::error::{Error, Result};

/// Frozen random projection followed by a sinusoidal encoding
#[derive(Debug, Clone)]
pub struct RandomFourierFeatures {
    in_features: usize,
    out_features: usize,
    sigma: f64,

    /// Drop the last column so that odd widths come out exact
    compensation: bool,

    /// Projection [out_features / 2 + compensation, in_features].
    /// Drawn once, never trained.
    b: Array2<f64>,
}

impl RandomFourierFeatures {
    /// Create with the thread-local RNG
    pub fn new(in_features: usize, out_features: usize, sigma: f64) -> Self {
        Self::with_rng(in_features, out_features, sigma, &mut rand::thread_rng())
    }

    /// Create with an explicit RNG
    pub fn with_rng<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        sigma: f64,
        rng: &mut R,
    ) -> Self {
        let compensation = out_features % 2 != 0;
        let rows = out_features / 2 + usize::from(compensation);

        let b = Array2::<f64>::random_using((rows, in_features), StandardNormal, rng)
            * (sigma / std::f64::consts::SQRT_2);

        Self {
            in_features,
            out_features,
            sigma,
            compensation,
            b,
        }
    }

    /// Encode `x` [rows, in_features] into [rows, out_features]
    pub fn forward(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        Error::check_width("random Fourier features input", self.in_features, x.ncols())?;

        let projected = x.dot(&self.b.t());
        let encoded = concatenate(
            Axis(1),
            &[projected.mapv(f64::sin).view(), projected.mapv(f64::cos).view()],
        )?;

        if self.compensation {
            Ok(encoded.slice(s![.., ..self.out_features]).to_owned())
        } else {
            Ok(encoded)
        }
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// The frozen projection matrix
    pub fn projection(&self) -> &Array2<f64> {
        &self.b
    }
}

impl fmt::Display for RandomFourierFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "in_features={}, out_features={}, sigma={}",
            self.in_features, self.out_features, self.sigma
        )
    }
}
