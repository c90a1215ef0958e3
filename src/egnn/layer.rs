//! E-GNN Layer Implementation
//!
//! One round of message passing over a directed graph. Messages depend on
//! the two endpoint embeddings and the edge length only, so the layer is
//! invariant to rotations and translations of the input positions.

use ndarray::{concatenate, Array1, Array2, Axis, Zip};
use rand::Rng;
use std::fmt;
use tracing::debug;

use super::aggregate::Aggregation;
use super::graph::validate_edge_index;
use super::rff::RandomFourierFeatures;
use crate::error::{Error, Result};
use crate::nn::{Activation, FeedForward, NormKind};

/// E(n) invariant message-passing layer
#[derive(Debug, Clone)]
pub struct EGNNLayer {
    /// Embedding dimension
    emb_dim: usize,

    /// Message aggregation operator
    aggr: Aggregation,

    /// Message MLP: [h_i, h_j, d] -> emb_dim
    pub mlp_msg: FeedForward,

    /// Update MLP: [h, aggregated message] -> emb_dim
    pub mlp_upd: FeedForward,

    /// Fourier encoding of edge lengths
    rff: Option<RandomFourierFeatures>,

    /// Mask used when the caller passes none
    default_mask: Option<Array1<bool>>,
}

impl EGNNLayer {
    /// Create a new E-GNN layer with the thread-local RNG
    pub fn new(
        emb_dim: usize,
        activation: Activation,
        norm: NormKind,
        aggr: Aggregation,
        rff: Option<(usize, f64)>,
    ) -> Self {
        Self::with_rng(emb_dim, activation, norm, aggr, rff, &mut rand::thread_rng())
    }

    /// Create a new E-GNN layer drawing parameters from `rng`.
    ///
    /// `rff` is `(dim, sigma)`; when set, edge lengths are encoded with
    /// random Fourier features before entering the message MLP.
    pub fn with_rng<R: Rng + ?Sized>(
        emb_dim: usize,
        activation: Activation,
        norm: NormKind,
        aggr: Aggregation,
        rff: Option<(usize, f64)>,
        rng: &mut R,
    ) -> Self {
        let distance_dim = rff.map_or(1, |(dim, _)| dim);

        let mlp_msg = FeedForward::new(2 * emb_dim + distance_dim, emb_dim, activation, norm, rng);
        // NormKind::None builds Identity for the final norm as well
        let mlp_upd = FeedForward::new(2 * emb_dim, emb_dim, activation, norm, rng);

        let rff = rff.map(|(dim, sigma)| RandomFourierFeatures::with_rng(1, dim, sigma, &mut *rng));

        debug!(emb_dim, %aggr, %activation, %norm, rff = rff.is_some(), "Created EGNN layer");

        Self {
            emb_dim,
            aggr,
            mlp_msg,
            mlp_upd,
            rff,
            default_mask: None,
        }
    }

    /// Set the mask used when `forward` receives none
    pub fn with_default_mask(mut self, mask: Array1<bool>) -> Self {
        self.default_mask = Some(mask);
        self
    }

    /// Forward pass through the layer.
    ///
    /// * `h` - node embeddings [N, emb_dim]
    /// * `edge_index` - [2, E]; row 0 holds sources `j`, row 1 targets `i`
    /// * `distances` - edge lengths [E, 1], aligned with `edge_index` columns
    /// * `mask` - per-node active flags [N]; overrides the default mask.
    ///   Inactive nodes return their input embedding unchanged.
    pub fn forward(
        &self,
        h: &Array2<f64>,
        edge_index: &Array2<usize>,
        distances: &Array2<f64>,
        mask: Option<&Array1<bool>>,
    ) -> Result<Array2<f64>> {
        let num_nodes = h.nrows();
        Error::check_width("layer embeddings", self.emb_dim, h.ncols())?;
        validate_edge_index(edge_index, num_nodes)?;
        Error::check_width("distance rows", edge_index.ncols(), distances.nrows())?;
        Error::check_width("distance columns", 1, distances.ncols())?;

        let sources = edge_index.row(0).to_vec();
        let targets = edge_index.row(1).to_vec();

        let messages = self.message(h, &sources, &targets, distances)?;
        let aggregated = self.aggr.scatter(&messages, &targets, num_nodes);

        let mask = mask.or(self.default_mask.as_ref());
        self.update(h, &aggregated, mask)
    }

    /// Edge messages [E, emb_dim] from `[h_i, h_j, d_ij]`
    fn message(
        &self,
        h: &Array2<f64>,
        sources: &[usize],
        targets: &[usize],
        distances: &Array2<f64>,
    ) -> Result<Array2<f64>> {
        let h_i = h.select(Axis(0), targets);
        let h_j = h.select(Axis(0), sources);

        let edge_features = match &self.rff {
            Some(rff) => rff.forward(distances)?,
            None => distances.clone(),
        };

        let input = concatenate(Axis(1), &[h_i.view(), h_j.view(), edge_features.view()])?;
        self.mlp_msg.forward(&input)
    }

    /// Node update from `[h, aggregated]`, keeping inactive nodes as they were
    fn update(
        &self,
        h: &Array2<f64>,
        aggregated: &Array2<f64>,
        mask: Option<&Array1<bool>>,
    ) -> Result<Array2<f64>> {
        let input = concatenate(Axis(1), &[h.view(), aggregated.view()])?;
        let mut updated = self.mlp_upd.forward(&input)?;

        if let Some(mask) = mask {
            Error::check_width("node mask", h.nrows(), mask.len())?;
            Zip::from(updated.rows_mut())
                .and(h.rows())
                .and(mask)
                .for_each(|mut out, original, &active| {
                    if !active {
                        out.assign(&original);
                    }
                });
        }

        Ok(updated)
    }

    pub fn emb_dim(&self) -> usize {
        self.emb_dim
    }

    pub fn aggr(&self) -> Aggregation {
        self.aggr
    }

    pub fn rff(&self) -> Option<&RandomFourierFeatures> {
        self.rff.as_ref()
    }

    pub fn default_mask(&self) -> Option<&Array1<bool>> {
        self.default_mask.as_ref()
    }

    pub fn set_training(&mut self, training: bool) {
        self.mlp_msg.set_training(training);
        self.mlp_upd.set_training(training);
    }

    /// Trainable parameters (the Fourier projection is frozen)
    pub fn num_parameters(&self) -> usize {
        self.mlp_msg.num_parameters() + self.mlp_upd.num_parameters()
    }
}

impl fmt::Display for EGNNLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EGNNLayer(emb_dim={}, aggr={})", self.emb_dim, self.aggr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn layer(seed: u64, rff: Option<(usize, f64)>) -> EGNNLayer {
        let mut rng = StdRng::seed_from_u64(seed);
        EGNNLayer::with_rng(8, Activation::Swish, NormKind::Layer, Aggregation::Sum, rff, &mut rng)
    }

    fn inputs() -> (Array2<f64>, Array2<usize>, Array2<f64>) {
        let h = Array2::from_shape_fn((3, 8), |(i, j)| 0.1 * (i + 1) as f64 - 0.05 * j as f64);
        let edge_index = array![[0, 1, 1, 2], [1, 0, 2, 1]];
        let distances = array![[1.0], [1.0], [2.0], [2.0]];
        (h, edge_index, distances)
    }

    #[test]
    fn test_layer_creation() {
        let layer = layer(0, None);
        assert_eq!(layer.emb_dim(), 8);
        assert_eq!(layer.aggr(), Aggregation::Sum);
        assert!(layer.default_mask().is_none());
        assert_eq!(layer.mlp_msg.in_features(), 17);
        assert_eq!(layer.mlp_upd.in_features(), 16);
        assert_eq!(layer.to_string(), "EGNNLayer(emb_dim=8, aggr=sum)");
    }

    #[test]
    fn test_rff_widens_message_input() {
        let layer = layer(0, Some((5, 1.0)));
        assert_eq!(layer.mlp_msg.in_features(), 21);
        assert_eq!(layer.rff().map(|r| r.out_features()), Some(5));
    }

    #[test]
    fn test_layer_forward_shape() {
        let (h, edge_index, distances) = inputs();
        for rff in [None, Some((6, 0.5)), Some((7, 2.0))] {
            let out = layer(1, rff).forward(&h, &edge_index, &distances, None).unwrap();
            assert_eq!(out.dim(), h.dim());
        }
    }

    #[test]
    fn test_masked_nodes_pass_through() {
        let (h, edge_index, distances) = inputs();
        let layer = layer(2, None);
        let mask = array![true, false, true];

        let out = layer.forward(&h, &edge_index, &distances, Some(&mask)).unwrap();

        assert_eq!(out.row(1), h.row(1));
        assert_ne!(out.row(0), h.row(0));
        assert_ne!(out.row(2), h.row(2));
    }

    #[test]
    fn test_default_mask_and_override() {
        let (h, edge_index, distances) = inputs();
        let layer = layer(3, None).with_default_mask(array![false, true, true]);
        assert_eq!(layer.default_mask(), Some(&array![false, true, true]));

        let out = layer.forward(&h, &edge_index, &distances, None).unwrap();
        assert_eq!(out.row(0), h.row(0));

        let all_active = array![true, true, true];
        let out = layer.forward(&h, &edge_index, &distances, Some(&all_active)).unwrap();
        assert_ne!(out.row(0), h.row(0));
    }

    #[test]
    fn test_isolated_node_gets_zero_message() {
        let (h, _, _) = inputs();
        let layer = layer(4, None);
        // Node 2 receives nothing
        let edge_index = array![[0, 1], [1, 0]];
        let distances = array![[1.0], [1.0]];

        let out = layer.forward(&h, &edge_index, &distances, None).unwrap();

        let input = concatenate(Axis(1), &[h.view(), Array2::zeros((3, 8)).view()]).unwrap();
        let expected = layer.mlp_upd.forward(&input).unwrap();
        assert_eq!(out.row(2), expected.row(2));
    }

    #[test]
    fn test_batch_norm_rejects_single_edge() {
        let (h, _, _) = inputs();
        let mut rng = StdRng::seed_from_u64(7);
        let layer = EGNNLayer::with_rng(8, Activation::Relu, NormKind::Batch, Aggregation::Sum, None, &mut rng);
        let edge_index = array![[0], [1]];
        let distances = array![[1.0]];

        assert!(matches!(
            layer.forward(&h, &edge_index, &distances, None),
            Err(Error::InvalidBatch(_))
        ));
    }

    #[test]
    fn test_no_edges() {
        let (h, _, _) = inputs();
        let out = layer(5, None)
            .forward(&h, &Array2::zeros((2, 0)), &Array2::zeros((0, 1)), None)
            .unwrap();
        assert_eq!(out.dim(), (3, 8));
    }

    #[test]
    fn test_shape_errors() {
        let (h, edge_index, distances) = inputs();
        let layer = layer(6, None);

        let bad_h = Array2::zeros((3, 4));
        assert!(layer.forward(&bad_h, &edge_index, &distances, None).is_err());

        let short = array![[1.0], [2.0]];
        assert!(layer.forward(&h, &edge_index, &short, None).is_err());

        let out_of_range = array![[0, 5], [1, 0]];
        assert!(matches!(
            layer.forward(&h, &out_of_range, &short, None),
            Err(Error::EdgeIndexOutOfBounds { index: 5, .. })
        ));

        let bad_mask = array![true];
        assert!(layer.forward(&h, &edge_index, &distances, Some(&bad_mask)).is_err());
    }
}
