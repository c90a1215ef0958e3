//! Equivariant GNN Network
//!
//! Complete E-GNN model: input embedding, a stack of message-passing layers,
//! graph pooling and a prediction head.

use ndarray::{Array1, Array2};
use rand::Rng;
use std::fmt;
use tracing::{debug, trace};

use super::config::EGNNConfig;
use super::graph::GraphBatch;
use super::layer::EGNNLayer;
use crate::error::Result;
use crate::nn::{Activation, Linear};

/// Equivariant GNN model
#[derive(Debug, Clone)]
pub struct EGNNModel {
    /// Configuration
    config: EGNNConfig,

    /// Input embedding layer
    pub emb_in: Linear,

    /// E-GNN layers
    pub layers: Vec<EGNNLayer>,

    /// Prediction head: Linear -> ReLU -> Linear
    pub pred_hidden: Linear,
    pub pred_out: Linear,
}

impl EGNNModel {
    /// Create a new E-GNN model
    pub fn new(config: EGNNConfig) -> Result<Self> {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    /// Create a model drawing every parameter from `rng`
    pub fn with_rng<R: Rng + ?Sized>(config: EGNNConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let hidden = config.hidden_features;
        let emb_in = Linear::new(config.node_features, hidden, rng);

        let rff = config.rff_dim.map(|dim| (dim, config.effective_rff_sigma()));
        let default_mask = config.mask.clone().map(Array1::from_vec);

        let layers = (0..config.depth)
            .map(|_| {
                let layer =
                    EGNNLayer::with_rng(hidden, config.activation, config.norm, config.aggr, rff, &mut *rng);
                match &default_mask {
                    Some(mask) => layer.with_default_mask(mask.clone()),
                    None => layer,
                }
            })
            .collect();

        let pred_hidden = Linear::new(hidden, hidden, rng);
        let pred_out = Linear::new(hidden, config.out_features, rng);

        let model = Self {
            config,
            emb_in,
            layers,
            pred_hidden,
            pred_out,
        };

        debug!(
            depth = model.config.depth,
            hidden_features = hidden,
            parameters = model.num_parameters(),
            "Created EGNN model"
        );

        Ok(model)
    }

    /// Forward pass: per-graph predictions [num_graphs, out_features]
    pub fn forward(&self, batch: &GraphBatch) -> Result<Array2<f64>> {
        let h = self.node_embeddings(batch)?;

        let pooled = self
            .config
            .pool
            .pool(&h, &batch.batch.to_vec(), batch.num_graphs());

        let hidden = Activation::Relu.forward(&self.pred_hidden.forward(&pooled)?);
        self.pred_out.forward(&hidden)
    }

    /// Node embeddings [num_nodes, hidden_features] after the last layer
    pub fn node_embeddings(&self, batch: &GraphBatch) -> Result<Array2<f64>> {
        batch.validate()?;
        debug!(
            nodes = batch.num_nodes(),
            edges = batch.num_edges(),
            graphs = batch.num_graphs(),
            "EGNN forward"
        );

        let mut h = self.emb_in.forward(&batch.x)?;

        // Positions are never updated, so edge lengths are shared by all layers
        let distances = batch.edge_distances()?;

        for (idx, layer) in self.layers.iter().enumerate() {
            let update = layer.forward(&h, &batch.edge_index, &distances, batch.mask.as_ref())?;
            h = if self.config.residual { h + &update } else { update };
            trace!(layer = idx, "Applied message passing");
        }

        Ok(h)
    }

    /// Toggle batch-norm statistics mode in every sub-network
    pub fn set_training(&mut self, training: bool) {
        for layer in &mut self.layers {
            layer.set_training(training);
        }
    }

    /// Trainable parameter count
    pub fn num_parameters(&self) -> usize {
        self.emb_in.num_parameters()
            + self.layers.iter().map(EGNNLayer::num_parameters).sum::<usize>()
            + self.pred_hidden.num_parameters()
            + self.pred_out.num_parameters()
    }

    /// Get configuration
    pub fn config(&self) -> &EGNNConfig {
        &self.config
    }

    pub fn name(&self) -> &'static str {
        "EGNN"
    }
}

impl fmt::Display for EGNNModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}(node_features={}, hidden_features={}, out_features={}, pool={}, residual={})",
            self.name(),
            self.config.node_features,
            self.config.hidden_features,
            self.config.out_features,
            self.config.pool,
            self.config.residual
        )?;
        for (idx, layer) in self.layers.iter().enumerate() {
            match layer.rff() {
                Some(rff) => writeln!(f, "  ({}): {} RFF({})", idx, layer, rff)?,
                None => writeln!(f, "  ({}): {}", idx, layer)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::egnn::{Aggregation, Graph, GraphEdge, GraphNode, Pooling};
    use crate::error::Error;
    use crate::nn::NormKind;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_test_graph() -> Graph {
        let nodes = vec![
            GraphNode::new(vec![1.0], [0.0, 0.0, 0.0]),
            GraphNode::new(vec![6.0], [1.2, 0.0, 0.0]),
            GraphNode::new(vec![8.0], [1.9, 1.1, 0.3]),
        ];

        let edges = vec![
            GraphEdge::new(0, 1),
            GraphEdge::new(1, 0),
            GraphEdge::new(1, 2),
            GraphEdge::new(2, 1),
        ];

        Graph::from_nodes_edges(nodes, edges)
    }

    fn model(config: EGNNConfig, seed: u64) -> EGNNModel {
        EGNNModel::with_rng(config, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_model_creation() {
        let model = model(EGNNConfig::new(1, 8, 2), 0);
        assert_eq!(model.layers.len(), 2);
        assert_eq!(model.config().hidden_features, 8);
        assert_eq!(model.name(), "EGNN");
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            EGNNModel::new(EGNNConfig::new(1, 8, 0)),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_forward_pass() {
        let model = model(EGNNConfig::new(1, 8, 2).with_out_features(3), 1);
        let batch = GraphBatch::collate(&[create_test_graph()]).unwrap();

        let output = model.forward(&batch).unwrap();

        assert_eq!(output.dim(), (1, 3));
        assert!(output.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_every_option_combination_runs() {
        let batch = GraphBatch::collate(&[create_test_graph(), create_test_graph()]).unwrap();
        for activation in [Activation::Relu, Activation::Swish] {
            for norm in [NormKind::Layer, NormKind::Batch, NormKind::None] {
                for aggr in [Aggregation::Sum, Aggregation::Mean, Aggregation::Max] {
                    for pool in [Pooling::Add, Pooling::Mean] {
                        let config = EGNNConfig::new(1, 8, 2)
                            .with_activation(activation)
                            .with_norm(norm)
                            .with_aggr(aggr)
                            .with_pool(pool)
                            .with_rff(5, 1.0);
                        let output = model(config, 2).forward(&batch).unwrap();
                        assert_eq!(output.dim(), (2, 1));
                        assert!(output.iter().all(|v| v.is_finite()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_residual_changes_output() {
        let batch = GraphBatch::collate(&[create_test_graph()]).unwrap();
        let with_residual = model(EGNNConfig::new(1, 8, 2), 3).forward(&batch).unwrap();
        let without = model(EGNNConfig::new(1, 8, 2).with_residual(false), 3)
            .forward(&batch)
            .unwrap();
        assert_ne!(with_residual, without);
    }

    #[test]
    fn test_feature_width_mismatch() {
        let model = model(EGNNConfig::new(2, 8, 1), 4);
        let batch = GraphBatch::collate(&[create_test_graph()]).unwrap();
        assert!(matches!(model.forward(&batch), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_default_mask_from_config() {
        let config = EGNNConfig::new(1, 8, 1)
            .with_residual(false)
            .with_mask(vec![false, true, true]);
        let model = model(config, 5);
        let batch = GraphBatch::collate(&[create_test_graph()]).unwrap();

        let h = model.node_embeddings(&batch).unwrap();
        let h0 = model.emb_in.forward(&batch.x).unwrap();
        assert_eq!(h.row(0), h0.row(0));

        // A batch mask takes precedence over the configured default
        let batch = batch.with_mask(array![true, true, false]).unwrap();
        let h = model.node_embeddings(&batch).unwrap();
        assert_ne!(h.row(0), h0.row(0));
        assert_eq!(h.row(2), h0.row(2));
    }

    #[test]
    fn test_num_parameters() {
        let model = model(EGNNConfig::new(1, 4, 1).with_norm(NormKind::None), 6);
        // emb_in: 1*4+4, msg: (9*4+4)+(4*4+4), upd: (8*4+4)+(4*4+4), head: (4*4+4)+(4*1+1)
        assert_eq!(model.num_parameters(), 8 + 60 + 56 + 25);
    }

    #[test]
    fn test_set_training() {
        let mut model = model(EGNNConfig::new(1, 8, 2).with_norm(NormKind::Batch), 7);
        model.set_training(false);
        let batch = GraphBatch::collate(&[create_test_graph()]).unwrap();
        assert!(model.forward(&batch).unwrap().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_display() {
        let model = model(EGNNConfig::new(1, 8, 2).with_rff(4, 0.5), 8);
        let text = model.to_string();
        assert!(text.starts_with("EGNN(node_features=1, hidden_features=8"));
        assert!(text.contains("(1): EGNNLayer(emb_dim=8, aggr=sum) RFF(in_features=1, out_features=4, sigma=0.5)"));
    }

    #[test]
    fn test_model_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EGNNModel>();
    }
}
