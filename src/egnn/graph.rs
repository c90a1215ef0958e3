//! Graph Structures for Point Clouds and Molecules
//!
//! A `Graph` is one point cloud with per-node features, 3D positions and a
//! directed edge list. A `GraphBatch` concatenates several graphs into the
//! dense matrices the model consumes, with a per-node graph id for pooling.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::COORD_DIM;

/// A node: feature vector plus position in 3D space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Node features (e.g. atom type encoding)
    pub features: Vec<f64>,

    /// Cartesian coordinates
    pub position: [f64; COORD_DIM],
}

impl GraphNode {
    /// Create a new graph node
    pub fn new(features: Vec<f64>, position: [f64; COORD_DIM]) -> Self {
        Self { features, position }
    }

    /// Get feature dimension
    pub fn feature_dim(&self) -> usize {
        self.features.len()
    }

    /// Euclidean distance to another node
    pub fn distance(&self, other: &GraphNode) -> f64 {
        self.position
            .iter()
            .zip(&other.position)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// A directed edge; messages flow from `source` to `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
}

impl GraphEdge {
    pub fn new(source: usize, target: usize) -> Self {
        Self { source, target }
    }
}

/// A single graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,

    /// Per-node active flags
    pub mask: Option<Vec<bool>>,
}

impl Graph {
    /// Create a graph from nodes and edges
    pub fn from_nodes_edges(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self {
            nodes,
            edges,
            mask: None,
        }
    }

    /// Connect every ordered pair of distinct nodes
    pub fn fully_connected(nodes: Vec<GraphNode>) -> Self {
        let n = nodes.len();
        let edges = (0..n)
            .flat_map(|source| {
                (0..n)
                    .filter(move |&target| target != source)
                    .map(move |target| GraphEdge::new(source, target))
            })
            .collect();
        Self::from_nodes_edges(nodes, edges)
    }

    /// Connect every ordered pair of distinct nodes within `cutoff` of each other
    pub fn with_radius_edges(nodes: Vec<GraphNode>, cutoff: f64) -> Self {
        let mut edges = Vec::new();
        for (source, a) in nodes.iter().enumerate() {
            for (target, b) in nodes.iter().enumerate() {
                if source != target && a.distance(b) <= cutoff {
                    edges.push(GraphEdge::new(source, target));
                }
            }
        }
        Self::from_nodes_edges(nodes, edges)
    }

    /// Attach per-node active flags
    pub fn with_mask(mut self, mask: Vec<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Get number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get number of edges
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get node feature dimension
    pub fn node_feature_dim(&self) -> usize {
        self.nodes.first().map(|n| n.feature_dim()).unwrap_or(0)
    }

    /// Nodes that send messages to `node_idx`
    pub fn neighbors(&self, node_idx: usize) -> Vec<usize> {
        self.edges
            .iter()
            .filter(|e| e.target == node_idx)
            .map(|e| e.source)
            .collect()
    }
}

/// Several graphs concatenated into dense matrices
#[derive(Debug, Clone)]
pub struct GraphBatch {
    /// Node features [total_nodes, node_features]
    pub x: Array2<f64>,

    /// Node positions [total_nodes, 3]
    pub pos: Array2<f64>,

    /// Edge index [2, total_edges]; row 0 is the source, row 1 the target
    pub edge_index: Array2<usize>,

    /// Graph id of each node [total_nodes]
    pub batch: Array1<usize>,

    /// Per-node active flags [total_nodes]
    pub mask: Option<Array1<bool>>,
}

impl GraphBatch {
    /// A batch holding a single graph
    pub fn new(x: Array2<f64>, pos: Array2<f64>, edge_index: Array2<usize>) -> Result<Self> {
        let batch = Array1::zeros(x.nrows());
        Self::from_parts(x, pos, edge_index, batch, None)
    }

    /// Assemble a batch from its matrices and validate it
    pub fn from_parts(
        x: Array2<f64>,
        pos: Array2<f64>,
        edge_index: Array2<usize>,
        batch: Array1<usize>,
        mask: Option<Array1<bool>>,
    ) -> Result<Self> {
        let graph_batch = Self {
            x,
            pos,
            edge_index,
            batch,
            mask,
        };
        graph_batch.validate()?;
        Ok(graph_batch)
    }

    /// Attach per-node active flags
    pub fn with_mask(mut self, mask: Array1<bool>) -> Result<Self> {
        Error::check_width("batch mask", self.num_nodes(), mask.len())?;
        self.mask = Some(mask);
        Ok(self)
    }

    /// Concatenate graphs, offsetting edge indices by each graph's first node
    pub fn collate(graphs: &[Graph]) -> Result<Self> {
        // Graph ids must stay aligned with output rows
        if let Some(idx) = graphs.iter().position(|g| g.num_nodes() == 0) {
            return Err(Error::InvalidBatch(format!("graph {} has no nodes", idx)));
        }

        let num_nodes: usize = graphs.iter().map(Graph::num_nodes).sum();
        let num_edges: usize = graphs.iter().map(Graph::num_edges).sum();
        let feature_dim = graphs.first().map(Graph::node_feature_dim).unwrap_or(0);

        let mut x = Array2::zeros((num_nodes, feature_dim));
        let mut pos = Array2::zeros((num_nodes, COORD_DIM));
        let mut edge_index = Array2::zeros((2, num_edges));
        let mut batch = Array1::zeros(num_nodes);
        let any_mask = graphs.iter().any(|g| g.mask.is_some());
        let mut mask = Array1::from_elem(num_nodes, true);

        let mut node_offset = 0;
        let mut edge_offset = 0;
        for (graph_id, graph) in graphs.iter().enumerate() {
            for (i, node) in graph.nodes.iter().enumerate() {
                Error::check_width("node features", feature_dim, node.feature_dim())?;
                let row = node_offset + i;
                x.row_mut(row).assign(&Array1::from_vec(node.features.clone()));
                pos.row_mut(row).assign(&Array1::from_vec(node.position.to_vec()));
                batch[row] = graph_id;
            }

            for (k, edge) in graph.edges.iter().enumerate() {
                for (slot, index) in [edge.source, edge.target].into_iter().enumerate() {
                    if index >= graph.num_nodes() {
                        return Err(Error::EdgeIndexOutOfBounds {
                            edge: k,
                            index,
                            num_nodes: graph.num_nodes(),
                        });
                    }
                    edge_index[[slot, edge_offset + k]] = node_offset + index;
                }
            }

            if let Some(graph_mask) = &graph.mask {
                Error::check_width("graph mask", graph.num_nodes(), graph_mask.len())?;
                for (i, &active) in graph_mask.iter().enumerate() {
                    mask[node_offset + i] = active;
                }
            }

            node_offset += graph.num_nodes();
            edge_offset += graph.num_edges();
        }

        Self::from_parts(x, pos, edge_index, batch, any_mask.then_some(mask))
    }

    /// Get number of nodes
    pub fn num_nodes(&self) -> usize {
        self.x.nrows()
    }

    /// Get number of edges
    pub fn num_edges(&self) -> usize {
        self.edge_index.ncols()
    }

    /// Number of graphs, taken from the largest graph id
    pub fn num_graphs(&self) -> usize {
        self.batch.iter().max().map_or(0, |&id| id + 1)
    }

    /// Get node feature dimension
    pub fn node_feature_dim(&self) -> usize {
        self.x.ncols()
    }

    /// Message senders, one per edge
    pub fn sources(&self) -> Vec<usize> {
        self.edge_index.row(0).to_vec()
    }

    /// Message receivers, one per edge
    pub fn targets(&self) -> Vec<usize> {
        self.edge_index.row(1).to_vec()
    }

    /// Check row counts, edge indices and graph ids
    pub fn validate(&self) -> Result<()> {
        let n = self.num_nodes();
        Error::check_width("position rows", n, self.pos.nrows())?;
        Error::check_width("position columns", COORD_DIM, self.pos.ncols())?;
        Error::check_width("batch vector", n, self.batch.len())?;
        if let Some(mask) = &self.mask {
            Error::check_width("batch mask", n, mask.len())?;
        }

        validate_edge_index(&self.edge_index, n)?;

        let mut seen = vec![false; self.num_graphs()];
        for &id in self.batch.iter() {
            seen[id] = true;
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(Error::InvalidBatch(format!(
                "graph ids are not contiguous: no node belongs to graph {}",
                missing
            )));
        }

        Ok(())
    }

    /// Per-edge Euclidean length `|pos[source] - pos[target]|` as [num_edges, 1]
    pub fn edge_distances(&self) -> Result<Array2<f64>> {
        validate_edge_index(&self.edge_index, self.pos.nrows())?;

        let diff = self.pos.select(Axis(0), &self.sources()) - self.pos.select(Axis(0), &self.targets());
        Ok(diff
            .map_axis(Axis(1), |row| row.dot(&row).sqrt())
            .insert_axis(Axis(1)))
    }
}

/// Check that `edge_index` is [2, E] and every entry is below `num_nodes`
pub(crate) fn validate_edge_index(edge_index: &Array2<usize>, num_nodes: usize) -> Result<()> {
    if edge_index.nrows() != 2 {
        return Err(Error::InvalidBatch(format!(
            "edge_index must have 2 rows, got {}",
            edge_index.nrows()
        )));
    }
    for (edge, column) in edge_index.axis_iter(Axis(1)).enumerate() {
        if let Some(&index) = column.iter().find(|&&i| i >= num_nodes) {
            return Err(Error::EdgeIndexOutOfBounds {
                edge,
                index,
                num_nodes,
            });
        }
    }
    Ok(())
}
