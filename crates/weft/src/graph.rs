//! The canonical directed-graph representation built from a transfer log.
//!
//! [`TransferGraph`] keeps an explicit sorted adjacency (out- and in-edges
//! per vertex) paired with an edge→weight map, rather than delegating to a
//! dynamic attributed-graph container. The serialized form is a small
//! versioned edge-list document, so the on-disk format stays stable and
//! independent of any graph library. A `petgraph` view is derived on demand
//! for downstream network analysis.

use crate::types::{Address, GraphKind, TransferLog};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Version tag of the serialized artifact document.
///
/// Bump when the edge-list layout changes; readers reject unknown versions
/// so a stale artifact triggers a rebuild instead of a misparse.
const FORMAT_VERSION: u32 = 1;

/// A directed graph aggregated from a transfer log.
///
/// - Vertex set: every address appearing as source or destination.
/// - Edge set: unique `(source, destination)` pairs; duplicates collapse.
/// - Weighted kind: each edge carries the sum of `value_token` over all rows
///   sharing its pair.
///
/// Equality compares kind, topology, and weights exactly; two graphs built
/// from the same rows in any order differ at most by floating-point rounding
/// of weights.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferGraph {
    kind: GraphKind,
    vertices: BTreeSet<Address>,
    out_edges: BTreeMap<Address, BTreeSet<Address>>,
    in_edges: BTreeMap<Address, BTreeSet<Address>>,
    weights: BTreeMap<Address, BTreeMap<Address, f64>>,
}

impl TransferGraph {
    /// Creates an empty graph of the given kind.
    #[must_use]
    pub fn empty(kind: GraphKind) -> Self {
        Self {
            kind,
            vertices: BTreeSet::new(),
            out_edges: BTreeMap::new(),
            in_edges: BTreeMap::new(),
            weights: BTreeMap::new(),
        }
    }

    /// Aggregates a transfer log into a graph in one pass.
    ///
    /// Self-transfers become self-loops; they are valid input even though
    /// the standard cleaning path removes them upstream.
    #[must_use]
    pub fn from_log(kind: GraphKind, log: &TransferLog) -> Self {
        let mut graph = Self::empty(kind);
        for transfer in log {
            graph.record(
                &transfer.from_address,
                &transfer.to_address,
                transfer.value_token,
            );
        }
        graph
    }

    /// Folds one `(from, to, amount)` observation into the graph.
    ///
    /// For the unweighted kind the amount is ignored and repeats are
    /// idempotent; for the weighted kind the amount accumulates on the edge.
    fn record(&mut self, from: &Address, to: &Address, amount: f64) {
        self.vertices.insert(from.clone());
        self.vertices.insert(to.clone());
        self.out_edges
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        self.in_edges
            .entry(to.clone())
            .or_default()
            .insert(from.clone());
        if self.kind.is_weighted() {
            *self
                .weights
                .entry(from.clone())
                .or_default()
                .entry(to.clone())
                .or_insert(0.0) += amount;
        }
    }

    /// The kind this graph was built as.
    #[must_use]
    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.out_edges.values().map(BTreeSet::len).sum()
    }

    /// Iterates all vertices in sorted order.
    pub fn vertices(&self) -> impl Iterator<Item = &Address> {
        self.vertices.iter()
    }

    /// Whether the address appears in the graph.
    #[must_use]
    pub fn contains_vertex(&self, address: &Address) -> bool {
        self.vertices.contains(address)
    }

    /// Out-neighbors of a vertex, sorted. Empty for unknown vertices.
    pub fn out_edges<'a>(
        &'a self,
        address: &Address,
    ) -> impl Iterator<Item = &'a Address> + use<'a> {
        self.out_edges
            .get(address)
            .into_iter()
            .flat_map(BTreeSet::iter)
    }

    /// In-neighbors of a vertex, sorted. Empty for unknown vertices.
    pub fn in_edges<'a>(
        &'a self,
        address: &Address,
    ) -> impl Iterator<Item = &'a Address> + use<'a> {
        self.in_edges
            .get(address)
            .into_iter()
            .flat_map(BTreeSet::iter)
    }

    /// Whether the directed edge `from → to` exists.
    #[must_use]
    pub fn has_edge(&self, from: &Address, to: &Address) -> bool {
        self.out_edges.get(from).is_some_and(|tos| tos.contains(to))
    }

    /// The weight of `from → to`.
    ///
    /// `None` when the edge is absent or the graph is unweighted.
    #[must_use]
    pub fn weight(&self, from: &Address, to: &Address) -> Option<f64> {
        self.weights.get(from).and_then(|tos| tos.get(to)).copied()
    }

    /// Sum of all edge weights (0.0 for the unweighted kind).
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.weights.values().flat_map(BTreeMap::values).sum()
    }

    /// Iterates all edges as `(from, to, weight)` in sorted order.
    ///
    /// The weight is `None` for the unweighted kind.
    pub fn edges(&self) -> impl Iterator<Item = (&Address, &Address, Option<f64>)> {
        self.out_edges.iter().flat_map(move |(from, tos)| {
            tos.iter().map(move |to| (from, to, self.weight(from, to)))
        })
    }

    /// Builds a `petgraph` view for downstream network analysis.
    ///
    /// Node weights are the addresses; edge weights are the aggregated
    /// amounts, with `1.0` standing in for every edge of the unweighted
    /// kind. Node indices follow the sorted vertex order.
    #[must_use]
    pub fn to_digraph(&self) -> DiGraph<Address, f64> {
        let mut digraph = DiGraph::new();
        let mut nodes: BTreeMap<&Address, NodeIndex> = BTreeMap::new();
        for vertex in &self.vertices {
            nodes.insert(vertex, digraph.add_node(vertex.clone()));
        }
        for (from, to, weight) in self.edges() {
            digraph.add_edge(nodes[from], nodes[to], weight.unwrap_or(1.0));
        }
        digraph
    }
}

// ============================================================================
// Serialized artifact format
// ============================================================================

/// On-disk document: versioned edge list.
///
/// The vertex set is not stored; every vertex is an endpoint of some edge,
/// so it is reconstructed from the edges.
#[derive(Debug, Serialize, Deserialize)]
struct GraphArtifact {
    format_version: u32,
    kind: GraphKind,
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    from: Address,
    to: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
}

impl From<&TransferGraph> for GraphArtifact {
    fn from(graph: &TransferGraph) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            kind: graph.kind,
            edges: graph
                .edges()
                .map(|(from, to, weight)| EdgeRecord {
                    from: from.clone(),
                    to: to.clone(),
                    weight,
                })
                .collect(),
        }
    }
}

impl TryFrom<GraphArtifact> for TransferGraph {
    type Error = String;

    fn try_from(artifact: GraphArtifact) -> Result<Self, Self::Error> {
        if artifact.format_version != FORMAT_VERSION {
            return Err(format!(
                "unsupported graph artifact version {} (expected {FORMAT_VERSION})",
                artifact.format_version
            ));
        }
        let mut graph = TransferGraph::empty(artifact.kind);
        for edge in artifact.edges {
            let amount = match (artifact.kind, edge.weight) {
                (GraphKind::Weighted, Some(w)) => w,
                (GraphKind::Weighted, None) => {
                    return Err(format!(
                        "weighted artifact edge {} -> {} has no weight",
                        edge.from, edge.to
                    ));
                }
                (GraphKind::Unweighted, _) => 0.0,
            };
            graph.record(&edge.from, &edge.to, amount);
        }
        Ok(graph)
    }
}

impl Serialize for TransferGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GraphArtifact::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TransferGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let artifact = GraphArtifact::deserialize(deserializer)?;
        Self::try_from(artifact).map_err(D::Error::custom)
    }
}
