//! In-memory graph store.
//!
//! Holds nodes and edges in insertion order together with an adjacency map
//! used for neighbor queries. All attribute writes go through
//! [`GraphStore::set_node_attribute`] / [`GraphStore::set_edge_attribute`];
//! the store is only ever mutated from the UI thread, while the layout
//! simulator posts its results through [`GraphStore::apply_positions`].

mod types;

use std::collections::{BTreeSet, HashMap};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub use types::{
	DEFAULT_NODE_SIZE, Edge, EdgeAttribute, EdgeInput, GraphConfig, GraphInput, Node,
	NodeAttribute, NodeInput, RendererKind,
};

use crate::error::{ElementKind, GraphError, Result};
use crate::layout::PositionBatch;

/// Side length of the square in which unpositioned nodes are scattered.
const INITIAL_SPREAD: f64 = 100.0;

/// Mutable node/edge store with neighbor lookup.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
	nodes: Vec<Node>,
	node_index: HashMap<String, usize>,
	edges: Vec<Edge>,
	edge_index: HashMap<String, usize>,
	/// node -> neighbor -> number of edges between them
	adjacency: HashMap<String, HashMap<String, usize>>,
}

impl GraphStore {
	/// Empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a store from a host payload.
	///
	/// Either every node and edge is inserted or an error is returned and
	/// nothing is built. Nodes without coordinates are scattered with a
	/// generator seeded from the layout settings.
	pub fn from_input(input: &GraphInput) -> Result<Self> {
		input.validate()?;

		let mut rng = SmallRng::seed_from_u64(input.config.layout.seed);
		let mut store = Self::new();

		for entry in &input.nodes {
			let x = entry
				.x
				.unwrap_or_else(|| (rng.r#gen::<f64>() - 0.5) * INITIAL_SPREAD);
			let y = entry
				.y
				.unwrap_or_else(|| (rng.r#gen::<f64>() - 0.5) * INITIAL_SPREAD);
			let mut node = Node::new(entry.id.clone(), x, y)
				.with_size(entry.size.unwrap_or(DEFAULT_NODE_SIZE));
			if let Some(label) = &entry.label {
				node.label = label.clone();
			}
			node.color = entry.color.clone();
			store.add_node(node)?;
		}

		for entry in &input.edges {
			let mut edge = Edge::new(entry.key(), entry.source.clone(), entry.target.clone());
			edge.label = entry.label.clone();
			edge.size = entry.size;
			edge.color = entry.color.clone();
			store.add_edge(edge)?;
		}

		Ok(store)
	}

	/// Insert a node. Fails without touching the store if the id exists.
	pub fn add_node(&mut self, node: Node) -> Result<()> {
		if self.node_index.contains_key(node.id()) {
			return Err(GraphError::DuplicateId {
				kind: ElementKind::Node,
				id: node.id().to_string(),
			});
		}
		self.node_index.insert(node.id().to_string(), self.nodes.len());
		self.adjacency.insert(node.id().to_string(), HashMap::new());
		self.nodes.push(node);
		Ok(())
	}

	/// Insert an edge between two existing nodes.
	pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
		if self.edge_index.contains_key(edge.id()) {
			return Err(GraphError::DuplicateId {
				kind: ElementKind::Edge,
				id: edge.id().to_string(),
			});
		}
		for endpoint in edge.extremities() {
			if !self.node_index.contains_key(endpoint) {
				return Err(GraphError::UnknownEndpoint {
					edge: edge.id().to_string(),
					node: endpoint.to_string(),
				});
			}
		}

		self.link(edge.source(), edge.target());
		if edge.source() != edge.target() {
			self.link(edge.target(), edge.source());
		}
		self.edge_index.insert(edge.id().to_string(), self.edges.len());
		self.edges.push(edge);
		Ok(())
	}

	/// Remove a node together with every edge incident to it.
	pub fn remove_node(&mut self, id: &str) -> Result<Node> {
		let idx = *self
			.node_index
			.get(id)
			.ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;

		let incident: Vec<String> = self
			.edges
			.iter()
			.filter(|e| e.touches(id))
			.map(|e| e.id().to_string())
			.collect();
		for edge_id in incident {
			self.remove_edge(&edge_id)?;
		}

		let node = self.nodes.remove(idx);
		self.adjacency.remove(id);
		self.node_index = index_by_id(self.nodes.iter().map(Node::id));
		Ok(node)
	}

	/// Remove a single edge.
	pub fn remove_edge(&mut self, id: &str) -> Result<Edge> {
		let idx = *self
			.edge_index
			.get(id)
			.ok_or_else(|| GraphError::UnknownEdge(id.to_string()))?;

		let edge = self.edges.remove(idx);
		self.unlink(edge.source(), edge.target());
		if edge.source() != edge.target() {
			self.unlink(edge.target(), edge.source());
		}
		self.edge_index = index_by_id(self.edges.iter().map(Edge::id));
		Ok(edge)
	}

	/// Write one node attribute in place.
	pub fn set_node_attribute(&mut self, id: &str, attribute: NodeAttribute) -> Result<()> {
		let node = self
			.node_index
			.get(id)
			.and_then(|&idx| self.nodes.get_mut(idx))
			.ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;

		match attribute {
			NodeAttribute::Label(label) => node.label = label,
			NodeAttribute::X(x) => node.x = x,
			NodeAttribute::Y(y) => node.y = y,
			NodeAttribute::Position { x, y } => {
				node.x = x;
				node.y = y;
			}
			NodeAttribute::Size(size) => node.size = size,
			NodeAttribute::Highlighted(flag) => node.highlighted = flag,
			NodeAttribute::Color(color) => node.color = color,
		}
		Ok(())
	}

	/// Write one edge attribute in place.
	pub fn set_edge_attribute(&mut self, id: &str, attribute: EdgeAttribute) -> Result<()> {
		let edge = self
			.edge_index
			.get(id)
			.and_then(|&idx| self.edges.get_mut(idx))
			.ok_or_else(|| GraphError::UnknownEdge(id.to_string()))?;

		match attribute {
			EdgeAttribute::Label(label) => edge.label = label,
			EdgeAttribute::Size(size) => edge.size = size,
			EdgeAttribute::Color(color) => edge.color = color,
		}
		Ok(())
	}

	/// Commit one batch of simulator positions.
	///
	/// Fixed nodes and ids that no longer exist are skipped; the flag is
	/// checked here, at commit time, so a drag that started after the
	/// simulator read its copy still wins. Returns the number of nodes written.
	pub fn apply_positions(&mut self, batch: &PositionBatch) -> usize {
		let mut written = 0;
		for (id, x, y) in &batch.positions {
			let Some(node) = self.node_index.get(id).and_then(|&idx| self.nodes.get_mut(idx)) else {
				continue;
			};
			if node.highlighted || !x.is_finite() || !y.is_finite() {
				continue;
			}
			node.x = *x;
			node.y = *y;
			written += 1;
		}
		written
	}

	/// Node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.node_index.get(id).map(|&idx| &self.nodes[idx])
	}

	/// Edge by id.
	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edge_index.get(id).map(|&idx| &self.edges[idx])
	}

	/// Whether `id` is stored.
	pub fn has_node(&self, id: &str) -> bool {
		self.node_index.contains_key(id)
	}

	/// Nodes in insertion order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges in insertion order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Whether the store holds no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// A node is fixed while it is pinned by a drag.
	pub fn is_fixed(&self, id: &str) -> bool {
		self.node(id).is_some_and(|n| n.highlighted)
	}

	/// Endpoints of an edge, source first.
	pub fn extremities(&self, edge_id: &str) -> Option<[&str; 2]> {
		self.edge(edge_id).map(Edge::extremities)
	}

	/// Every node directly connected to `id` by any edge, in either direction.
	pub fn neighbors(&self, id: &str) -> BTreeSet<&str> {
		self.adjacency
			.get(id)
			.map(|adj| adj.keys().map(String::as_str).collect())
			.unwrap_or_default()
	}

	/// Whether an edge joins `a` and `b`. A missing side is never a neighbor.
	pub fn are_neighbors(&self, a: Option<&str>, b: Option<&str>) -> bool {
		match (a, b) {
			(Some(a), Some(b)) => self.adjacency.get(a).is_some_and(|adj| adj.contains_key(b)),
			_ => false,
		}
	}

	fn link(&mut self, from: &str, to: &str) {
		if let Some(adj) = self.adjacency.get_mut(from) {
			*adj.entry(to.to_string()).or_insert(0) += 1;
		}
	}

	fn unlink(&mut self, from: &str, to: &str) {
		if let Some(adj) = self.adjacency.get_mut(from) {
			if let Some(count) = adj.get_mut(to) {
				*count -= 1;
				if *count == 0 {
					adj.remove(to);
				}
			}
		}
	}
}

fn index_by_id<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
	ids.enumerate().map(|(i, id)| (id.to_string(), i)).collect()
}
