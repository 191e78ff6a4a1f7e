//! Graph elements and the initialization payload handed over by the host.

use serde::Deserialize;

use crate::error::{GraphError, Result};
use crate::layout::LayoutSettings;

/// Node size used when the payload omits one.
pub const DEFAULT_NODE_SIZE: f64 = 5.0;

/// A node held by the [`GraphStore`](super::GraphStore).
///
/// The id is fixed at construction; every other attribute is written through
/// [`GraphStore::set_node_attribute`](super::GraphStore::set_node_attribute).
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	id: String,
	/// Display text.
	pub label: String,
	/// Graph-space x.
	pub x: f64,
	/// Graph-space y.
	pub y: f64,
	/// Radius in graph units, always positive.
	pub size: f64,
	/// Pinned by a drag. Fixed nodes are skipped by the layout simulator.
	pub highlighted: bool,
	/// Optional CSS color override.
	pub color: Option<String>,
}

impl Node {
	/// Node at (`x`, `y`) labelled with its id.
	pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
		let id = id.into();
		Self {
			label: id.clone(),
			id,
			x,
			y,
			size: DEFAULT_NODE_SIZE,
			highlighted: false,
			color: None,
		}
	}

	/// Replace the label.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = label.into();
		self
	}

	/// Replace the size.
	pub fn with_size(mut self, size: f64) -> Self {
		self.size = size;
		self
	}

	/// Unique node id.
	pub fn id(&self) -> &str {
		&self.id
	}
}

/// An edge between two existing nodes. Endpoints never change.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	id: String,
	source: String,
	target: String,
	/// Midpoint text.
	pub label: Option<String>,
	/// Line width; the renderer default applies when `None`.
	pub size: Option<f64>,
	/// Optional CSS color override.
	pub color: Option<String>,
}

impl Edge {
	/// Unlabelled edge from `source` to `target`.
	pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
			label: None,
			size: None,
			color: None,
		}
	}

	/// Set the label.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	/// Unique edge id.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Source node id.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Target node id.
	pub fn target(&self) -> &str {
		&self.target
	}

	/// Both endpoints, source first.
	pub fn extremities(&self) -> [&str; 2] {
		[&self.source, &self.target]
	}

	/// Whether `node` is one of this edge's endpoints.
	pub fn touches(&self, node: &str) -> bool {
		self.source == node || self.target == node
	}
}

/// A single attribute write on a node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeAttribute {
	/// Displayed text.
	Label(String),
	/// Horizontal position.
	X(f64),
	/// Vertical position.
	Y(f64),
	/// Both coordinates in one write, so readers never see half a move.
	Position { x: f64, y: f64 },
	/// Radius in graph units.
	Size(f64),
	/// Emphasis flag; a highlighted node is fixed for the layout.
	Highlighted(bool),
	/// CSS color override.
	Color(Option<String>),
}

/// A single attribute write on an edge.
#[derive(Clone, Debug, PartialEq)]
pub enum EdgeAttribute {
	/// Midpoint text.
	Label(Option<String>),
	/// Line width.
	Size(Option<f64>),
	/// CSS color override.
	Color(Option<String>),
}

/// Which drawing backend the renderer should request.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
	/// Hardware-accelerated surface.
	#[default]
	Webgl,
	/// Plain 2d canvas.
	Canvas,
}

/// Session configuration. Changing it requires a full reload.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphConfig {
	/// Draw edges at all; `drawEdges` in JSON.
	#[serde(default = "default_draw_edges")]
	pub draw_edges: bool,
	/// Drawing backend.
	#[serde(default)]
	pub renderer: RendererKind,
	/// Simulator tuning.
	#[serde(default)]
	pub layout: LayoutSettings,
}

fn default_draw_edges() -> bool {
	true
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			draw_edges: default_draw_edges(),
			renderer: RendererKind::default(),
			layout: LayoutSettings::default(),
		}
	}
}

/// A node as described by the host payload. Missing fields get defaults.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct NodeInput {
	/// Unique, non-empty id.
	pub id: String,
	/// Defaults to the id.
	#[serde(default)]
	pub label: Option<String>,
	/// Scattered from the layout seed when absent.
	#[serde(default)]
	pub x: Option<f64>,
	/// Scattered from the layout seed when absent.
	#[serde(default)]
	pub y: Option<f64>,
	/// Defaults to [`DEFAULT_NODE_SIZE`].
	#[serde(default)]
	pub size: Option<f64>,
	/// CSS color.
	#[serde(default)]
	pub color: Option<String>,
}

impl NodeInput {
	/// Input with only an id.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}
}

/// An edge as described by the host payload.
///
/// Edges without an id are keyed `"{source}->{target}"`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct EdgeInput {
	/// Optional unique id.
	#[serde(default)]
	pub id: Option<String>,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Midpoint text.
	#[serde(default)]
	pub label: Option<String>,
	/// Line width.
	#[serde(default)]
	pub size: Option<f64>,
	/// CSS color.
	#[serde(default)]
	pub color: Option<String>,
}

impl EdgeInput {
	/// Input with an explicit id.
	pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			id: Some(id.into()),
			source: source.into(),
			target: target.into(),
			..Self::default()
		}
	}

	/// The id this edge will be stored under.
	pub fn key(&self) -> String {
		self.id
			.clone()
			.unwrap_or_else(|| format!("{}->{}", self.source, self.target))
	}
}

/// Complete initialization payload: `{ nodes, edges, config }`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphInput {
	/// Nodes in insertion order.
	pub nodes: Vec<NodeInput>,
	/// Edges in insertion order.
	pub edges: Vec<EdgeInput>,
	/// Session configuration.
	#[serde(default)]
	pub config: GraphConfig,
}

impl GraphInput {
	/// Parse a JSON payload. Any shape problem is a `MalformedInput`.
	pub fn from_json(text: &str) -> Result<Self> {
		let input: GraphInput = serde_json::from_str(text)?;
		input.validate()?;
		Ok(input)
	}

	/// Field-level checks that serde cannot express.
	pub fn validate(&self) -> Result<()> {
		for node in &self.nodes {
			if node.id.is_empty() {
				return Err(GraphError::MalformedInput("node with empty id".into()));
			}
			if let Some(size) = node.size {
				if !(size.is_finite() && size > 0.0) {
					return Err(GraphError::MalformedInput(format!(
						"node {:?} has non-positive size {}",
						node.id, size
					)));
				}
			}
			for coord in [node.x, node.y].into_iter().flatten() {
				if !coord.is_finite() {
					return Err(GraphError::MalformedInput(format!(
						"node {:?} has a non-finite coordinate",
						node.id
					)));
				}
			}
		}
		for edge in &self.edges {
			if edge.id.as_deref() == Some("") {
				return Err(GraphError::MalformedInput("edge with empty id".into()));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_payload_with_defaults() {
		let input = GraphInput::from_json(
			r#"{
				"nodes": [{ "id": "abc", "label": "A, B, and C" }, { "id": "xyz" }],
				"edges": [{ "id": "abc-xyz", "source": "abc", "target": "xyz" }],
				"config": { "drawEdges": false, "renderer": "canvas" }
			}"#,
		)
		.unwrap();

		assert_eq!(input.nodes.len(), 2);
		assert_eq!(input.nodes[0].label.as_deref(), Some("A, B, and C"));
		assert_eq!(input.nodes[1].size, None);
		assert!(!input.config.draw_edges);
		assert_eq!(input.config.renderer, RendererKind::Canvas);
	}

	#[test]
	fn config_is_optional() {
		let input = GraphInput::from_json(r#"{ "nodes": [], "edges": [] }"#).unwrap();
		assert_eq!(input.config, GraphConfig::default());
		assert!(input.config.draw_edges);
		assert_eq!(input.config.renderer, RendererKind::Webgl);
	}

	#[test]
	fn missing_arrays_are_malformed() {
		let err = GraphInput::from_json(r#"{ "nodes": [] }"#).unwrap_err();
		assert!(matches!(err, GraphError::MalformedInput(_)));

		let err = GraphInput::from_json(r#"{ "edges": [] }"#).unwrap_err();
		assert!(matches!(err, GraphError::MalformedInput(_)));

		let err = GraphInput::from_json(r#"{ "nodes": {}, "edges": [] }"#).unwrap_err();
		assert!(matches!(err, GraphError::MalformedInput(_)));
	}

	#[test]
	fn rejects_non_positive_size() {
		let err = GraphInput::from_json(r#"{ "nodes": [{ "id": "a", "size": 0 }], "edges": [] }"#)
			.unwrap_err();
		assert!(matches!(err, GraphError::MalformedInput(_)));
	}

	#[test]
	fn edge_key_falls_back_to_endpoints() {
		let edge = EdgeInput {
			source: "a".into(),
			target: "b".into(),
			..EdgeInput::default()
		};
		assert_eq!(edge.key(), "a->b");
		assert_eq!(EdgeInput::new("ab", "a", "b").key(), "ab");
	}
}
