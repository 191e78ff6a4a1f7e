//! Per-frame visual attributes derived from stored data and interaction state.
//!
//! The reducers are pure: they read a node or edge, the current
//! [`InteractionState`] and the store's adjacency, and return what should be
//! drawn. Nothing here writes back into the [`GraphStore`].

use crate::graph::{Edge, GraphStore, Node};
use crate::interaction::InteractionState;

/// Fill used for nodes pushed into the background.
pub const DIMMED_COLOR: &str = "#f6f6f6";

/// Styling strategy selected by the current interaction state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleMode {
	/// Nothing hovered, selected or suggested: draw stored attributes.
	Plain,
	/// A hover or selection is active.
	Focus,
	/// Only a suggestion set is active.
	Suggest,
	/// Hover or selection together with a suggestion set.
	FocusSuggest,
}

impl StyleMode {
	/// Pick the mode for `state`.
	pub fn of(state: &InteractionState) -> Self {
		let focus = state.hovered_node().is_some() || state.selected_node().is_some();
		match (focus, state.suggestions().is_some()) {
			(false, false) => StyleMode::Plain,
			(true, false) => StyleMode::Focus,
			(false, true) => StyleMode::Suggest,
			(true, true) => StyleMode::FocusSuggest,
		}
	}

	fn focus(self) -> bool {
		matches!(self, StyleMode::Focus | StyleMode::FocusSuggest)
	}
}

/// Attributes handed to the node draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDisplay {
	/// Node id.
	pub id: String,
	/// Label to draw; empty when hidden.
	pub label: String,
	/// Graph-space x.
	pub x: f64,
	/// Graph-space y.
	pub y: f64,
	/// Radius in graph units.
	pub size: f64,
	/// Fill color; the theme palette applies when `None`.
	pub color: Option<String>,
	/// Drawn with emphasis: dragged, hovered or selected.
	pub highlighted: bool,
	/// Draw the label even below the size threshold.
	pub force_label: bool,
	/// Pushed into the background.
	pub dimmed: bool,
}

impl NodeDisplay {
	fn dim(&mut self) {
		self.label.clear();
		self.color = Some(DIMMED_COLOR.to_string());
		self.dimmed = true;
	}
}

impl From<&Node> for NodeDisplay {
	fn from(node: &Node) -> Self {
		Self {
			id: node.id().to_string(),
			label: node.label.clone(),
			x: node.x,
			y: node.y,
			size: node.size,
			color: node.color.clone(),
			highlighted: node.highlighted,
			force_label: false,
			dimmed: false,
		}
	}
}

/// Attributes handed to the edge draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeDisplay {
	/// Edge id.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Label drawn at the midpoint.
	pub label: Option<String>,
	/// Line width in screen pixels.
	pub size: Option<f64>,
	/// Stroke color; the theme applies when `None`.
	pub color: Option<String>,
	/// Skipped by the renderer.
	pub hidden: bool,
}

impl From<&Edge> for EdgeDisplay {
	fn from(edge: &Edge) -> Self {
		Self {
			id: edge.id().to_string(),
			source: edge.source().to_string(),
			target: edge.target().to_string(),
			label: edge.label.clone(),
			size: edge.size,
			color: edge.color.clone(),
			hidden: false,
		}
	}
}

/// Everything needed to draw one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	/// Nodes in store order.
	pub nodes: Vec<NodeDisplay>,
	/// Edges in store order.
	pub edges: Vec<EdgeDisplay>,
}

impl Scene {
	/// Reduced node by id.
	pub fn node(&self, id: &str) -> Option<&NodeDisplay> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Reduced edge by id.
	pub fn edge(&self, id: &str) -> Option<&EdgeDisplay> {
		self.edges.iter().find(|e| e.id == id)
	}
}

/// Reduce every node and edge of `store` for one frame.
pub fn reduce_scene(store: &GraphStore, state: &InteractionState) -> Scene {
	Scene {
		nodes: store
			.nodes()
			.iter()
			.map(|n| reduce_node(n, state, store))
			.collect(),
		edges: store
			.edges()
			.iter()
			.map(|e| reduce_edge(e, state, store))
			.collect(),
	}
}

/// Node styling.
///
/// With a hover or selection active, nodes outside the hovered node, its
/// neighbors, the selected node and the selected node's neighbors lose their
/// label and are dimmed. The hovered and selected nodes are highlighted;
/// otherwise, with suggestions active, suggested nodes always show their
/// label and the rest are dimmed.
pub fn reduce_node(node: &Node, state: &InteractionState, store: &GraphStore) -> NodeDisplay {
	let mut out = NodeDisplay::from(node);
	let id = node.id();
	let mode = StyleMode::of(state);

	if mode.focus()
		&& !state.hovered_neighbors().contains(id)
		&& state.hovered_node() != Some(id)
		&& state.selected_node() != Some(id)
		&& !store.are_neighbors(Some(id), state.selected_node())
	{
		out.dim();
	}

	if state.hovered_node() == Some(id) || state.selected_node() == Some(id) {
		out.highlighted = true;
	} else if let Some(suggestions) = state.suggestions() {
		if suggestions.contains(id) {
			out.force_label = true;
		} else {
			out.dim();
		}
	}

	out
}

/// Edge styling.
///
/// With a hover or selection active, an edge stays visible only if both of
/// its endpoints are the hovered/selected node or a neighbor of it. With
/// suggestions active, both endpoints must also be suggested.
pub fn reduce_edge(edge: &Edge, state: &InteractionState, store: &GraphStore) -> EdgeDisplay {
	let mut out = EdgeDisplay::from(edge);
	let mode = StyleMode::of(state);

	if mode.focus() {
		let hovered = state.hovered_node();
		let selected = state.selected_node();
		let relevant = |n: &str| {
			hovered == Some(n)
				|| selected == Some(n)
				|| store.are_neighbors(Some(n), hovered)
				|| store.are_neighbors(Some(n), selected)
		};
		if !edge.extremities().into_iter().all(relevant) {
			out.hidden = true;
		}
	}

	if let Some(suggestions) = state.suggestions() {
		if !suggestions.contains(edge.source()) || !suggestions.contains(edge.target()) {
			out.hidden = true;
		}
	}

	out
}
