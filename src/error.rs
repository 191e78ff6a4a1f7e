//! Error taxonomy for graph construction and mutation.

use thiserror::Error;

/// Which kind of graph element an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
	/// A node.
	Node,
	/// An edge.
	Edge,
}

impl std::fmt::Display for ElementKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ElementKind::Node => f.write_str("node"),
			ElementKind::Edge => f.write_str("edge"),
		}
	}
}

/// Errors reported to the host. Construction errors abort the whole load.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
	/// A node or edge id is already present.
	#[error("duplicate {kind} id: {id:?}")]
	DuplicateId { kind: ElementKind, id: String },

	/// An edge references a node that does not exist.
	#[error("edge {edge:?} references unknown node {node:?}")]
	UnknownEndpoint { edge: String, node: String },

	/// The initialization payload is missing fields or has the wrong shape.
	#[error("malformed graph input: {0}")]
	MalformedInput(String),

	/// A node lookup by id failed.
	#[error("unknown node: {0:?}")]
	UnknownNode(String),

	/// An edge lookup by id failed.
	#[error("unknown edge: {0:?}")]
	UnknownEdge(String),
}

impl From<serde_json::Error> for GraphError {
	fn from(err: serde_json::Error) -> Self {
		GraphError::MalformedInput(err.to_string())
	}
}

/// Result alias used throughout the crate.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;

/// Non-fatal record of a node whose position went non-finite during a
/// layout iteration and was restored to its previous value.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationInstability {
	/// Node whose position was clamped.
	pub node: String,
	/// Iteration in which it happened.
	pub iteration: u64,
}
