//! Force-directed layout simulation.
//!
//! The simulation runs as its own unit of work: a [`LayoutWorker`] owns a
//! private copy of node positions, performs one iteration per tick and posts
//! a [`PositionBatch`] back through a queue. The [`LayoutSupervisor`]
//! schedules the worker (a thread on native targets, a `setInterval` timer
//! in the browser) and forwards drag commands to it. Only the UI side ever
//! writes into the [`GraphStore`](crate::graph::GraphStore).

mod supervisor;
mod worker;

use serde::Deserialize;

pub use supervisor::LayoutSupervisor;
pub use worker::{LayoutSeed, LayoutWorker, SeedNode};

/// Tunable simulation parameters.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutSettings {
	/// Spring coefficient pulling connected nodes together.
	pub attraction: f64,
	/// Charge coefficient pushing every pair of nodes apart.
	pub repulsion: f64,
	/// Fraction of its distance to the origin a node is pulled back each iteration.
	pub gravity: f64,
	/// Velocity damping between iterations (0 = no carry-over, 1 = none lost).
	pub inertia: f64,
	/// Cap on per-iteration displacement of a single node.
	pub max_move: f64,
	/// Cap on the force applied to a single node.
	pub max_force: f64,
	/// Integration speed factor.
	pub speed: f64,
	/// Milliseconds between iterations.
	pub tick_ms: u32,
	/// Seed for scattering nodes that arrive without coordinates.
	pub seed: u64,
}

impl Default for LayoutSettings {
	fn default() -> Self {
		Self {
			attraction: 0.05,
			repulsion: 150.0,
			gravity: 0.01,
			inertia: 0.9,
			max_move: 50.0,
			max_force: 100.0,
			speed: 3000.0,
			tick_ms: 16,
			seed: 0x5eed,
		}
	}
}

/// Messages from the UI thread to the worker.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutCommand {
	/// Fix a node at a position; the worker stops moving it.
	Pin { id: String, x: f64, y: f64 },
	/// Move an already pinned node.
	Move { id: String, x: f64, y: f64 },
	/// Hand a pinned node back to the simulation.
	Release { id: String },
}

/// Positions of every non-fixed node after one iteration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionBatch {
	/// Iteration that produced the batch, starting at 1.
	pub iteration: u64,
	/// Number of [`LayoutCommand`]s the worker had applied when it ran the
	/// iteration.
	pub commands: u64,
	/// `(id, x, y)` per free node.
	pub positions: Vec<(String, f64, f64)>,
}
