//! One force-layout iteration at a time over a private copy of the graph.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{Receiver, SyncSender, TryRecvError, TrySendError};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{LayoutCommand, LayoutSettings, PositionBatch};
use crate::error::SimulationInstability;
use crate::graph::GraphStore;

/// Mass given to every simulated node.
const NODE_MASS: f32 = 10.0;

/// Side of the square in which nodes sharing a start position are spread.
/// Coincident nodes exert no force on each other and would never separate.
const COINCIDENT_SPREAD: f64 = 1.0;

/// A node as handed to the worker when it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct SeedNode {
	/// Node id.
	pub id: String,
	/// Start x.
	pub x: f64,
	/// Start y.
	pub y: f64,
	/// Held by a drag when the worker starts.
	pub fixed: bool,
}

/// Plain-data snapshot the worker is built from. Sendable across threads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutSeed {
	/// Every node with its start position.
	pub nodes: Vec<SeedNode>,
	/// `(source, target)` per edge.
	pub edges: Vec<(String, String)>,
}

impl LayoutSeed {
	/// Snapshot positions and topology of `store`.
	pub fn from_store(store: &GraphStore) -> Self {
		Self {
			nodes: store
				.nodes()
				.iter()
				.map(|n| SeedNode {
					id: n.id().to_string(),
					x: n.x,
					y: n.y,
					fixed: n.highlighted,
				})
				.collect(),
			edges: store
				.edges()
				.iter()
				.map(|e| (e.source().to_string(), e.target().to_string()))
				.collect(),
		}
	}
}

/// Runs the physics for one graph.
///
/// Repulsion between all pairs and spring attraction along edges come from
/// the `force_graph` engine; this type adds centering gravity, the per-step
/// displacement cap, and recovery from non-finite positions.
pub struct LayoutWorker {
	graph: ForceGraph<String, ()>,
	index: HashMap<String, DefaultNodeIdx>,
	settings: LayoutSettings,
	commands: Receiver<LayoutCommand>,
	output: SyncSender<PositionBatch>,
	iteration: u64,
	applied: u64,
	instabilities: Vec<SimulationInstability>,
}

impl LayoutWorker {
	/// Build the simulation from `seed`. Nodes sharing a start position are spread apart slightly.
	pub fn new(
		seed: LayoutSeed,
		settings: LayoutSettings,
		commands: Receiver<LayoutCommand>,
		output: SyncSender<PositionBatch>,
	) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: settings.repulsion as f32,
			force_spring: settings.attraction as f32,
			force_max: settings.max_force as f32,
			node_speed: settings.speed as f32,
			damping_factor: settings.inertia as f32,
		});
		let mut index = HashMap::new();
		let mut rng = SmallRng::seed_from_u64(settings.seed);
		let mut occupied = HashSet::new();

		for node in seed.nodes {
			let (mut x, mut y) = (node.x, node.y);
			if !node.fixed {
				while !occupied.insert((x.to_bits(), y.to_bits())) {
					x = node.x + (rng.r#gen::<f64>() - 0.5) * COINCIDENT_SPREAD;
					y = node.y + (rng.r#gen::<f64>() - 0.5) * COINCIDENT_SPREAD;
				}
			} else {
				occupied.insert((x.to_bits(), y.to_bits()));
			}
			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: NODE_MASS,
				is_anchor: node.fixed,
				user_data: node.id.clone(),
			});
			index.insert(node.id, idx);
		}

		for (source, target) in &seed.edges {
			if let (Some(&src), Some(&tgt)) = (index.get(source), index.get(target)) {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		Self {
			graph,
			index,
			settings,
			commands,
			output,
			iteration: 0,
			applied: 0,
			instabilities: Vec::new(),
		}
	}

	/// Apply pending commands, run one iteration and post the result.
	///
	/// Returns `false` once the receiving side of the position queue is gone,
	/// which tells the scheduler to stop.
	pub fn step(&mut self) -> bool {
		if !self.apply_commands() {
			return false;
		}

		let mut previous: HashMap<DefaultNodeIdx, (f32, f32)> = HashMap::new();
		self.graph.visit_nodes(|node| {
			previous.insert(node.index(), (node.x(), node.y()));
		});

		self.graph.update(self.settings.tick_ms as f32 / 1000.0);
		self.iteration += 1;

		let iteration = self.iteration;
		let settings = &self.settings;
		let mut unstable = Vec::new();
		let mut positions = Vec::with_capacity(previous.len());

		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			let Some(&prev) = previous.get(&node.index()) else {
				return;
			};
			let (x, y, recovered) = settle(prev, (node.data.x, node.data.y), settings);
			if recovered {
				unstable.push(SimulationInstability {
					node: node.data.user_data.clone(),
					iteration,
				});
			}
			node.data.x = x;
			node.data.y = y;
			positions.push((node.data.user_data.clone(), x as f64, y as f64));
		});

		for event in &unstable {
			warn!(
				"layout: node {:?} diverged in iteration {}, restored previous position",
				event.node, event.iteration
			);
		}
		self.instabilities.extend(unstable);

		match self.output.try_send(PositionBatch {
			iteration,
			commands: self.applied,
			positions,
		}) {
			Ok(()) => true,
			// The UI has not caught up; the next batch supersedes this one.
			Err(TrySendError::Full(_)) => true,
			Err(TrySendError::Disconnected(_)) => false,
		}
	}

	/// Number of iterations run so far.
	pub fn iteration(&self) -> u64 {
		self.iteration
	}

	/// Every recovered divergence, oldest first.
	pub fn instabilities(&self) -> &[SimulationInstability] {
		&self.instabilities
	}

	/// The worker's own view of a node's position.
	pub fn position(&self, id: &str) -> Option<(f64, f64)> {
		let idx = *self.index.get(id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	fn apply_commands(&mut self) -> bool {
		let mut pending: HashMap<DefaultNodeIdx, (Option<(f32, f32)>, Option<bool>)> =
			HashMap::new();

		loop {
			let command = match self.commands.try_recv() {
				Ok(command) => command,
				Err(TryRecvError::Empty) => break,
				Err(TryRecvError::Disconnected) => return false,
			};
			self.applied += 1;
			let (id, update) = match command {
				LayoutCommand::Pin { id, x, y } => (id, (Some((x as f32, y as f32)), Some(true))),
				LayoutCommand::Move { id, x, y } => (id, (Some((x as f32, y as f32)), None)),
				LayoutCommand::Release { id } => (id, (None, Some(false))),
			};
			let Some(&idx) = self.index.get(&id) else {
				debug!("layout: ignoring command for unknown node {:?}", id);
				continue;
			};
			let entry = pending.entry(idx).or_default();
			if update.0.is_some() {
				entry.0 = update.0;
			}
			if update.1.is_some() {
				entry.1 = update.1;
			}
		}

		if !pending.is_empty() {
			self.graph.visit_nodes_mut(|node| {
				if let Some((position, anchor)) = pending.get(&node.index()) {
					if let Some((x, y)) = *position {
						node.data.x = x;
						node.data.y = y;
					}
					if let Some(anchor) = *anchor {
						node.data.is_anchor = anchor;
					}
				}
			});
		}
		for (idx, (_, anchor)) in pending {
			if anchor == Some(false) {
				self.respawn(idx);
			}
		}
		true
	}

	/// Rebuild a node at its current position with its edges. `force_graph`
	/// keeps accumulating force on anchored nodes without integrating it, so
	/// a released node has to start over at rest.
	fn respawn(&mut self, idx: DefaultNodeIdx) {
		let raw = self.graph.get_graph();
		let Some(node) = raw.node_weight(idx) else {
			return;
		};
		let data = NodeData {
			x: node.data.x,
			y: node.data.y,
			mass: node.data.mass,
			is_anchor: false,
			user_data: node.data.user_data.clone(),
		};
		let neighbors: Vec<DefaultNodeIdx> = raw.neighbors(idx).filter(|&n| n != idx).collect();

		self.graph.remove_node(idx);
		let id = data.user_data.clone();
		let fresh = self.graph.add_node(data);
		for neighbor in neighbors {
			self.graph.add_edge(fresh, neighbor, EdgeData::default());
		}
		self.index.insert(id, fresh);
	}
}

/// Post-process one node's integrated position: pull it toward the origin,
/// cap how far it moved, and fall back to `prev` when the result is not
/// finite. The flag reports whether that fallback happened.
fn settle(prev: (f32, f32), next: (f32, f32), settings: &LayoutSettings) -> (f32, f32, bool) {
	let gravity = settings.gravity as f32;
	let (mut x, mut y) = (next.0 - next.0 * gravity, next.1 - next.1 * gravity);

	if !(x.is_finite() && y.is_finite()) {
		return (prev.0, prev.1, true);
	}

	let (dx, dy) = (x - prev.0, y - prev.1);
	let dist = (dx * dx + dy * dy).sqrt();
	let max_move = settings.max_move as f32;
	if dist > max_move {
		let scale = max_move / dist;
		x = prev.0 + dx * scale;
		y = prev.1 + dy * scale;
	}
	(x, y, false)
}
