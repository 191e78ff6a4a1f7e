//! Host-facing entry points tying the store, simulator and interaction together.

use std::collections::HashSet;

use log::{info, warn};

use crate::error::Result;
use crate::graph::{GraphConfig, GraphInput, GraphStore};
use crate::interaction::{InteractionMachine, InteractionState, PointerEvent, Reaction};
use crate::layout::LayoutSupervisor;
use crate::style::{Scene, reduce_scene};

/// One visualization session.
///
/// `load` replaces everything, `handle` feeds pointer events, `sync_layout`
/// commits simulator output once per frame and `scene` produces what to draw.
pub struct GraphEngine {
	store: GraphStore,
	interaction: InteractionMachine,
	layout: LayoutSupervisor,
	config: GraphConfig,
}

impl Default for GraphEngine {
	fn default() -> Self {
		Self::new()
	}
}

impl GraphEngine {
	/// Empty session with default configuration.
	pub fn new() -> Self {
		let config = GraphConfig::default();
		Self {
			store: GraphStore::new(),
			interaction: InteractionMachine::new(),
			layout: LayoutSupervisor::new(config.layout.clone()),
			config,
		}
	}

	/// Rebuild the graph from a host payload.
	///
	/// On error the previous graph, interaction state and simulator are left
	/// exactly as they were.
	pub fn load(&mut self, input: &GraphInput) -> Result<()> {
		let store = match GraphStore::from_input(input) {
			Ok(store) => store,
			Err(err) => {
				warn!("engine: rejected graph input: {}", err);
				return Err(err);
			}
		};

		self.layout.stop();
		self.store = store;
		self.config = input.config.clone();
		self.interaction.reset();
		self.layout.set_settings(self.config.layout.clone());
		self.layout.start(&self.store);

		info!(
			"engine: loaded {} nodes, {} edges",
			self.store.node_count(),
			self.store.edge_count()
		);
		Ok(())
	}

	/// Stop the simulator and drop interaction state. The graph stays readable.
	pub fn teardown(&mut self) {
		self.layout.stop();
		self.interaction.reset();
		info!("engine: torn down");
	}

	/// Route a pointer event through the interaction machine and forward the
	/// resulting layout commands.
	pub fn handle(&mut self, event: &PointerEvent) -> Reaction {
		let reaction = self.interaction.handle(event, &mut self.store);
		for command in &reaction.layout {
			self.layout.send(command.clone());
		}
		reaction
	}

	/// Commit every queued simulator batch. Returns the number of position writes.
	pub fn sync_layout(&mut self) -> usize {
		self.layout
			.drain()
			.iter()
			.map(|batch| self.store.apply_positions(batch))
			.sum()
	}

	/// Replace the host-supplied highlight set.
	pub fn set_suggestions(&mut self, suggestions: Option<HashSet<String>>) -> Reaction {
		self.interaction.set_suggestions(suggestions)
	}

	/// Reduced node and edge attributes for the current frame.
	pub fn scene(&self) -> Scene {
		reduce_scene(&self.store, self.interaction.state())
	}

	/// Read-only view of the graph.
	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	/// Current interaction record.
	pub fn state(&self) -> &InteractionState {
		self.interaction.state()
	}

	/// Configuration of the loaded graph.
	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	/// Node under the pointer.
	pub fn hovered_node(&self) -> Option<&str> {
		self.interaction.state().hovered_node()
	}

	/// Currently selected node.
	pub fn selected_node(&self) -> Option<&str> {
		self.interaction.state().selected_node()
	}

	/// Whether the layout worker is running.
	pub fn is_simulating(&self) -> bool {
		self.layout.is_running()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::GraphError;
	use crate::graph::{EdgeInput, NodeInput};

	fn input(nodes: &[&str], edges: &[(&str, &str, &str)]) -> GraphInput {
		GraphInput {
			nodes: nodes.iter().map(|&id| NodeInput::new(id)).collect(),
			edges: edges
				.iter()
				.map(|&(id, s, t)| EdgeInput::new(id, s, t))
				.collect(),
			config: GraphConfig::default(),
		}
	}

	#[test]
	fn load_replaces_store_and_resets_interaction() {
		let mut engine = GraphEngine::new();
		engine.load(&input(&["a", "b"], &[("ab", "a", "b")])).unwrap();
		engine.handle(&PointerEvent::ClickNode("a".into()));
		assert_eq!(engine.selected_node(), Some("a"));
		assert!(engine.is_simulating());

		engine.load(&input(&["x"], &[])).unwrap();

		assert_eq!(engine.selected_node(), None);
		assert_eq!(engine.store().node_count(), 1);
		assert!(engine.is_simulating());
		engine.teardown();
	}

	#[test]
	fn failed_load_keeps_previous_graph() {
		let mut engine = GraphEngine::new();
		engine.load(&input(&["a", "b"], &[("ab", "a", "b")])).unwrap();
		engine.handle(&PointerEvent::ClickNode("b".into()));

		let err = engine
			.load(&input(&["a", "a"], &[]))
			.unwrap_err();

		assert!(matches!(err, GraphError::DuplicateId { .. }));
		assert_eq!(engine.store().node_count(), 2);
		assert_eq!(engine.store().edge_count(), 1);
		assert_eq!(engine.selected_node(), Some("b"));
		engine.teardown();
	}

	#[test]
	fn teardown_stops_simulation_and_is_repeatable() {
		let mut engine = GraphEngine::new();
		engine.load(&input(&["a"], &[])).unwrap();

		engine.teardown();
		engine.teardown();

		assert!(!engine.is_simulating());
		assert_eq!(engine.sync_layout(), 0);
		assert_eq!(engine.store().node_count(), 1);
	}
}
