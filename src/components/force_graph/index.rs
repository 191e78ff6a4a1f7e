//! Renderer-side index over the drawn scene: draw order, id lookup and edge
//! endpoint slots. Rebuilt only when topology changes.

use std::collections::HashMap;

use log::debug;

use super::camera::Camera;
use super::scale::ScaledValues;
use crate::interaction::RefreshOptions;
use crate::style::Scene;

/// Draw order and lookups for one [`Scene`] layout.
#[derive(Clone, Debug, Default)]
pub struct SceneIndex {
	/// Slots into `scene.nodes`, back to front.
	order: Vec<usize>,
	slots: HashMap<String, usize>,
	/// Endpoint slots per scene edge.
	edges: Vec<Option<(usize, usize)>>,
	stale: bool,
	dirty: bool,
	reindexed: u64,
}

impl SceneIndex {
	/// Empty index that needs a full refresh.
	pub fn new() -> Self {
		Self {
			stale: true,
			dirty: true,
			..Self::default()
		}
	}

	/// Request a redraw, rebuilding the index first unless skipped.
	pub fn refresh(&mut self, options: RefreshOptions) {
		self.dirty = true;
		if !options.skip_indexation {
			self.stale = true;
		}
	}

	/// Rebuild if a full refresh was requested or the scene's shape changed.
	pub fn prepare(&mut self, scene: &Scene) {
		if self.stale
			|| self.slots.len() != scene.nodes.len()
			|| self.edges.len() != scene.edges.len()
		{
			self.reindex(scene);
		}
	}

	/// Whether a redraw is pending; clears the request.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}

	/// Number of rebuilds so far.
	pub fn reindex_count(&self) -> u64 {
		self.reindexed
	}

	/// Node slots back to front; larger nodes are drawn last.
	pub fn order(&self) -> &[usize] {
		&self.order
	}

	/// Draw slot of node `id`.
	pub fn slot(&self, id: &str) -> Option<usize> {
		self.slots.get(id).copied()
	}

	/// Endpoint slots of the edge at `edge_slot`.
	pub fn endpoints(&self, edge_slot: usize) -> Option<(usize, usize)> {
		self.edges.get(edge_slot).copied().flatten()
	}

	/// Topmost node under the screen point (`sx`, `sy`).
	pub fn hit_test<'a>(
		&self,
		scene: &'a Scene,
		camera: &Camera,
		scale: &ScaledValues,
		sx: f64,
		sy: f64,
	) -> Option<&'a str> {
		let (gx, gy) = camera.viewport_to_graph(sx, sy);
		self.order.iter().rev().find_map(|&slot| {
			let node = scene.nodes.get(slot)?;
			let (dx, dy) = (node.x - gx, node.y - gy);
			let reach = scale.node_radius(node.size) + scale.hit_padding;
			(dx * dx + dy * dy <= reach * reach).then_some(node.id.as_str())
		})
	}

	fn reindex(&mut self, scene: &Scene) {
		self.slots = scene
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();

		let mut order: Vec<usize> = (0..scene.nodes.len()).collect();
		order.sort_by(|&a, &b| scene.nodes[a].size.total_cmp(&scene.nodes[b].size));
		self.order = order;

		self.edges = scene
			.edges
			.iter()
			.map(|e| Some((self.slot(&e.source)?, self.slot(&e.target)?)))
			.collect();

		self.stale = false;
		self.reindexed += 1;
		debug!(
			"renderer: reindexed {} nodes, {} edges",
			scene.nodes.len(),
			scene.edges.len()
		);
	}
}
