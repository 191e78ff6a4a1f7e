//! Pointer-driven hover, selection and drag state.
//!
//! [`InteractionMachine::handle`] turns node-level pointer events into state
//! transitions and reports what the caller has to do next through a
//! [`Reaction`]: request a redraw, suppress the camera for this gesture, or
//! forward a pin/move/release to the layout simulator. The machine never
//! draws anything, so it can be driven without a canvas.

use std::collections::HashSet;

use log::debug;

use crate::graph::{GraphStore, NodeAttribute};
use crate::layout::LayoutCommand;

/// Node-level pointer input, as emitted by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent {
	/// Pointer entered a node.
	EnterNode(String),
	/// Pointer left a node.
	LeaveNode(String),
	/// Press and release on the same node.
	ClickNode(String),
	/// Press and release on empty space.
	ClickStage,
	/// Button pressed over a node.
	DownNode(String),
	/// Button pressed over empty space.
	DownStage,
	/// Pointer moved; coordinates are already in graph space.
	MoveBody { x: f64, y: f64 },
	/// Button released over a node.
	UpNode(String),
	/// Button released over empty space.
	UpStage,
}

/// Options for a redraw request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshOptions {
	/// Only attributes changed, so renderer-side indexes can be kept.
	pub skip_indexation: bool,
}

impl RefreshOptions {
	/// Redraw without rebuilding any index.
	pub const ATTRIBUTES: Self = Self {
		skip_indexation: true,
	};
	/// Redraw and rebuild indexes.
	pub const FULL: Self = Self {
		skip_indexation: false,
	};
}

/// What the caller must do after an event was handled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reaction {
	/// Redraw request, if any visual state changed.
	pub refresh: Option<RefreshOptions>,
	/// The gesture is owned by a drag; the camera must not pan.
	pub consumed: bool,
	/// Commands for the layout simulator, in send order.
	pub layout: Vec<LayoutCommand>,
}

impl Reaction {
	fn none() -> Self {
		Self::default()
	}

	fn redraw() -> Self {
		Self {
			refresh: Some(RefreshOptions::ATTRIBUTES),
			..Self::default()
		}
	}
}

/// Dominant mode for the current pointer sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionMode {
	/// No hover, selection or drag.
	Idle,
	/// The pointer rests on a node.
	Hovering(String),
	/// A node is selected and nothing is hovered.
	Selected(String),
	/// A node is being dragged.
	Dragging(String),
}

/// The single interaction record read by the style reducers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
	hovered_node: Option<String>,
	selected_node: Option<String>,
	hovered_neighbors: HashSet<String>,
	suggestions: Option<HashSet<String>>,
	dragged_node: Option<String>,
}

impl InteractionState {
	/// Node under the pointer.
	pub fn hovered_node(&self) -> Option<&str> {
		self.hovered_node.as_deref()
	}

	/// Node chosen by the last click.
	pub fn selected_node(&self) -> Option<&str> {
		self.selected_node.as_deref()
	}

	/// Live neighbor set of the hovered node; empty when nothing is hovered.
	pub fn hovered_neighbors(&self) -> &HashSet<String> {
		&self.hovered_neighbors
	}

	/// Host-supplied highlight set, if any.
	pub fn suggestions(&self) -> Option<&HashSet<String>> {
		self.suggestions.as_ref()
	}

	/// Node currently held by a drag.
	pub fn dragged_node(&self) -> Option<&str> {
		self.dragged_node.as_deref()
	}

	/// Whether a drag is in progress.
	pub fn is_dragging(&self) -> bool {
		self.dragged_node.is_some()
	}

	/// Whether nothing is hovered, selected or dragged.
	pub fn is_idle(&self) -> bool {
		self.mode() == InteractionMode::Idle
	}

	/// Drag wins over hover, hover over selection.
	pub fn mode(&self) -> InteractionMode {
		if let Some(node) = &self.dragged_node {
			InteractionMode::Dragging(node.clone())
		} else if let Some(node) = &self.hovered_node {
			InteractionMode::Hovering(node.clone())
		} else if let Some(node) = &self.selected_node {
			InteractionMode::Selected(node.clone())
		} else {
			InteractionMode::Idle
		}
	}
}

/// Applies pointer transitions to an [`InteractionState`].
#[derive(Clone, Debug, Default)]
pub struct InteractionMachine {
	state: InteractionState,
}

impl InteractionMachine {
	/// Idle machine without suggestions.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current interaction record.
	pub fn state(&self) -> &InteractionState {
		&self.state
	}

	/// Back to idle. Suggestions are host-supplied and survive a reset.
	pub fn reset(&mut self) {
		let suggestions = self.state.suggestions.take();
		self.state = InteractionState {
			suggestions,
			..InteractionState::default()
		};
	}

	/// Replace the externally supplied highlight set.
	pub fn set_suggestions(&mut self, suggestions: Option<HashSet<String>>) -> Reaction {
		if self.state.suggestions == suggestions {
			return Reaction::none();
		}
		self.state.suggestions = suggestions;
		Reaction::redraw()
	}

	/// Handle one pointer event. Events naming nodes that are not in `store`
	/// are ignored.
	pub fn handle(&mut self, event: &PointerEvent, store: &mut GraphStore) -> Reaction {
		match event {
			PointerEvent::EnterNode(node) => self.set_hovered(Some(node.as_str()), store),
			PointerEvent::LeaveNode(node) => {
				if self.state.hovered_node.as_deref() == Some(node.as_str()) {
					self.set_hovered(None, store)
				} else {
					Reaction::none()
				}
			}
			PointerEvent::ClickNode(node) => self.set_selected(Some(node.as_str()), store),
			PointerEvent::ClickStage => self.set_selected(None, store),
			PointerEvent::DownNode(node) => self.begin_drag(node, store),
			PointerEvent::DownStage => Reaction::none(),
			PointerEvent::MoveBody { x, y } => self.drag_to(*x, *y, store),
			PointerEvent::UpNode(_) | PointerEvent::UpStage => self.end_drag(store),
		}
	}

	fn set_hovered(&mut self, node: Option<&str>, store: &GraphStore) -> Reaction {
		match node {
			Some(node) if store.has_node(node) => {
				debug!("interaction: hover {:?}", node);
				self.state.hovered_node = Some(node.to_string());
				self.state.hovered_neighbors = store
					.neighbors(node)
					.into_iter()
					.map(str::to_string)
					.collect();
			}
			Some(_) => return Reaction::none(),
			None => {
				self.state.hovered_node = None;
				self.state.hovered_neighbors.clear();
			}
		}
		Reaction::redraw()
	}

	fn set_selected(&mut self, node: Option<&str>, store: &GraphStore) -> Reaction {
		match node {
			Some(node) if store.has_node(node) => {
				debug!("interaction: select {:?}", node);
				self.state.selected_node = Some(node.to_string());
			}
			Some(_) => return Reaction::none(),
			None => self.state.selected_node = None,
		}
		Reaction::redraw()
	}

	fn begin_drag(&mut self, node: &str, store: &mut GraphStore) -> Reaction {
		let Some((x, y)) = store.node(node).map(|n| (n.x, n.y)) else {
			return Reaction::none();
		};
		// A press that arrives mid-drag hands the previous node back first.
		let mut layout = self.end_drag(store).layout;
		if store
			.set_node_attribute(node, NodeAttribute::Highlighted(true))
			.is_err()
		{
			return Reaction::none();
		}
		debug!("interaction: drag start {:?}", node);
		self.state.dragged_node = Some(node.to_string());
		layout.push(LayoutCommand::Pin {
			id: node.to_string(),
			x,
			y,
		});
		Reaction {
			refresh: Some(RefreshOptions::ATTRIBUTES),
			consumed: true,
			layout,
		}
	}

	fn drag_to(&mut self, x: f64, y: f64, store: &mut GraphStore) -> Reaction {
		let Some(node) = self.state.dragged_node.clone() else {
			return Reaction::none();
		};
		if store
			.set_node_attribute(&node, NodeAttribute::Position { x, y })
			.is_err()
		{
			// The node vanished under the drag; drop the gesture.
			self.state.dragged_node = None;
			return Reaction::none();
		}
		Reaction {
			refresh: Some(RefreshOptions::ATTRIBUTES),
			consumed: true,
			layout: vec![LayoutCommand::Move { id: node, x, y }],
		}
	}

	fn end_drag(&mut self, store: &mut GraphStore) -> Reaction {
		let Some(node) = self.state.dragged_node.take() else {
			return Reaction::none();
		};
		debug!("interaction: drag end {:?}", node);
		if store
			.set_node_attribute(&node, NodeAttribute::Highlighted(false))
			.is_err()
		{
			return Reaction::none();
		}
		Reaction {
			refresh: Some(RefreshOptions::ATTRIBUTES),
			consumed: true,
			layout: vec![LayoutCommand::Release { id: node }],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Edge, Node};

	fn abc() -> GraphStore {
		let mut store = GraphStore::new();
		for id in ["a", "b", "c"] {
			store.add_node(Node::new(id, 1.0, 1.0)).unwrap();
		}
		store.add_edge(Edge::new("ab", "a", "b")).unwrap();
		store
	}

	fn set(ids: &[&str]) -> HashSet<String> {
		ids.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn hover_tracks_live_neighbors() {
		let mut store = abc();
		let mut machine = InteractionMachine::new();

		let reaction = machine.handle(&PointerEvent::EnterNode("a".into()), &mut store);

		assert_eq!(reaction.refresh, Some(RefreshOptions::ATTRIBUTES));
		assert!(!reaction.consumed);
		assert_eq!(machine.state().hovered_node(), Some("a"));
		assert_eq!(machine.state().hovered_neighbors(), &set(&["b"]));
		assert_eq!(machine.state().mode(), InteractionMode::Hovering("a".into()));

		machine.handle(&PointerEvent::LeaveNode("a".into()), &mut store);
		assert_eq!(machine.state().hovered_node(), None);
		assert!(machine.state().hovered_neighbors().is_empty());
		assert!(machine.state().is_idle());
	}

	#[test]
	fn leaving_a_node_that_is_not_hovered_keeps_hover() {
		let mut store = abc();
		let mut machine = InteractionMachine::new();
		machine.handle(&PointerEvent::EnterNode("b".into()), &mut store);

		let reaction = machine.handle(&PointerEvent::LeaveNode("a".into()), &mut store);

		assert_eq!(reaction, Reaction::default());
		assert_eq!(machine.state().hovered_node(), Some("b"));
	}

	#[test]
	fn click_selects_and_stage_click_clears() {
		let mut store = abc();
		let mut machine = InteractionMachine::new();
		machine.handle(&PointerEvent::EnterNode("a".into()), &mut store);

		assert_eq!(machine.state().selected_node(), None);
		machine.handle(&PointerEvent::ClickNode("a".into()), &mut store);
		assert_eq!(machine.state().selected_node(), Some("a"));
		assert_eq!(machine.state().hovered_node(), Some("a"));

		machine.handle(&PointerEvent::ClickStage, &mut store);
		assert_eq!(machine.state().selected_node(), None);
	}

	#[test]
	fn drag_pins_moves_and_releases() {
		let mut store = abc();
		let mut machine = InteractionMachine::new();

		let down = machine.handle(&PointerEvent::DownNode("a".into()), &mut store);
		assert!(down.consumed);
		assert_eq!(
			down.layout,
			[LayoutCommand::Pin {
				id: "a".into(),
				x: 1.0,
				y: 1.0
			}]
		);
		assert!(machine.state().is_dragging());
		assert!(store.node("a").unwrap().highlighted);

		let moved = machine.handle(&PointerEvent::MoveBody { x: 10.0, y: 10.0 }, &mut store);
		assert!(moved.consumed);
		assert_eq!(moved.refresh, Some(RefreshOptions::ATTRIBUTES));

		let up = machine.handle(&PointerEvent::UpStage, &mut store);
		assert_eq!(up.layout, [LayoutCommand::Release { id: "a".into() }]);

		let a = store.node("a").unwrap();
		assert_eq!((a.x, a.y), (10.0, 10.0));
		assert!(!a.highlighted);
		assert!(!machine.state().is_dragging());
		assert_eq!(machine.state().dragged_node(), None);
	}

	#[test]
	fn second_press_releases_the_first_drag() {
		let mut store = abc();
		let mut machine = InteractionMachine::new();
		machine.handle(&PointerEvent::DownNode("a".into()), &mut store);

		let second = machine.handle(&PointerEvent::DownNode("b".into()), &mut store);
		assert_eq!(
			second.layout,
			[
				LayoutCommand::Release { id: "a".into() },
				LayoutCommand::Pin {
					id: "b".into(),
					x: 1.0,
					y: 1.0
				}
			]
		);
		assert!(!store.is_fixed("a"));
		assert!(store.is_fixed("b"));
		assert_eq!(machine.state().dragged_node(), Some("b"));

		machine.handle(&PointerEvent::UpStage, &mut store);
		assert!(!machine.state().is_dragging());
		assert!(store.nodes().iter().all(|n| !n.highlighted));
	}

	#[test]
	fn move_without_drag_is_not_consumed() {
		let mut store = abc();
		let mut machine = InteractionMachine::new();

		let reaction = machine.handle(&PointerEvent::MoveBody { x: 3.0, y: 3.0 }, &mut store);

		assert_eq!(reaction, Reaction::default());
		assert_eq!(store.node("a").unwrap().x, 1.0);
	}

	#[test]
	fn events_for_missing_nodes_are_no_ops() {
		let mut store = abc();
		let mut machine = InteractionMachine::new();

		for event in [
			PointerEvent::EnterNode("ghost".into()),
			PointerEvent::ClickNode("ghost".into()),
			PointerEvent::DownNode("ghost".into()),
			PointerEvent::UpNode("ghost".into()),
		] {
			assert_eq!(machine.handle(&event, &mut store), Reaction::default());
		}
		assert!(machine.state().is_idle());
	}

	#[test]
	fn drag_of_removed_node_is_dropped() {
		let mut store = abc();
		let mut machine = InteractionMachine::new();
		machine.handle(&PointerEvent::DownNode("c".into()), &mut store);
		store.remove_node("c").unwrap();

		let reaction = machine.handle(&PointerEvent::MoveBody { x: 1.0, y: 2.0 }, &mut store);

		assert_eq!(reaction, Reaction::default());
		assert!(!machine.state().is_dragging());
	}

	#[test]
	fn reset_keeps_suggestions() {
		let mut store = abc();
		let mut machine = InteractionMachine::new();
		machine.set_suggestions(Some(set(&["a"])));
		machine.handle(&PointerEvent::ClickNode("b".into()), &mut store);

		machine.reset();

		assert!(machine.state().is_idle());
		assert_eq!(machine.state().suggestions(), Some(&set(&["a"])));
	}

	#[test]
	fn unchanged_suggestions_do_not_redraw() {
		let mut machine = InteractionMachine::new();
		assert_eq!(machine.set_suggestions(None), Reaction::default());
		assert!(machine.set_suggestions(Some(set(&["a"]))).refresh.is_some());
		assert_eq!(machine.set_suggestions(Some(set(&["a"]))), Reaction::default());
	}
}
