//! End-to-end sessions driven through [`GraphEngine`] without a canvas.

use std::collections::HashSet;

use sigil_graph::{EdgeInput, GraphEngine, GraphError, GraphInput, NodeInput, PointerEvent};

fn node(id: &str, x: f64, y: f64) -> NodeInput {
	let mut node = NodeInput::new(id);
	node.x = Some(x);
	node.y = Some(y);
	node
}

/// a - b, with c on its own.
fn triangle_input() -> GraphInput {
	GraphInput {
		nodes: vec![node("a", 0.0, 0.0), node("b", 50.0, 0.0), node("c", 0.0, 50.0)],
		edges: vec![EdgeInput::new("ab", "a", "b")],
		..GraphInput::default()
	}
}

fn loaded() -> GraphEngine {
	let mut engine = GraphEngine::new();
	engine.load(&triangle_input()).unwrap();
	engine
}

#[test]
fn hover_focuses_the_neighborhood() {
	let mut engine = loaded();
	engine.handle(&PointerEvent::EnterNode("a".into()));

	let expected: HashSet<String> = ["b".to_string()].into_iter().collect();
	assert_eq!(engine.state().hovered_neighbors(), &expected);

	let scene = engine.scene();
	assert!(scene.node("a").unwrap().highlighted);
	assert_eq!(scene.node("b").unwrap().label, "b");
	assert_eq!(scene.node("c").unwrap().label, "");
	assert!(scene.node("c").unwrap().dimmed);
	assert!(!scene.edge("ab").unwrap().hidden);

	engine.handle(&PointerEvent::LeaveNode("a".into()));
	let scene = engine.scene();
	assert_eq!(scene.node("c").unwrap().label, "c");
	assert!(engine.state().hovered_neighbors().is_empty());
	engine.teardown();
}

#[test]
fn clicks_toggle_selection() {
	let mut engine = loaded();
	assert_eq!(engine.selected_node(), None);

	engine.handle(&PointerEvent::ClickNode("a".into()));
	assert_eq!(engine.selected_node(), Some("a"));

	engine.handle(&PointerEvent::ClickStage);
	assert_eq!(engine.selected_node(), None);
	engine.teardown();
}

#[test]
fn dragging_pins_then_releases() {
	let mut engine = loaded();

	let down = engine.handle(&PointerEvent::DownNode("a".into()));
	assert!(down.consumed);
	assert!(engine.store().is_fixed("a"));

	let moved = engine.handle(&PointerEvent::MoveBody { x: 10.0, y: 10.0 });
	assert!(moved.consumed);

	engine.handle(&PointerEvent::UpNode("a".into()));
	let a = engine.store().node("a").unwrap();
	assert_eq!((a.x, a.y), (10.0, 10.0));
	assert!(!a.highlighted);
	assert!(!engine.state().is_dragging());

	// Without a drag, moving the pointer leaves the camera free.
	let idle = engine.handle(&PointerEvent::MoveBody { x: 20.0, y: 20.0 });
	assert!(!idle.consumed);
	engine.teardown();
}

#[test]
fn dropped_node_stays_where_it_was_released() {
	let mut engine = loaded();
	// Let the simulator queue up batches that still hold the old position.
	std::thread::sleep(std::time::Duration::from_millis(40));

	engine.handle(&PointerEvent::DownNode("a".into()));
	engine.handle(&PointerEvent::MoveBody { x: 10.0, y: 10.0 });
	engine.handle(&PointerEvent::UpNode("a".into()));
	engine.sync_layout();

	let a = engine.store().node("a").unwrap();
	let drift = ((a.x - 10.0).powi(2) + (a.y - 10.0).powi(2)).sqrt();
	assert!(drift < 3.0, "a drifted {drift} to ({}, {})", a.x, a.y);
	assert!(!a.highlighted);
	engine.teardown();
}

#[test]
fn pressing_another_node_mid_drag_releases_the_first() {
	let mut engine = loaded();
	engine.handle(&PointerEvent::DownNode("a".into()));
	engine.handle(&PointerEvent::DownNode("b".into()));
	engine.handle(&PointerEvent::UpStage);

	assert!(!engine.state().is_dragging());
	assert!(!engine.store().is_fixed("a"));
	assert!(!engine.store().is_fixed("b"));
	engine.teardown();
}

#[test]
fn suggestions_force_labels_and_hide_other_edges() {
	let mut engine = loaded();
	let suggested: HashSet<String> = ["a".to_string(), "c".to_string()].into_iter().collect();
	assert!(engine.set_suggestions(Some(suggested)).refresh.is_some());

	let scene = engine.scene();
	assert!(scene.node("a").unwrap().force_label);
	assert!(scene.node("b").unwrap().dimmed);
	assert!(scene.edge("ab").unwrap().hidden);

	assert!(engine.set_suggestions(None).refresh.is_some());
	assert!(!engine.scene().edge("ab").unwrap().hidden);
	engine.teardown();
}

#[test]
fn neighbor_queries_tolerate_absent_nodes() {
	let engine = loaded();
	let store = engine.store();
	assert!(store.are_neighbors(Some("a"), Some("b")));
	assert!(store.are_neighbors(Some("b"), Some("a")));
	assert!(!store.are_neighbors(Some("a"), Some("c")));
	assert!(!store.are_neighbors(Some("a"), None));
	assert!(!store.are_neighbors(None, None));
}

#[test]
fn rejected_reload_keeps_the_previous_graph() {
	let mut engine = loaded();
	engine.handle(&PointerEvent::ClickNode("a".into()));

	let mut broken = triangle_input();
	broken.edges.push(EdgeInput::new("ax", "a", "x"));
	let err = engine.load(&broken).unwrap_err();
	assert!(matches!(err, GraphError::UnknownEndpoint { .. }));

	assert_eq!(engine.store().node_count(), 3);
	assert_eq!(engine.selected_node(), Some("a"));

	let json = r#"{ "nodes": [{ "id": "solo" }], "edges": [], "config": { "drawEdges": false } }"#;
	engine.load(&GraphInput::from_json(json).unwrap()).unwrap();
	assert_eq!(engine.store().node_count(), 1);
	assert_eq!(engine.selected_node(), None);
	assert!(!engine.config().draw_edges);
	engine.teardown();
}

#[test]
fn layout_output_never_moves_a_dragged_node() {
	let mut engine = loaded();
	engine.handle(&PointerEvent::DownNode("c".into()));
	engine.handle(&PointerEvent::MoveBody { x: -40.0, y: 25.0 });

	for _ in 0..20 {
		engine.sync_layout();
		std::thread::sleep(std::time::Duration::from_millis(5));
	}
	let c = engine.store().node("c").unwrap();
	assert_eq!((c.x, c.y), (-40.0, 25.0));

	for node in engine.store().nodes() {
		assert!(node.x.is_finite() && node.y.is_finite());
	}
	engine.teardown();
	assert!(!engine.is_simulating());
}
