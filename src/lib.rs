//! sigil-graph: Interactive force-directed graph visualization.
//!
//! The crate keeps a graph store, runs a force-directed layout off the UI
//! thread, tracks hover/selection/drag interaction and restyles the graph
//! every frame from that state. [`ForceGraphCanvas`] renders a session to a
//! canvas as a Leptos component.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod engine;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod style;

pub use components::force_graph::{ForceGraphCanvas, Theme};
pub use engine::GraphEngine;
pub use error::{GraphError, Result};
pub use graph::{EdgeInput, GraphConfig, GraphInput, GraphStore, NodeInput, RendererKind};
pub use interaction::{InteractionState, PointerEvent};
pub use layout::LayoutSettings;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("sigil-graph: logging initialized");
}

/// Two labelled nodes joined by one edge, drawn without edges.
pub fn sample_input() -> GraphInput {
	let mut abc = NodeInput::new("abc");
	abc.label = Some("A, B, and C".into());
	let mut xyz = NodeInput::new("xyz");
	xyz.label = Some("X, Y, and Z".into());

	GraphInput {
		nodes: vec![abc, xyz],
		edges: vec![EdgeInput::new("abc-xyz", "abc", "xyz")],
		config: GraphConfig {
			draw_edges: false,
			..GraphConfig::default()
		},
	}
}

/// Load the graph payload from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], edges: [...], config: {...} }
fn load_graph_input() -> Option<GraphInput> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match GraphInput::from_json(&json_text) {
		Ok(input) => {
			info!(
				"sigil-graph: loaded {} nodes, {} edges",
				input.nodes.len(),
				input.edges.len()
			);
			Some(input)
		}
		Err(e) => {
			warn!("sigil-graph: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads the graph payload from the DOM and renders the visualization.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let input = load_graph_input().unwrap_or_else(sample_input);
	let input_signal = Signal::derive(move || input.clone());
	let (selected, set_selected) = signal(None::<String>);

	let on_select = Callback::new(move |node: Option<String>| set_selected.set(node));
	let on_error = Callback::new(move |err: GraphError| warn!("sigil-graph: {}", err));

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Sigil Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas
				input=input_signal
				on_select=Some(on_select)
				on_error=Some(on_error)
				theme=Some(Theme::midnight())
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Sigil Graph"</h1>
				<p class="subtitle">"Click a node to select it. Drag nodes to pin them while held. Scroll to zoom."</p>
				<p class="selection">
					{move || selected.get().map(|id| format!("Selected: {id}")).unwrap_or_default()}
				</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sample_builds_a_two_node_graph() {
		let input = sample_input();
		assert!(input.validate().is_ok());
		assert!(!input.config.draw_edges);

		let store = GraphStore::from_input(&input).unwrap();
		assert_eq!(store.node_count(), 2);
		assert!(store.are_neighbors(Some("abc"), Some("xyz")));
		assert_eq!(store.node("abc").map(|n| n.label.as_str()), Some("A, B, and C"));
	}
}
