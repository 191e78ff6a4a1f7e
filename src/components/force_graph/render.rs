//! Canvas rendering for the force graph.
//!
//! Draws one reduced [`Scene`] per call. Rendering uses multiple passes for
//! correct z-ordering:
//! 1. Background (screen space)
//! 2. Edges, then edge labels (world space)
//! 3. Nodes back to front, then node labels on top

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::camera::Camera;
use super::index::SceneIndex;
use super::scale::ScaledValues;
use super::theme::{Color, Theme};
use crate::style::{NodeDisplay, Scene};

/// Everything a single draw call reads.
pub struct Frame<'a> {
	pub scene: &'a Scene,
	pub index: &'a SceneIndex,
	pub camera: &'a Camera,
	pub scale: &'a ScaledValues,
	pub theme: &'a Theme,
	pub draw_edges: bool,
	pub width: f64,
	pub height: f64,
}

/// Renders the complete graph to the canvas.
pub fn render(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	draw_background(frame, ctx);

	ctx.save();
	let _ = ctx.translate(frame.camera.x, frame.camera.y);
	let _ = ctx.scale(frame.camera.k, frame.camera.k);

	if frame.draw_edges {
		draw_edges(frame, ctx);
	}
	draw_nodes(frame, ctx);

	ctx.restore();
}

fn draw_background(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let background = &frame.theme.background;
	let gradient = background
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(
				frame.width / 2.0,
				frame.height / 2.0,
				0.0,
				frame.width / 2.0,
				frame.height / 2.0,
				frame.width.max(frame.height) * 0.8,
			)
			.ok()
		})
		.flatten();

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&background.color.to_css()),
	}

	ctx.fill_rect(0.0, 0.0, frame.width, frame.height);
}

fn draw_edges(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let scale = frame.scale;
	let nodes = &frame.scene.nodes;

	for (slot, edge) in frame.scene.edges.iter().enumerate() {
		if edge.hidden {
			continue;
		}
		let Some((s, t)) = frame.index.endpoints(slot) else {
			continue;
		};
		let (Some(n1), Some(n2)) = (nodes.get(s), nodes.get(t)) else {
			continue;
		};

		let color = edge
			.color
			.as_deref()
			.map(Color::parse)
			.unwrap_or(frame.theme.edge.color);
		ctx.set_stroke_style_str(&color.to_css());
		ctx.set_line_width(
			edge.size
				.map(|size| size / scale.k)
				.unwrap_or(scale.edge_line_width),
		);

		ctx.begin_path();
		ctx.move_to(n1.x, n1.y);
		ctx.line_to(n2.x, n2.y);
		ctx.stroke();
	}

	if !scale.show_edge_labels {
		return;
	}

	ctx.set_font(&scale.edge_label_font);
	ctx.set_fill_style_str(&frame.theme.edge.label_color.to_css());
	ctx.set_text_align("center");
	for (slot, edge) in frame.scene.edges.iter().enumerate() {
		let Some(label) = edge.label.as_deref().filter(|l| !edge.hidden && !l.is_empty()) else {
			continue;
		};
		let Some((s, t)) = frame.index.endpoints(slot) else {
			continue;
		};
		if let (Some(n1), Some(n2)) = (nodes.get(s), nodes.get(t)) {
			let _ = ctx.fill_text(label, (n1.x + n2.x) / 2.0, (n1.y + n2.y) / 2.0);
		}
	}
	ctx.set_text_align("start");
}

fn draw_nodes(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) {
	let nodes = &frame.scene.nodes;

	for &slot in frame.index.order() {
		if let Some(node) = nodes.get(slot) {
			draw_node(frame, ctx, node, slot);
		}
	}

	// Labels go on top of every node.
	ctx.set_font(&frame.scale.label_font);
	ctx.set_fill_style_str(&frame.theme.node.label_color.to_css());
	for &slot in frame.index.order() {
		let Some(node) = nodes.get(slot) else {
			continue;
		};
		if node.label.is_empty()
			|| !frame
				.scale
				.shows_label(node.size, node.force_label || node.highlighted)
		{
			continue;
		}
		let radius = frame.scale.node_radius(node.size);
		let _ = ctx.fill_text(
			&node.label,
			node.x + radius + frame.scale.label_gap,
			node.y + radius / 3.0,
		);
	}
}

fn draw_node(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d, node: &NodeDisplay, slot: usize) {
	let scale = frame.scale;
	let theme = frame.theme;
	let (x, y) = (node.x, node.y);
	let radius = scale.node_radius(node.size);
	let base_color = node
		.color
		.as_deref()
		.map(Color::parse)
		.unwrap_or_else(|| theme.palette.get(slot));

	let gradient = (theme.node.use_gradient && !node.dimmed)
		.then(|| {
			ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
				.ok()
		})
		.flatten();

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &base_color.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &base_color.to_css());
			let _ = gradient.add_color_stop(1.0, &base_color.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&base_color.to_css()),
	}
	ctx.fill();

	if theme.node.border_width > 0.0 {
		ctx.set_stroke_style_str(&theme.node.border_color.to_css());
		ctx.set_line_width(theme.node.border_width / scale.k);
		ctx.stroke();
	}

	if node.highlighted {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + scale.ring_offset, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&theme.node.ring_color.to_css());
		ctx.set_line_width(scale.ring_width);
		ctx.stroke();
	}
}
