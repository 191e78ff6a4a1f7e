//! Zoom-dependent scaling configuration for graph visuals.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: the coordinate system of the graph. Values in
//!   world-space scale proportionally with zoom.
//! - **Screen-space**: pixel coordinates on the canvas. Values in
//!   screen-space remain constant regardless of zoom level.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// Compute the world-space value for a given base value and zoom level.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Node drawing parameters.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// How a node's `size` (its radius in graph units) scales with zoom.
	pub radius_behavior: ScaleBehavior,
	/// Extra hit radius around every node, in screen pixels.
	pub hit_padding: f64,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Labels of nodes rendered smaller than this (in pixels) are skipped
	/// unless forced.
	pub label_threshold: f64,
}

/// Edge drawing parameters.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Line width in screen pixels for edges without a size.
	pub line_width: f64,
	/// Edge label font size in screen pixels.
	pub label_size: f64,
	/// Whether edge labels are drawn at all.
	pub show_labels: bool,
}

/// Highlight ring around hovered, selected and dragged nodes.
#[derive(Clone, Debug)]
pub struct RingScaleConfig {
	/// Stroke width in screen pixels.
	pub width: f64,
	/// Gap between node and ring in screen pixels.
	pub offset: f64,
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Node radius, hit and label settings.
	pub node: NodeScaleConfig,
	/// Edge line and label settings.
	pub edge: EdgeScaleConfig,
	/// Highlight ring settings.
	pub ring: RingScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 2.0,
					max_screen: f64::INFINITY,
				},
				hit_padding: 3.0,
				label_size: 12.0,
				label_threshold: 4.0,
			},
			edge: EdgeScaleConfig {
				line_width: 1.0,
				label_size: 12.0,
				show_labels: true,
			},
			ring: RingScaleConfig {
				width: 2.0,
				offset: 2.0,
			},
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
/// All sizes are in world-space (ready to use after canvas transform).
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Current zoom level.
	pub k: f64,
	radius_behavior: ScaleBehavior,
	label_threshold: f64,
	/// Hit padding in world-space.
	pub hit_padding: f64,
	/// Node label font (e.g., "6px sans-serif" at k = 2).
	pub label_font: String,
	/// Offset of a node label from the node's edge.
	pub label_gap: f64,
	/// Default edge line width in world-space.
	pub edge_line_width: f64,
	/// Edge label font.
	pub edge_label_font: String,
	/// Whether edge labels are drawn.
	pub show_edge_labels: bool,
	/// Ring stroke width in world-space.
	pub ring_width: f64,
	/// Ring gap in world-space.
	pub ring_offset: f64,
}

impl ScaledValues {
	/// Compute scaled values from configuration and current zoom level.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			k,
			radius_behavior: config.node.radius_behavior.clone(),
			label_threshold: config.node.label_threshold,
			hit_padding: config.node.hit_padding / k,
			label_font: format!("{}px sans-serif", config.node.label_size / k),
			label_gap: 4.0 / k,
			edge_line_width: config.edge.line_width / k,
			edge_label_font: format!("{}px sans-serif", config.edge.label_size / k),
			show_edge_labels: config.edge.show_labels,
			ring_width: config.ring.width / k,
			ring_offset: config.ring.offset / k,
		}
	}

	/// World-space radius of a node of the given size.
	pub fn node_radius(&self, size: f64) -> f64 {
		self.radius_behavior.apply(size, self.k)
	}

	/// Whether a label should be drawn for a node of the given size.
	pub fn shows_label(&self, size: f64, forced: bool) -> bool {
		forced || self.node_radius(size) * self.k >= self.label_threshold
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn behaviors_convert_to_world_space() {
		assert_eq!(ScaleBehavior::World.apply(5.0, 2.0), 5.0);
		assert_eq!(ScaleBehavior::Screen.apply(5.0, 2.0), 2.5);
		let clamped = ScaleBehavior::Clamped {
			min_screen: 4.0,
			max_screen: 20.0,
		};
		assert_eq!(clamped.apply(1.0, 1.0), 4.0);
		assert_eq!(clamped.apply(50.0, 1.0), 20.0);
		assert_eq!(clamped.apply(5.0, 1.0), 5.0);
	}

	#[test]
	fn small_nodes_hide_labels_unless_forced() {
		let config = ScaleConfig::default();
		let zoomed_out = ScaledValues::new(&config, 0.5);
		assert!(zoomed_out.shows_label(10.0, false));
		assert!(!zoomed_out.shows_label(5.0, false));
		assert!(zoomed_out.shows_label(5.0, true));

		let zoomed_in = ScaledValues::new(&config, 2.0);
		assert!(zoomed_in.shows_label(5.0, false));
	}
}
