//! Viewport transform between screen pixels and graph coordinates.

use crate::style::Scene;

/// Zoom bounds and auto-fit margin.
#[derive(Clone, Debug)]
pub struct CameraSettings {
	/// Minimum zoom factor (camera ratio 2).
	pub min_zoom: f64,
	/// Maximum zoom factor (camera ratio 0.25).
	pub max_zoom: f64,
	/// Fraction of the viewport left empty around the graph when fitting.
	pub fit_margin: f64,
}

impl Default for CameraSettings {
	fn default() -> Self {
		Self {
			min_zoom: 0.5,
			max_zoom: 4.0,
			fit_margin: 0.1,
		}
	}
}

/// Axis-aligned bounding box in graph coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Smallest x.
	pub min_x: f64,
	/// Smallest y.
	pub min_y: f64,
	/// Largest x.
	pub max_x: f64,
	/// Largest y.
	pub max_y: f64,
}

impl Bounds {
	/// Bounds of every node in `scene`, including node radii.
	pub fn of(scene: &Scene) -> Option<Self> {
		scene.nodes.iter().fold(None, |acc: Option<Bounds>, n| {
			let b = Bounds {
				min_x: n.x - n.size,
				min_y: n.y - n.size,
				max_x: n.x + n.size,
				max_y: n.y + n.size,
			};
			Some(match acc {
				None => b,
				Some(a) => Bounds {
					min_x: a.min_x.min(b.min_x),
					min_y: a.min_y.min(b.min_y),
					max_x: a.max_x.max(b.max_x),
					max_y: a.max_y.max(b.max_y),
				},
			})
		})
	}
}

/// Pan and zoom applied to the whole graph.
///
/// `x`/`y` is the screen position of the graph origin, `k` the zoom factor.
/// Until the user pans, zooms or drags, the camera keeps refitting itself to
/// the graph as the layout spreads out.
#[derive(Clone, Debug)]
pub struct Camera {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor.
	pub k: f64,
	auto_fit: bool,
	settings: CameraSettings,
}

impl Camera {
	/// Identity transform for a `width` x `height` viewport, auto-fitting.
	pub fn new(width: f64, height: f64, settings: CameraSettings) -> Self {
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0,
			auto_fit: true,
			settings,
		}
	}

	/// Screen pixels to graph coordinates.
	pub fn viewport_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Graph coordinates to screen pixels.
	pub fn graph_to_viewport(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Translate by a screen-space delta. Stops auto-fitting.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.auto_fit = false;
		self.x += dx;
		self.y += dy;
	}

	/// Zoom by `factor`, keeping the graph point under (`sx`, `sy`) in place.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		self.auto_fit = false;
		let new_k = (self.k * factor).clamp(self.settings.min_zoom, self.settings.max_zoom);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}

	/// Stop following the graph's bounding box.
	pub fn freeze(&mut self) {
		self.auto_fit = false;
	}

	/// Whether the camera still follows the scene bounds.
	pub fn is_auto_fit(&self) -> bool {
		self.auto_fit
	}

	/// Center `bounds` in a `width` x `height` viewport. No-op once frozen.
	pub fn fit(&mut self, bounds: Bounds, width: f64, height: f64) {
		if !self.auto_fit {
			return;
		}
		let (bw, bh) = (bounds.max_x - bounds.min_x, bounds.max_y - bounds.min_y);
		let usable = 1.0 - 2.0 * self.settings.fit_margin;
		let k = if bw > 0.0 && bh > 0.0 {
			((width * usable) / bw).min((height * usable) / bh)
		} else {
			1.0
		};
		self.k = k.clamp(self.settings.min_zoom, self.settings.max_zoom);
		let (cx, cy) = (
			(bounds.min_x + bounds.max_x) / 2.0,
			(bounds.min_y + bounds.max_y) / 2.0,
		);
		self.x = width / 2.0 - cx * self.k;
		self.y = height / 2.0 - cy * self.k;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn viewport_round_trips_through_graph_space() {
		let mut camera = Camera::new(800.0, 600.0, CameraSettings::default());
		camera.zoom_at(100.0, 50.0, 2.0);
		camera.pan_by(-30.0, 12.0);

		let (gx, gy) = camera.viewport_to_graph(250.0, 125.0);
		let (sx, sy) = camera.graph_to_viewport(gx, gy);
		assert!((sx - 250.0).abs() < 1e-9);
		assert!((sy - 125.0).abs() < 1e-9);
	}

	#[test]
	fn zoom_keeps_anchor_point_and_respects_bounds() {
		let mut camera = Camera::new(800.0, 600.0, CameraSettings::default());
		let before = camera.viewport_to_graph(200.0, 200.0);

		camera.zoom_at(200.0, 200.0, 1.5);
		let after = camera.viewport_to_graph(200.0, 200.0);
		assert!((before.0 - after.0).abs() < 1e-9);
		assert!((before.1 - after.1).abs() < 1e-9);

		camera.zoom_at(0.0, 0.0, 100.0);
		assert_eq!(camera.k, 4.0);
		camera.zoom_at(0.0, 0.0, 0.0001);
		assert_eq!(camera.k, 0.5);
	}

	#[test]
	fn fit_centers_bounds_until_frozen() {
		let mut camera = Camera::new(400.0, 400.0, CameraSettings::default());
		let bounds = Bounds {
			min_x: -100.0,
			min_y: -50.0,
			max_x: 100.0,
			max_y: 50.0,
		};
		camera.fit(bounds, 400.0, 400.0);
		assert_eq!(camera.graph_to_viewport(0.0, 0.0), (200.0, 200.0));
		assert!((camera.k - 1.6).abs() < 1e-9);

		camera.freeze();
		camera.fit(
			Bounds {
				min_x: 0.0,
				min_y: 0.0,
				max_x: 10.0,
				max_y: 10.0,
			},
			400.0,
			400.0,
		);
		assert!((camera.k - 1.6).abs() < 1e-9);
		assert!(!camera.is_auto_fit());
	}
}
