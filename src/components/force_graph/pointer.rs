//! Turns raw mouse input plus a hit test into node-level pointer events.

use crate::interaction::PointerEvent;

/// Press and release closer than this (in pixels) count as a click.
const CLICK_TOLERANCE: f64 = 4.0;

/// `MouseEvent.button` of the main (usually left) button.
pub const PRIMARY_BUTTON: i16 = 0;

#[derive(Clone, Debug)]
struct Press {
	target: Option<String>,
	origin: (f64, f64),
	moved: bool,
}

/// Result of a pointer move.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Movement {
	/// Node-level events to feed the engine.
	pub events: Vec<PointerEvent>,
	/// Screen delta to pan the camera by while a button is held, unless an
	/// event handler consumed the gesture.
	pub pan: Option<(f64, f64)>,
}

/// Tracks which node the pointer is over and the current press, if any.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
	entered: Option<String>,
	press: Option<Press>,
	last: (f64, f64),
}

impl PointerTracker {
	/// Tracker with no button held.
	pub fn new() -> Self {
		Self::default()
	}

	/// Node currently under the pointer.
	pub fn entered(&self) -> Option<&str> {
		self.entered.as_deref()
	}

	/// Whether the primary button is held.
	pub fn is_pressed(&self) -> bool {
		self.press.is_some()
	}

	/// Button pressed at screen (`sx`, `sy`) over `hit`. Only the primary
	/// button starts a press.
	pub fn down(&mut self, button: i16, sx: f64, sy: f64, hit: Option<&str>) -> Vec<PointerEvent> {
		if button != PRIMARY_BUTTON {
			return Vec::new();
		}
		self.last = (sx, sy);
		self.press = Some(Press {
			target: hit.map(str::to_string),
			origin: (sx, sy),
			moved: false,
		});
		vec![match hit {
			Some(node) => PointerEvent::DownNode(node.to_string()),
			None => PointerEvent::DownStage,
		}]
	}

	/// Pointer moved to screen (`sx`, `sy`), graph point `graph`, over `hit`.
	pub fn move_to(&mut self, sx: f64, sy: f64, graph: (f64, f64), hit: Option<&str>) -> Movement {
		let mut events = self.cross(hit);
		events.push(PointerEvent::MoveBody {
			x: graph.0,
			y: graph.1,
		});

		let pan = self.press.as_mut().map(|press| {
			let (ox, oy) = press.origin;
			if ((sx - ox).powi(2) + (sy - oy).powi(2)).sqrt() > CLICK_TOLERANCE {
				press.moved = true;
			}
			(sx - self.last.0, sy - self.last.1)
		});
		self.last = (sx, sy);

		Movement { events, pan }
	}

	/// Button released at screen (`sx`, `sy`) over `hit`.
	pub fn up(&mut self, button: i16, sx: f64, sy: f64, hit: Option<&str>) -> Vec<PointerEvent> {
		if button != PRIMARY_BUTTON {
			return Vec::new();
		}
		self.last = (sx, sy);
		let mut events = vec![match hit {
			Some(node) => PointerEvent::UpNode(node.to_string()),
			None => PointerEvent::UpStage,
		}];

		if let Some(press) = self.press.take() {
			if !press.moved {
				match (hit, press.target.as_deref()) {
					(Some(node), Some(target)) if node == target => {
						events.push(PointerEvent::ClickNode(node.to_string()));
					}
					(None, None) => events.push(PointerEvent::ClickStage),
					_ => {}
				}
			}
		}
		events
	}

	/// Pointer left the surface: leave any entered node and end any press.
	pub fn leave(&mut self) -> Vec<PointerEvent> {
		let mut events = self.cross(None);
		if self.press.take().is_some() {
			events.push(PointerEvent::UpStage);
		}
		events
	}

	fn cross(&mut self, hit: Option<&str>) -> Vec<PointerEvent> {
		if self.entered.as_deref() == hit {
			return Vec::new();
		}
		let mut events = Vec::with_capacity(2);
		if let Some(old) = self.entered.take() {
			events.push(PointerEvent::LeaveNode(old));
		}
		if let Some(new) = hit {
			events.push(PointerEvent::EnterNode(new.to_string()));
			self.entered = Some(new.to_string());
		}
		events
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn crossing_nodes_emits_leave_then_enter() {
		let mut tracker = PointerTracker::new();

		let first = tracker.move_to(0.0, 0.0, (0.0, 0.0), Some("a"));
		assert_eq!(
			first.events,
			vec![
				PointerEvent::EnterNode("a".into()),
				PointerEvent::MoveBody { x: 0.0, y: 0.0 }
			]
		);
		assert_eq!(first.pan, None);

		let second = tracker.move_to(1.0, 0.0, (1.0, 0.0), Some("b"));
		assert_eq!(
			second.events[..2],
			[
				PointerEvent::LeaveNode("a".into()),
				PointerEvent::EnterNode("b".into())
			]
		);

		let third = tracker.move_to(2.0, 0.0, (2.0, 0.0), None);
		assert_eq!(third.events[0], PointerEvent::LeaveNode("b".into()));
		assert_eq!(tracker.entered(), None);
	}

	#[test]
	fn press_and_release_in_place_is_a_click() {
		let mut tracker = PointerTracker::new();
		assert_eq!(tracker.down(PRIMARY_BUTTON, 10.0, 10.0, Some("a")), vec![PointerEvent::DownNode("a".into())]);
		assert_eq!(
			tracker.up(PRIMARY_BUTTON, 11.0, 10.0, Some("a")),
			vec![PointerEvent::UpNode("a".into()), PointerEvent::ClickNode("a".into())]
		);

		tracker.down(PRIMARY_BUTTON, 50.0, 50.0, None);
		assert_eq!(
			tracker.up(PRIMARY_BUTTON, 50.0, 50.0, None),
			vec![PointerEvent::UpStage, PointerEvent::ClickStage]
		);
	}

	#[test]
	fn dragging_suppresses_click_and_reports_pan() {
		let mut tracker = PointerTracker::new();
		tracker.down(PRIMARY_BUTTON, 0.0, 0.0, None);

		let movement = tracker.move_to(30.0, 40.0, (3.0, 4.0), None);
		assert_eq!(movement.pan, Some((30.0, 40.0)));
		let movement = tracker.move_to(35.0, 40.0, (3.5, 4.0), None);
		assert_eq!(movement.pan, Some((5.0, 0.0)));

		assert_eq!(tracker.up(PRIMARY_BUTTON, 35.0, 40.0, None), vec![PointerEvent::UpStage]);
		assert!(!tracker.is_pressed());
	}

	#[test]
	fn secondary_buttons_are_ignored() {
		let mut tracker = PointerTracker::new();
		assert!(tracker.down(2, 10.0, 10.0, Some("a")).is_empty());
		assert!(!tracker.is_pressed());

		tracker.down(PRIMARY_BUTTON, 10.0, 10.0, Some("a"));
		assert!(tracker.down(1, 10.0, 10.0, Some("b")).is_empty());
		assert!(tracker.up(2, 10.0, 10.0, Some("a")).is_empty());
		assert!(tracker.is_pressed());
		assert_eq!(
			tracker.up(PRIMARY_BUTTON, 10.0, 10.0, Some("a")),
			vec![PointerEvent::UpNode("a".into()), PointerEvent::ClickNode("a".into())]
		);
	}

	#[test]
	fn leaving_the_surface_ends_hover_and_press() {
		let mut tracker = PointerTracker::new();
		tracker.move_to(0.0, 0.0, (0.0, 0.0), Some("a"));
		tracker.down(PRIMARY_BUTTON, 0.0, 0.0, Some("a"));

		assert_eq!(
			tracker.leave(),
			vec![PointerEvent::LeaveNode("a".into()), PointerEvent::UpStage]
		);
		assert!(tracker.leave().is_empty());
	}
}
