//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers that feed the [`PointerTracker`], which in turn drives the
//! [`GraphEngine`]'s interaction machine. An animation loop runs via
//! `requestAnimationFrame`; each frame commits simulator output and redraws
//! only when something asked for a refresh.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::camera::{Bounds, Camera, CameraSettings};
use super::index::SceneIndex;
use super::pointer::PointerTracker;
use super::render::{self, Frame};
use super::scale::{ScaleConfig, ScaledValues};
use super::theme::Theme;
use crate::engine::GraphEngine;
use crate::error::GraphError;
use crate::graph::{GraphInput, RendererKind};
use crate::interaction::{PointerEvent, RefreshOptions};
use crate::style::Scene;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Bundles the engine with everything the renderer keeps between frames.
struct GraphContext {
	engine: GraphEngine,
	loaded: Option<GraphInput>,
	scene: Scene,
	index: SceneIndex,
	camera: Camera,
	pointer: PointerTracker,
	scale: ScaleConfig,
	theme: Theme,
	ctx: CanvasRenderingContext2d,
	width: f64,
	height: f64,
}

impl GraphContext {
	/// Replace the graph. Identical payloads are ignored.
	fn load(&mut self, input: &GraphInput) -> Result<(), GraphError> {
		if self.loaded.as_ref() == Some(input) {
			return Ok(());
		}
		self.engine.load(input)?;
		self.loaded = Some(input.clone());
		self.pointer = PointerTracker::new();
		self.camera = Camera::new(self.width, self.height, CameraSettings::default());
		self.scene = self.engine.scene();
		self.index.refresh(RefreshOptions::FULL);
		Ok(())
	}

	fn hit(&self, sx: f64, sy: f64) -> Option<String> {
		let scale = ScaledValues::new(&self.scale, self.camera.k);
		self.index
			.hit_test(&self.scene, &self.camera, &scale, sx, sy)
			.map(str::to_string)
	}

	/// Feed events to the engine. Returns whether any of them was consumed.
	fn dispatch(&mut self, events: Vec<PointerEvent>) -> bool {
		let mut consumed = false;
		for event in events {
			let reaction = self.engine.handle(&event);
			if let Some(options) = reaction.refresh {
				self.index.refresh(options);
			}
			if reaction.consumed {
				consumed = true;
				if matches!(event, PointerEvent::DownNode(_)) {
					// The view stops following the layout once the user drags.
					self.camera.freeze();
				}
			}
		}
		consumed
	}

	fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.index.refresh(RefreshOptions::ATTRIBUTES);
	}

	fn frame(&mut self) {
		if self.engine.sync_layout() > 0 {
			self.index.refresh(RefreshOptions::ATTRIBUTES);
		}
		if !self.index.take_dirty() {
			return;
		}

		self.scene = self.engine.scene();
		self.index.prepare(&self.scene);
		if let Some(bounds) = Bounds::of(&self.scene) {
			self.camera.fit(bounds, self.width, self.height);
		}

		let scale = ScaledValues::new(&self.scale, self.camera.k);
		render::render(
			&Frame {
				scene: &self.scene,
				index: &self.index,
				camera: &self.camera,
				scale: &scale,
				theme: &self.theme,
				draw_edges: self.engine.config().draw_edges,
				width: self.width,
				height: self.height,
			},
			&self.ctx,
		);
	}
}

/// Handles a mounted component needs released when it is cleaned up.
struct Mounted {
	context: Rc<RefCell<Option<GraphContext>>>,
	animate: FrameCallback,
	resize: FrameCallback,
	frame: Rc<Cell<Option<i32>>>,
}

thread_local! {
	static MOUNTED: RefCell<HashMap<u64, Mounted>> = RefCell::new(HashMap::new());
}

static NEXT_MOUNT: AtomicU64 = AtomicU64::new(0);

/// Stop the simulator, cancel the animation loop and drop listeners.
fn release(id: u64) {
	let Some(mounted) = MOUNTED.with_borrow_mut(|m| m.remove(&id)) else {
		return;
	};
	if let Some(window) = web_sys::window() {
		if let Some(frame) = mounted.frame.take() {
			let _ = window.cancel_animation_frame(frame);
		}
		if let Some(cb) = mounted.resize.borrow_mut().take() {
			let _ =
				window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	}
	mounted.animate.borrow_mut().take();
	if let Some(mut context) = mounted.context.borrow_mut().take() {
		context.engine.teardown();
	}
	info!("graph canvas {}: released", id);
}

fn viewport_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Request a 2d context; the accelerated variant asks the browser for a
/// low-latency, opaque surface.
fn acquire_context(canvas: &HtmlCanvasElement, kind: RendererKind) -> Option<CanvasRenderingContext2d> {
	let options = js_sys::Object::new();
	if kind == RendererKind::Webgl {
		let _ = js_sys::Reflect::set(&options, &"desynchronized".into(), &JsValue::TRUE);
		let _ = js_sys::Reflect::set(&options, &"alpha".into(), &JsValue::FALSE);
	}
	canvas
		.get_context_with_context_options("2d", &options)
		.ok()
		.flatten()?
		.dyn_into()
		.ok()
}

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Renders an interactive force-directed graph on a canvas element.
///
/// The graph is rebuilt whenever `input` changes; a rejected payload keeps
/// the previous graph on screen and is reported through `on_error`. The
/// drawing backend is chosen from the first payload's config and stays fixed
/// for the lifetime of the component. `suggestions` highlights a set of
/// nodes independently of hover and selection; `on_select` fires whenever
/// the selected node changes. `theme` defaults to [`Theme::light`].
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] input: Signal<GraphInput>,
	#[prop(default = None)] suggestions: Option<Signal<Option<HashSet<String>>>>,
	#[prop(default = None)] on_select: Option<Callback<Option<String>>>,
	#[prop(default = None)] on_error: Option<Callback<GraphError>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(default = None)] theme: Option<Theme>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

	let mount_id = NEXT_MOUNT.fetch_add(1, Ordering::Relaxed);
	MOUNTED.with_borrow_mut(|m| {
		m.insert(
			mount_id,
			Mounted {
				context: context.clone(),
				animate: animate.clone(),
				resize: resize_cb.clone(),
				frame: frame_id.clone(),
			},
		)
	});
	on_cleanup(move || release(mount_id));

	let report = move |err: GraphError| {
		warn!("graph canvas: {}", err);
		if let Some(cb) = on_error {
			cb.run(err);
		}
	};

	let (context_init, animate_init, resize_cb_init, frame_init) = (
		context.clone(),
		animate.clone(),
		resize_cb.clone(),
		frame_id.clone(),
	);
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if context_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			viewport_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let initial = input.get_untracked();
		let Some(ctx) = acquire_context(&canvas, initial.config.renderer) else {
			warn!("graph canvas: no 2d context available");
			return;
		};

		let mut graph = GraphContext {
			engine: GraphEngine::new(),
			loaded: None,
			scene: Scene::default(),
			index: SceneIndex::new(),
			camera: Camera::new(w, h, CameraSettings::default()),
			pointer: PointerTracker::new(),
			scale: ScaleConfig::default(),
			theme: theme.clone().unwrap_or_default(),
			ctx,
			width: w,
			height: h,
		};
		if let Some(suggestions) = suggestions {
			graph.engine.set_suggestions(suggestions.get_untracked());
		}
		let loaded = graph.load(&initial);
		*context_init.borrow_mut() = Some(graph);
		info!("graph canvas {}: mounted at {}x{}", mount_id, w, h);
		if let Err(err) = loaded {
			report(err);
		}

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(viewport_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner, frame_inner) =
			(context_init.clone(), animate_init.clone(), frame_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.frame();
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let next = web_sys::window()
					.and_then(|w| w.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
				frame_inner.set(next);
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			frame_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	let context_in = context.clone();
	Effect::new(move |_| {
		let next = input.get();
		let result = match *context_in.borrow_mut() {
			Some(ref mut c) => c.load(&next),
			None => Ok(()),
		};
		if let Err(err) = result {
			report(err);
		}
	});

	if let Some(suggestions) = suggestions {
		let context_sg = context.clone();
		Effect::new(move |_| {
			let next = suggestions.get();
			if let Some(ref mut c) = *context_sg.borrow_mut() {
				if let Some(options) = c.engine.set_suggestions(next).refresh {
					c.index.refresh(options);
				}
			}
		});
	}

	// Runs `f` against the mounted context and reports a selection change
	// to the host once the context is no longer borrowed.
	let with_context = {
		let context = context.clone();
		move |f: &mut dyn FnMut(&mut GraphContext)| {
			let changed = {
				let mut guard = context.borrow_mut();
				let Some(c) = guard.as_mut() else {
					return;
				};
				let before = c.engine.selected_node().map(str::to_string);
				f(c);
				let after = c.engine.selected_node().map(str::to_string);
				(before != after).then_some(after)
			};
			if let (Some(selection), Some(cb)) = (changed, on_select) {
				cb.run(selection);
			}
		}
	};

	let with_md = with_context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		with_md(&mut |c: &mut GraphContext| {
			let hit = c.hit(x, y);
			let events = c.pointer.down(ev.button(), x, y, hit.as_deref());
			c.dispatch(events);
		});
	};

	let with_mm = with_context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		with_mm(&mut |c: &mut GraphContext| {
			let hit = c.hit(x, y);
			let graph = c.camera.viewport_to_graph(x, y);
			let movement = c.pointer.move_to(x, y, graph, hit.as_deref());
			if c.dispatch(movement.events) {
				ev.prevent_default();
				ev.stop_propagation();
			} else if let Some((dx, dy)) = movement.pan {
				c.camera.pan_by(dx, dy);
				c.index.refresh(RefreshOptions::ATTRIBUTES);
			}
		});
	};

	let with_mu = with_context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		with_mu(&mut |c: &mut GraphContext| {
			let hit = c.hit(x, y);
			let events = c.pointer.up(ev.button(), x, y, hit.as_deref());
			c.dispatch(events);
		});
	};

	let with_ml = with_context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		with_ml(&mut |c: &mut GraphContext| {
			let events = c.pointer.leave();
			c.dispatch(events);
		});
	};

	let with_wh = with_context;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		with_wh(&mut |c: &mut GraphContext| {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			c.camera.zoom_at(x, y, factor);
			c.index.refresh(RefreshOptions::ATTRIBUTES);
		});
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
