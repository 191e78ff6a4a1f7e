//! Starts, stops and talks to the background layout worker.

use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, info, warn};

use super::{LayoutCommand, LayoutSeed, LayoutSettings, LayoutWorker, PositionBatch};
use crate::graph::GraphStore;

/// Batches the worker may queue before it starts dropping stale ones.
const QUEUE_DEPTH: usize = 4;

#[cfg(not(target_arch = "wasm32"))]
struct Scheduled {
	running: std::sync::Arc<std::sync::atomic::AtomicBool>,
	handle: std::thread::JoinHandle<()>,
}

#[cfg(target_arch = "wasm32")]
struct Scheduled {
	interval: i32,
	_tick: wasm_bindgen::closure::Closure<dyn FnMut()>,
}

/// Owns the layout worker's schedule and both ends of its queues.
///
/// Positions are never written by the worker itself: call [`drain`](Self::drain)
/// from the UI thread and commit each batch with
/// [`GraphStore::apply_positions`].
pub struct LayoutSupervisor {
	settings: LayoutSettings,
	commands: Option<Sender<LayoutCommand>>,
	positions: Option<Receiver<PositionBatch>>,
	scheduled: Option<Scheduled>,
	/// Commands sent to the current worker.
	sent: u64,
	/// Batches computed before the worker saw this many commands are stale.
	barrier: u64,
}

impl LayoutSupervisor {
	/// Idle supervisor; nothing runs until [`start`](Self::start).
	pub fn new(settings: LayoutSettings) -> Self {
		Self {
			settings,
			commands: None,
			positions: None,
			scheduled: None,
			sent: 0,
			barrier: 0,
		}
	}

	/// Settings for the next start.
	pub fn settings(&self) -> &LayoutSettings {
		&self.settings
	}

	/// Replace the settings used by the next [`start`](Self::start).
	pub fn set_settings(&mut self, settings: LayoutSettings) {
		self.settings = settings;
	}

	/// Start simulating `store`. A running worker is stopped first.
	pub fn start(&mut self, store: &GraphStore) {
		self.stop();

		let (cmd_tx, cmd_rx) = mpsc::channel();
		let (pos_tx, pos_rx) = mpsc::sync_channel(QUEUE_DEPTH);
		let seed = LayoutSeed::from_store(store);
		let node_count = seed.nodes.len();

		self.scheduled = self.schedule(seed, cmd_rx, pos_tx);
		self.sent = 0;
		self.barrier = 0;
		if self.scheduled.is_some() {
			self.commands = Some(cmd_tx);
			self.positions = Some(pos_rx);
			info!("layout: started for {} nodes", node_count);
		}
	}

	/// Stop the worker. Safe to call any number of times.
	pub fn stop(&mut self) {
		self.commands = None;
		self.positions = None;
		let Some(scheduled) = self.scheduled.take() else {
			return;
		};
		self.unschedule(scheduled);
		info!("layout: stopped");
	}

	/// Whether a worker is scheduled.
	pub fn is_running(&self) -> bool {
		self.scheduled.is_some()
	}

	/// Forward a drag command. Dropped silently when nothing is running.
	///
	/// Pinning or releasing a node invalidates every batch the worker
	/// computed before it received the command.
	pub fn send(&mut self, command: LayoutCommand) {
		let Some(tx) = &self.commands else {
			return;
		};
		let fences = !matches!(command, LayoutCommand::Move { .. });
		if tx.send(command).is_ok() {
			self.sent += 1;
			if fences {
				self.barrier = self.sent;
			}
		}
	}

	/// Every current batch posted since the last call, oldest first. Stale
	/// batches are discarded.
	pub fn drain(&self) -> Vec<PositionBatch> {
		let Some(rx) = &self.positions else {
			return Vec::new();
		};
		let (current, stale): (Vec<_>, Vec<_>) =
			rx.try_iter().partition(|batch| batch.commands >= self.barrier);
		if !stale.is_empty() {
			debug!("layout: discarded {} stale batches", stale.len());
		}
		current
	}

	#[cfg(not(target_arch = "wasm32"))]
	fn schedule(
		&self,
		seed: LayoutSeed,
		commands: Receiver<LayoutCommand>,
		output: mpsc::SyncSender<PositionBatch>,
	) -> Option<Scheduled> {
		use std::sync::Arc;
		use std::sync::atomic::{AtomicBool, Ordering};
		use std::time::Duration;

		let settings = self.settings.clone();
		let tick = Duration::from_millis(settings.tick_ms.into());
		let running = Arc::new(AtomicBool::new(true));
		let flag = running.clone();

		let spawned = std::thread::Builder::new()
			.name("layout-worker".into())
			.spawn(move || {
				let mut worker = LayoutWorker::new(seed, settings, commands, output);
				while flag.load(Ordering::Acquire) {
					if !worker.step() {
						break;
					}
					std::thread::sleep(tick);
				}
			});

		match spawned {
			Ok(handle) => Some(Scheduled { running, handle }),
			Err(err) => {
				warn!("layout: failed to spawn worker thread: {}", err);
				None
			}
		}
	}

	#[cfg(not(target_arch = "wasm32"))]
	fn unschedule(&self, scheduled: Scheduled) {
		scheduled
			.running
			.store(false, std::sync::atomic::Ordering::Release);
		if scheduled.handle.join().is_err() {
			warn!("layout: worker thread panicked");
		}
	}

	#[cfg(target_arch = "wasm32")]
	fn schedule(
		&self,
		seed: LayoutSeed,
		commands: Receiver<LayoutCommand>,
		output: mpsc::SyncSender<PositionBatch>,
	) -> Option<Scheduled> {
		use wasm_bindgen::JsCast;
		use wasm_bindgen::closure::Closure;

		let window = web_sys::window()?;
		let mut worker = LayoutWorker::new(seed, self.settings.clone(), commands, output);
		let tick = Closure::<dyn FnMut()>::new(move || {
			worker.step();
		});

		match window.set_interval_with_callback_and_timeout_and_arguments_0(
			tick.as_ref().unchecked_ref(),
			self.settings.tick_ms as i32,
		) {
			Ok(interval) => Some(Scheduled {
				interval,
				_tick: tick,
			}),
			Err(err) => {
				warn!("layout: failed to schedule worker: {:?}", err);
				None
			}
		}
	}

	#[cfg(target_arch = "wasm32")]
	fn unschedule(&self, scheduled: Scheduled) {
		if let Some(window) = web_sys::window() {
			window.clear_interval_with_handle(scheduled.interval);
		}
	}
}

impl Drop for LayoutSupervisor {
	fn drop(&mut self) {
		self.stop();
	}
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
	use std::time::{Duration, Instant};

	use super::*;
	use crate::graph::{Edge, Node, NodeAttribute};

	fn store() -> GraphStore {
		let mut store = GraphStore::new();
		store.add_node(Node::new("a", -5.0, 0.0)).unwrap();
		store.add_node(Node::new("b", 5.0, 0.0)).unwrap();
		store.add_node(Node::new("c", 0.0, 30.0)).unwrap();
		store.add_edge(Edge::new("ab", "a", "b")).unwrap();
		store
	}

	fn wait_for_batches(supervisor: &LayoutSupervisor) -> Vec<PositionBatch> {
		let deadline = Instant::now() + Duration::from_secs(5);
		loop {
			let batches = supervisor.drain();
			if !batches.is_empty() || Instant::now() > deadline {
				return batches;
			}
			std::thread::sleep(Duration::from_millis(5));
		}
	}

	#[test]
	fn stop_is_idempotent() {
		let mut supervisor = LayoutSupervisor::new(LayoutSettings::default());
		supervisor.stop();
		assert!(!supervisor.is_running());

		supervisor.start(&store());
		assert!(supervisor.is_running());
		supervisor.stop();
		supervisor.stop();
		assert!(!supervisor.is_running());
		assert!(supervisor.drain().is_empty());
	}

	#[test]
	fn running_worker_posts_positions() {
		let mut store = store();
		let mut supervisor = LayoutSupervisor::new(LayoutSettings {
			tick_ms: 1,
			..LayoutSettings::default()
		});
		supervisor.start(&store);

		let batches = wait_for_batches(&supervisor);
		supervisor.stop();

		assert!(!batches.is_empty());
		let written: usize = batches.iter().map(|b| store.apply_positions(b)).sum();
		assert!(written > 0);
	}

	#[test]
	fn fixed_node_is_never_written_by_the_simulation() {
		let mut store = store();
		store
			.set_node_attribute("a", NodeAttribute::Highlighted(true))
			.unwrap();

		let mut supervisor = LayoutSupervisor::new(LayoutSettings {
			tick_ms: 1,
			..LayoutSettings::default()
		});
		supervisor.start(&store);
		let batches = wait_for_batches(&supervisor);
		supervisor.stop();

		for batch in &batches {
			assert!(batch.positions.iter().all(|(id, _, _)| id != "a"));
			store.apply_positions(batch);
		}
		let a = store.node("a").unwrap();
		assert_eq!((a.x, a.y), (-5.0, 0.0));
	}

	#[test]
	fn batches_queued_before_a_pin_are_discarded() {
		let mut supervisor = LayoutSupervisor::new(LayoutSettings {
			tick_ms: 1,
			..LayoutSettings::default()
		});
		supervisor.start(&store());
		// Let the queue fill with batches that still move "a".
		std::thread::sleep(Duration::from_millis(50));

		supervisor.send(LayoutCommand::Pin {
			id: "a".into(),
			x: 10.0,
			y: 10.0,
		});
		for batch in supervisor.drain() {
			assert!(batch.commands >= 1);
			assert!(batch.positions.iter().all(|(id, _, _)| id != "a"));
		}

		supervisor.send(LayoutCommand::Release { id: "a".into() });
		let batches = wait_for_batches(&supervisor);
		supervisor.stop();

		assert!(!batches.is_empty());
		assert!(batches.iter().all(|b| b.commands >= 2));
	}

	#[test]
	fn restart_replaces_the_queue() {
		let mut supervisor = LayoutSupervisor::new(LayoutSettings {
			tick_ms: 1,
			..LayoutSettings::default()
		});
		supervisor.start(&store());
		supervisor.start(&GraphStore::new());
		assert!(supervisor.is_running());

		let batches = wait_for_batches(&supervisor);
		supervisor.stop();
		assert!(batches.iter().all(|b| b.positions.is_empty()));
	}
}
