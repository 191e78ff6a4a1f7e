//! Force-directed graph visualization component.
//!
//! Renders a [`GraphEngine`](crate::engine::GraphEngine) session on an HTML
//! canvas with:
//! - Layout driven by the background simulator
//! - Pan, zoom, and node dragging interactions
//! - Hover, selection and suggestion styling
//! - Configurable theming and visual scaling
//!
//! # Example
//!
//! ```ignore
//! use sigil_graph::{EdgeInput, ForceGraphCanvas, GraphInput, NodeInput};
//!
//! let input = GraphInput {
//!     nodes: vec![NodeInput::new("a"), NodeInput::new("b")],
//!     edges: vec![EdgeInput::new("ab", "a", "b")],
//!     ..Default::default()
//! };
//!
//! view! { <ForceGraphCanvas input=input fullscreen=true /> }
//! ```

pub mod camera;
mod component;
pub mod index;
pub mod pointer;
mod render;
pub mod scale;
pub mod theme;

pub use camera::{Bounds, Camera, CameraSettings};
pub use component::ForceGraphCanvas;
pub use index::SceneIndex;
pub use pointer::{Movement, PointerTracker};
pub use scale::{ScaleConfig, ScaledValues};
pub use theme::{Color, Theme};
