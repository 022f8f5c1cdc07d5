//! # Slint Flow Canvas
//!
//! The interaction core of a flow-chart canvas: nodes with typed connection
//! slots, connectors drawn between them, and the gestures that move and wire
//! them up. Drawing is left to the host; the canvas hands out ordered draw
//! commands and reports what the user did through events.
//!
//! ## Features
//!
//! - **Host-owned collection** - Nodes and connectors live in a Slint
//!   [`VecModel`](slint::VecModel); the canvas reconciles against it
//! - **Table-driven node kinds** - Slot layout, roles and shape per
//!   [`NodeKind`] come from one geometry table
//! - **Explicit gesture state machine** - Dragging and connector drawing are
//!   variants of [`InteractionState`], never loose flags
//! - **Stable endpoints** - Connectors reference nodes by id, so removing a
//!   node prunes its connectors instead of leaving them dangling
//! - **Layout suggestions** - Layered layout behind the `layout` feature
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::rc::Rc;
//! use slint::VecModel;
//! use slint_flow_canvas::{CanvasConfig, CanvasElement, FlowCanvas, FlowNode, NodeKind};
//!
//! let elements = Rc::new(VecModel::from(vec![
//!     CanvasElement::from(FlowNode::new("start", NodeKind::Default).with_label("Start")),
//! ]));
//! let canvas = FlowCanvas::new(elements, CanvasConfig::default());
//! canvas.on_event(|event| println!("{:?}", event));
//! ```
//!
//! ## Rust Helpers
//!
//! - [`generate_grid_commands`] - Generate SVG path for grid rendering
//! - [`route`] - Cubic route between two slots
//! - [`find_node_at`], [`find_slot_at`], [`find_connector_at`] - Hit-testing
//! - [`TrackedElements`] - Id-keyed mirror of the element collection

pub mod canvas;
pub mod config;
pub mod connector;
pub mod element;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod interaction;
#[cfg(feature = "layout")]
pub mod layout;
pub mod node;
pub mod reconcile;
pub mod render;
pub mod router;
pub mod selection;

pub use canvas::{CanvasEvent, FlowCanvas};
pub use config::CanvasConfig;
pub use connector::{
    duplicate_connector_exists, next_connector_id, ConnectorHandle, ConnectorKey, FlowConnector,
};
pub use element::{contains_id, find_element, remove_element, CanvasElement};
pub use error::{CanvasError, CanvasResult};
pub use geometry::{Decoration, Drawable, KindGeometry, NodeKind, Shape, SlotRole};
pub use grid::generate_grid_commands;
pub use hit_test::{
    bounding_box, find_connector_at, find_node_at, find_pointer_target, find_slot_at,
    find_topmost_node_at, ConnectorCurve, CurveGeometry, NodeBounds, PointerHit, SlotHit,
};
pub use interaction::{DragEnd, InteractionState, Preview};
#[cfg(feature = "layout")]
pub use layout::{layered_layout, layout_tracked, Direction, LayoutConfig, NodePosition};
pub use node::{FlowNode, IconAnchor, IntentSink, NodeHandle, NodeIntent};
pub use reconcile::{ReconcileReport, TrackedElements};
pub use render::{
    compose_frame, ConnectorVisual, DrawCommand, DrawingContext, NodeVisual, SlotMarker,
};
pub use router::{route, ArrowMarker, CubicCurve};
pub use selection::Selection;
