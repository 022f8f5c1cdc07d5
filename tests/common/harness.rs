//! Test harness for a canvas over a host-owned element collection.
//!
//! Mirrors what a host application does: it owns the `VecModel`, hands it to
//! a [`FlowCanvas`], and forwards pointer and key events. Helper methods
//! simulate user interactions in viewport coordinates.

#![allow(dead_code)]

use super::EventRecorder;
use slint::{LogicalPosition, LogicalSize, Model, SharedString, VecModel};
use slint_flow_canvas::{
    remove_element, CanvasConfig, CanvasElement, CanvasEvent, FlowCanvas, FlowConnector, FlowNode, NodeKind,
};
use std::rc::Rc;

pub fn node(id: &str, kind: NodeKind, left: f32, top: f32) -> CanvasElement {
    FlowNode::new(id, kind).with_label(id).with_position(left, top).into()
}

pub fn connector(id: &str, predecessor: &str, predecessor_slot: usize, successor: &str, successor_slot: usize) -> CanvasElement {
    FlowConnector::new(id, predecessor, predecessor_slot, successor, successor_slot).into()
}

pub fn p(x: f32, y: f32) -> LogicalPosition {
    LogicalPosition::new(x, y)
}

/// A canvas, its element collection, and a recorder of everything it emits.
pub struct CanvasTestHarness {
    pub canvas: FlowCanvas,
    pub elements: Rc<VecModel<CanvasElement>>,
    pub recorder: EventRecorder,
}

impl CanvasTestHarness {
    /// Two default nodes side by side, not yet connected.
    ///
    /// `n1` spans (0, 0)-(100, 30); `n2` spans (200, 0)-(300, 30).
    pub fn new() -> Self {
        Self::with_elements(vec![
            node("n1", NodeKind::Default, 0.0, 0.0),
            node("n2", NodeKind::Default, 200.0, 0.0),
        ])
    }

    pub fn with_elements(elements: Vec<CanvasElement>) -> Self {
        Self::with_config(elements, CanvasConfig::default())
    }

    pub fn with_config(elements: Vec<CanvasElement>, config: CanvasConfig) -> Self {
        let elements = Rc::new(VecModel::from(elements));
        let canvas = FlowCanvas::new(elements.clone(), config);
        let recorder = EventRecorder::attach(&canvas);
        Self { canvas, elements, recorder }
    }

    /// Act like a host that honors deletion requests.
    pub fn honor_delete_requests(&self) {
        self.canvas.on_event({
            let canvas = self.canvas.clone();
            let elements = self.elements.clone();
            move |event| {
                if let CanvasEvent::DeleteRequested { id } = event {
                    remove_element(&elements, id);
                    canvas.sync();
                }
            }
        });
    }

    // === Geometry lookups (viewport coordinates) ===

    /// Viewport point on slot `slot` of `node`.
    pub fn slot_point(&self, node: &str, slot: usize) -> LogicalPosition {
        let scale = self.canvas.scale();
        let handle = self.canvas.node(node).expect("node should be tracked");
        let pos = handle.borrow().global_slot_position(slot).expect("slot should exist");
        p(pos.x * scale, pos.y * scale)
    }

    /// Viewport point in the middle of the upper part of a node body, clear of
    /// its slots.
    pub fn body_point(&self, node: &str) -> LogicalPosition {
        let scale = self.canvas.scale();
        let handle = self.canvas.node(node).expect("node should be tracked");
        let node = handle.borrow();
        p((node.left() + node.width() / 2.0) * scale, (node.top() + 4.0) * scale)
    }

    pub fn node_position(&self, id: &str) -> (f32, f32) {
        let handle = self.canvas.node(id).expect("node should be tracked");
        let node = handle.borrow();
        (node.left(), node.top())
    }

    pub fn connector_count(&self) -> usize {
        self.canvas.tracked_connectors().len()
    }

    pub fn row_count(&self) -> usize {
        self.elements.row_count()
    }

    // === Interactions ===

    pub fn drag(&self, from: LogicalPosition, to: LogicalPosition) {
        self.canvas.pointer_down(from);
        self.canvas.pointer_move(to);
        self.canvas.pointer_up(to);
    }

    /// Draw a connector from an output slot to an input slot.
    pub fn connect(&self, from: &str, from_slot: usize, to: &str, to_slot: usize) {
        let start = self.slot_point(from, from_slot);
        let end = self.slot_point(to, to_slot);
        self.canvas.pointer_down(start);
        self.canvas.pointer_move(p((start.x + end.x) / 2.0, (start.y + end.y) / 2.0));
        self.canvas.pointer_move(end);
        self.canvas.pointer_up(end);
    }

    pub fn click_node(&self, id: &str) {
        self.canvas.click(self.body_point(id));
    }

    /// Remove an element the way a host does, then resync.
    pub fn remove(&self, id: &str) -> Option<CanvasElement> {
        let removed = remove_element(&self.elements, id);
        self.canvas.sync();
        removed
    }

    pub fn add(&self, element: CanvasElement) {
        self.elements.push(element);
        self.canvas.sync();
    }

    pub fn fit(&self, width: f32, height: f32) -> Option<LogicalPosition> {
        self.canvas.zoom_to_fit(LogicalSize::new(width, height))
    }

    pub fn tracked_node_ids(&self) -> Vec<SharedString> {
        self.canvas
            .tracked_nodes()
            .iter()
            .map(|node| node.borrow().id().clone())
            .collect()
    }

    pub fn tracked_connector_ids(&self) -> Vec<SharedString> {
        self.canvas
            .tracked_connectors()
            .iter()
            .map(|connector| connector.borrow().id().clone())
            .collect()
    }
}
