//! The canvas controller.
//!
//! [`FlowCanvas`] glues the pieces together: it reconciles the host's
//! element collection, receives node intents and raw pointer events, runs the
//! interaction state machine, owns selection and scale, and reports what
//! happened through [`CanvasEvent`]s.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use slint::{LogicalPosition, VecModel};
//! use slint_flow_canvas::{CanvasConfig, CanvasElement, CanvasEvent, FlowCanvas, FlowNode, NodeKind};
//!
//! let elements = Rc::new(VecModel::from(vec![
//!     CanvasElement::from(FlowNode::new("start", NodeKind::Default).with_label("Start")),
//!     CanvasElement::from(FlowNode::new("check", NodeKind::Condition).with_position(200.0, 0.0)),
//! ]));
//! let canvas = FlowCanvas::new(elements.clone(), CanvasConfig::default());
//!
//! canvas.on_event({
//!     let elements = elements.clone();
//!     let canvas = canvas.clone();
//!     move |event| {
//!         if let CanvasEvent::DeleteRequested { id } = event {
//!             slint_flow_canvas::remove_element(&elements, id);
//!             canvas.sync();
//!         }
//!     }
//! });
//!
//! // Wire these to the UI's pointer callbacks
//! canvas.pointer_down(LogicalPosition::new(110.0, 15.0));
//! canvas.pointer_move(LogicalPosition::new(205.0, 20.0));
//! canvas.pointer_up(LogicalPosition::new(205.0, 20.0));
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slint::platform::Key;
use slint::{LogicalPosition, LogicalSize, SharedString, VecModel};

use crate::config::CanvasConfig;
use crate::connector::{duplicate_connector_exists, next_connector_id, ConnectorHandle, ConnectorKey, FlowConnector};
use crate::element::{contains_id, CanvasElement};
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::NodeKind;
use crate::hit_test::{bounding_box, find_connector_at, find_node_at, find_pointer_target, PointerHit};
use crate::interaction::InteractionState;
use crate::node::{IntentSink, NodeHandle, NodeIntent};
use crate::reconcile::{ReconcileReport, TrackedElements};
use crate::render::{compose_frame, connector_curves, paint_order, replay, DrawCommand, DrawingContext};
use crate::selection::Selection;

/// Notifications a canvas delivers to its host.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Selection was committed. `None` means it was cleared.
    ElementSelected { id: Option<SharedString> },
    /// A node finished moving.
    ValueChanged { id: SharedString, left: f32, top: f32 },
    /// A connector was created and appended to the element collection.
    ConnectorCreated { connector: FlowConnector },
    ElementDoubleClicked { id: SharedString },
    /// The selected element should be removed. The host owns the collection,
    /// so it performs the removal and then calls [`FlowCanvas::sync`].
    DeleteRequested { id: SharedString },
}

type Listener = Rc<dyn Fn(&CanvasEvent)>;

struct CanvasInner {
    elements: Rc<VecModel<CanvasElement>>,
    config: CanvasConfig,
    tracked: TrackedElements,
    state: InteractionState,
    selection: Selection,
    scale: f32,
    sink: IntentSink,
    pending: Vec<CanvasEvent>,
}

struct CanvasShared {
    inner: RefCell<CanvasInner>,
    listeners: RefCell<Vec<Listener>>,
}

impl Drop for CanvasShared {
    fn drop(&mut self) {
        self.inner.get_mut().tracked.clear();
    }
}

/// Where a raw pointer event landed.
enum Target {
    Slot(NodeHandle, usize),
    Body(NodeHandle),
    Background,
}

/// Interactive node-link canvas over a host-owned element collection.
///
/// Clone this handle to share it across UI callbacks.
#[derive(Clone)]
pub struct FlowCanvas {
    shared: Rc<CanvasShared>,
}

impl FlowCanvas {
    /// Create a canvas over `elements` and track its current content.
    pub fn new(elements: Rc<VecModel<CanvasElement>>, config: CanvasConfig) -> Self {
        let shared = Rc::new_cyclic(|weak: &Weak<CanvasShared>| {
            let weak = weak.clone();
            let sink: IntentSink = Rc::new(move |intent: NodeIntent| {
                if let Some(shared) = weak.upgrade() {
                    FlowCanvas { shared }.handle_intent(intent);
                }
            });
            CanvasShared {
                inner: RefCell::new(CanvasInner {
                    elements,
                    config,
                    tracked: TrackedElements::new(),
                    state: InteractionState::Idle,
                    selection: Selection::new(),
                    scale: 1.0,
                    sink,
                    pending: Vec::new(),
                }),
                listeners: RefCell::new(Vec::new()),
            }
        });
        let canvas = Self { shared };
        canvas.sync();
        canvas
    }

    /// Register a listener for [`CanvasEvent`]s.
    pub fn on_event(&self, listener: impl Fn(&CanvasEvent) + 'static) {
        self.shared.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Run `f` on the inner state, then deliver whatever events it queued.
    fn update<R>(&self, f: impl FnOnce(&mut CanvasInner) -> R) -> R {
        let (result, events) = {
            let mut inner = self.shared.inner.borrow_mut();
            let result = f(&mut inner);
            (result, std::mem::take(&mut inner.pending))
        };
        self.dispatch(events);
        result
    }

    fn dispatch(&self, events: Vec<CanvasEvent>) {
        if events.is_empty() {
            return;
        }
        let listeners: Vec<Listener> = self.shared.listeners.borrow().clone();
        for event in &events {
            for listener in &listeners {
                listener(event);
            }
        }
    }

    // === Reconciliation ===

    /// Reconcile with the element collection after its membership changed.
    pub fn sync(&self) -> ReconcileReport {
        self.update(|inner| inner.sync())
    }

    // === Node attributes ===

    /// Change the kind of node `id` and reconcile straight away.
    ///
    /// Connectors on slots the new kind lacks stop being tracked, and a
    /// connector being drawn from such a slot is abandoned.
    pub fn set_node_kind(&self, id: &str, kind: NodeKind) -> CanvasResult<ReconcileReport> {
        self.update(|inner| {
            let node = inner.tracked_node(id)?;
            node.borrow_mut().set_kind(kind);
            if let Some((source, slot)) = inner.state.drawing_source() {
                if source.as_str() == id && slot >= kind.slot_count() {
                    inner.state.abandon();
                }
            }
            Ok(inner.sync())
        })
    }

    // === Node intents ===

    /// Interpret a node intent. Rejected intents are logged and ignored.
    ///
    /// Tracked nodes deliver their intents here on their own; hosts only call
    /// this directly when they route gestures themselves.
    pub fn handle_intent(&self, intent: NodeIntent) {
        self.update(|inner| {
            if let Err(err) = inner.handle_intent(intent) {
                log::debug!("intent ignored: {}", err);
            }
        })
    }

    // === Raw pointer events (viewport coordinates) ===

    fn target_at(&self, position: LogicalPosition) -> Target {
        let inner = self.shared.inner.borrow();
        let point = inner.to_canvas(position);
        let order = paint_order(&inner.tracked, &inner.state, &inner.selection);
        let (id, slot) = match find_pointer_target(point, &order, inner.config.slot_marker_size) {
            Some(PointerHit::Slot(hit)) => (hit.node, Some(hit.slot)),
            Some(PointerHit::Body(id)) => (id, None),
            None => return Target::Background,
        };
        match (inner.tracked.node(&id).cloned(), slot) {
            (Some(node), Some(slot)) => Target::Slot(node, slot),
            (Some(node), None) => Target::Body(node),
            (None, _) => Target::Background,
        }
    }

    /// Pointer pressed. A press on a slot marker never counts as a body press.
    pub fn pointer_down(&self, position: LogicalPosition) {
        match self.target_at(position) {
            Target::Slot(node, slot) => {
                if !node.borrow().press_slot(slot, position) {
                    log::debug!("press on slot {} of {} ignored", slot, node.borrow().id());
                }
            }
            Target::Body(node) => {
                node.borrow().press_body(position);
            }
            Target::Background => {}
        }
    }

    pub fn pointer_move(&self, position: LogicalPosition) {
        self.update(|inner| {
            let scale = inner.scale;
            inner.state.pointer_moved(position, scale);
        })
    }

    /// Pointer released. A release on a slot marker is consumed by the slot,
    /// so a connector gesture survives a release on the wrong kind of slot.
    /// During a drag a slot marker counts as its node's body.
    pub fn pointer_up(&self, position: LogicalPosition) {
        match self.target_at(position) {
            Target::Slot(node, slot) if !self.is_dragging() => {
                if !node.borrow().release_slot(slot, position) {
                    log::debug!("release on slot {} of {} ignored", slot, node.borrow().id());
                }
                return;
            }
            Target::Slot(node, _) | Target::Body(node) => {
                node.borrow().release_body(position);
            }
            Target::Background => {}
        }
        self.update(|inner| {
            inner.state.abandon();
        })
    }

    /// Click: select the node under the pointer (first in tracked order), else
    /// the connector under it, else clear the selection.
    pub fn click(&self, position: LogicalPosition) {
        self.update(|inner| {
            let id = inner.element_at(position);
            inner.selection.set(id.clone());
            log::debug!("click selects {:?}", id);
            inner.pending.push(CanvasEvent::ElementSelected { id });
        })
    }

    pub fn double_click(&self, position: LogicalPosition) {
        self.update(|inner| {
            if let Some(id) = inner.element_at(position) {
                inner.pending.push(CanvasEvent::ElementDoubleClicked { id });
            }
        })
    }

    // === Keyboard and deletion ===

    /// Key released. Delete and Backspace request deletion of the selection.
    ///
    /// `text` is the key's text as Slint reports it; the key names
    /// `"Delete"` and `"Backspace"` are accepted too.
    pub fn key_released(&self, text: &str) -> bool {
        let is_delete = text == SharedString::from(Key::Delete).as_str()
            || text == SharedString::from(Key::Backspace).as_str()
            || text == "Delete"
            || text == "Backspace";
        is_delete && self.request_delete()
    }

    /// Ask the host to delete the selected element. Returns whether a
    /// [`CanvasEvent::DeleteRequested`] was emitted.
    pub fn request_delete(&self) -> bool {
        self.update(|inner| match inner.delete_target() {
            Ok(id) => {
                log::debug!("delete requested: {}", id);
                inner.pending.push(CanvasEvent::DeleteRequested { id });
                true
            }
            Err(err) => {
                log::debug!("delete ignored: {}", err);
                false
            }
        })
    }

    pub fn set_delete_allowed(&self, allowed: bool) {
        self.shared.inner.borrow_mut().config.delete_allowed = allowed;
    }

    pub fn delete_allowed(&self) -> bool {
        self.shared.inner.borrow().config.delete_allowed
    }

    // === Selection ===

    pub fn selected_id(&self) -> Option<SharedString> {
        self.shared.inner.borrow().selection.get().cloned()
    }

    /// Select `id` programmatically and report it. Unknown ids are ignored.
    pub fn select(&self, id: &str) -> bool {
        self.update(|inner| {
            if !inner.tracked.contains(id) {
                log::debug!("select ignored: '{}' is not tracked", id);
                return false;
            }
            inner.selection.select(id);
            inner.pending.push(CanvasEvent::ElementSelected { id: Some(id.into()) });
            true
        })
    }

    pub fn clear_selection(&self) {
        self.update(|inner| {
            if inner.selection.clear() {
                inner.pending.push(CanvasEvent::ElementSelected { id: None });
            }
        })
    }

    // === Zoom ===

    pub fn scale(&self) -> f32 {
        self.shared.inner.borrow().scale
    }

    /// Set the scale, clamped to the configured range. Returns the applied value.
    pub fn set_scale(&self, scale: f32) -> f32 {
        let mut inner = self.shared.inner.borrow_mut();
        inner.scale = inner.config.clamp_scale(scale);
        log::debug!("scale set to {}", inner.scale);
        inner.scale
    }

    pub fn zoom_in(&self) -> f32 {
        let (scale, step) = self.zoom_params();
        self.set_scale(scale + step)
    }

    pub fn zoom_out(&self) -> f32 {
        let (scale, step) = self.zoom_params();
        self.set_scale(scale - step)
    }

    fn zoom_params(&self) -> (f32, f32) {
        let inner = self.shared.inner.borrow();
        (inner.scale, inner.config.scale_step)
    }

    pub fn reset_zoom(&self) -> f32 {
        self.set_scale(1.0)
    }

    /// Map a zoom slider value (1..=20) to a scale of `value / 10`.
    pub fn set_scale_from_slider(&self, value: f32) -> f32 {
        self.set_scale(value / 10.0)
    }

    pub fn slider_value(&self) -> f32 {
        self.scale() * 10.0
    }

    /// Bounding box of all tracked nodes as `(left, top, right, bottom)`.
    pub fn working_bounds(&self) -> Option<(f32, f32, f32, f32)> {
        bounding_box(self.shared.inner.borrow().tracked.nodes())
    }

    /// Scale so every node fits in `viewport` and return the scroll offset,
    /// in viewport coordinates, that brings them into view.
    pub fn zoom_to_fit(&self, viewport: LogicalSize) -> Option<LogicalPosition> {
        let (left, top, right, bottom) = self.working_bounds()?;
        let (margin, padding) = {
            let inner = self.shared.inner.borrow();
            (inner.config.fit_margin, inner.config.fit_padding)
        };
        let left = (left - margin).max(0.0);
        let top = (top - margin).max(0.0);
        let right = right + padding;
        let bottom = bottom + padding;

        let ratio_w = viewport.width / (right - left);
        let ratio_h = viewport.height / (bottom - top);
        let scale = self.set_scale(ratio_w.min(ratio_h));
        Some(LogicalPosition::new(left * scale, top * scale))
    }

    // === State queries ===

    pub fn is_idle(&self) -> bool {
        self.shared.inner.borrow().state.is_idle()
    }

    pub fn is_dragging(&self) -> bool {
        self.shared.inner.borrow().state.is_dragging()
    }

    pub fn is_drawing_connector(&self) -> bool {
        self.shared.inner.borrow().state.is_drawing()
    }

    pub fn dragged_node_id(&self) -> Option<SharedString> {
        self.shared.inner.borrow().state.dragged_node_id()
    }

    pub fn drawing_source(&self) -> Option<(SharedString, usize)> {
        self.shared.inner.borrow().state.drawing_source()
    }

    /// Free end of the connector being drawn, in canvas coordinates.
    pub fn floating_endpoint(&self) -> Option<LogicalPosition> {
        self.shared.inner.borrow().state.floating_endpoint()
    }

    pub fn tracked_nodes(&self) -> Vec<NodeHandle> {
        self.shared.inner.borrow().tracked.nodes().to_vec()
    }

    pub fn tracked_connectors(&self) -> Vec<ConnectorHandle> {
        self.shared.inner.borrow().tracked.connectors().to_vec()
    }

    pub fn node(&self, id: &str) -> Option<NodeHandle> {
        self.shared.inner.borrow().tracked.node(id).cloned()
    }

    pub fn connector(&self, id: &str) -> Option<ConnectorHandle> {
        self.shared.inner.borrow().tracked.connector(id).cloned()
    }

    pub fn elements(&self) -> Rc<VecModel<CanvasElement>> {
        self.shared.inner.borrow().elements.clone()
    }

    pub fn config(&self) -> CanvasConfig {
        self.shared.inner.borrow().config.clone()
    }

    /// Whether any tracked node changed visibly since the last call. Clears
    /// the nodes' dirty flags.
    pub fn take_dirty(&self) -> bool {
        let inner = self.shared.inner.borrow();
        inner
            .tracked
            .nodes()
            .iter()
            .fold(false, |dirty, node| node.borrow_mut().take_dirty() || dirty)
    }

    // === Rendering ===

    /// The current frame as ordered draw commands.
    ///
    /// # Panics
    ///
    /// Panics if a tracked connector's endpoint does not resolve, which
    /// reconciliation rules out.
    pub fn frame(&self) -> Vec<DrawCommand> {
        let inner = self.shared.inner.borrow();
        compose_frame(&inner.tracked, &inner.state, &inner.selection, &inner.config, inner.scale)
    }

    /// Replay the current frame into `ctx`.
    pub fn render<C: DrawingContext + ?Sized>(&self, ctx: &mut C) {
        replay(&self.frame(), ctx);
    }

    // === Auto-arrange ===

    /// Compute a layered layout of the tracked nodes.
    ///
    /// Nothing moves: the host applies the positions it wants through
    /// [`FlowNode::set_position`](crate::FlowNode::set_position), like any
    /// other attribute write.
    #[cfg(feature = "layout")]
    pub fn suggest_layout(&self, config: &crate::layout::LayoutConfig) -> Vec<crate::layout::NodePosition> {
        let inner = self.shared.inner.borrow();
        let positions = crate::layout::layout_tracked(&inner.tracked, config);
        log::debug!("layout computed for {} nodes", positions.len());
        positions
    }
}

impl CanvasInner {
    fn to_canvas(&self, position: LogicalPosition) -> LogicalPosition {
        LogicalPosition::new(position.x / self.scale, position.y / self.scale)
    }

    fn sync(&mut self) -> ReconcileReport {
        let report = self.tracked.reconcile(&*self.elements, &self.sink);
        for id in &report.nodes_removed {
            if self.state.forget_node(id) {
                log::debug!("gesture abandoned: node {} was removed", id);
            }
        }
        let tracked = &self.tracked;
        if self.selection.retain(|id| tracked.contains(id)) {
            self.pending.push(CanvasEvent::ElementSelected { id: None });
        }
        report
    }

    fn tracked_node(&self, id: &str) -> CanvasResult<NodeHandle> {
        self.tracked
            .node(id)
            .cloned()
            .ok_or_else(|| CanvasError::UnknownNode(id.into()))
    }

    fn handle_intent(&mut self, intent: NodeIntent) -> CanvasResult<()> {
        match intent {
            NodeIntent::BodyPressed { node, position } => {
                let handle = self.tracked_node(&node)?;
                self.state.press_body(handle, position)?;
                // Instant feedback; committed on release
                self.selection.select(node);
            }
            NodeIntent::BodyReleased { node, .. } => {
                if let Some(end) = self.state.release_body(&node)? {
                    self.selection.select(end.id.clone());
                    self.pending.push(CanvasEvent::ElementSelected { id: Some(end.id.clone()) });
                    self.pending.push(CanvasEvent::ValueChanged {
                        id: end.id,
                        left: end.left,
                        top: end.top,
                    });
                }
            }
            NodeIntent::SlotPressed { node, slot, .. } => {
                let handle = self.tracked_node(&node)?;
                self.state.press_slot(handle, slot)?;
            }
            NodeIntent::SlotReleased { node, slot, .. } => {
                let target = self.tracked_node(&node)?;
                let tracked = &self.tracked;
                let elements = &self.elements;
                let key = self.state.release_slot(&target, slot, |key| {
                    duplicate_connector_exists(key, tracked.connectors()) || collection_has_connector(elements, key)
                })?;
                self.create_connector(key)?;
            }
        }
        Ok(())
    }

    fn create_connector(&mut self, key: ConnectorKey) -> CanvasResult<()> {
        let predecessor = self.tracked_node(&key.predecessor)?;
        let successor = self.tracked_node(&key.successor)?;

        let id = next_connector_id(|candidate| self.tracked.contains(candidate) || contains_id(&*self.elements, candidate));
        let mut connector = FlowConnector::from_key(id, key);
        predecessor.borrow().on_connector_created(&mut connector);
        if !Rc::ptr_eq(&predecessor, &successor) {
            successor.borrow().on_connector_created(&mut connector);
        }

        log::debug!(
            "connector created: {} {}[{}] -> {}[{}]",
            connector.id(),
            connector.predecessor(),
            connector.predecessor_slot(),
            connector.successor(),
            connector.successor_slot()
        );
        self.elements.push(CanvasElement::from(connector.clone()));
        self.sync();
        self.pending.push(CanvasEvent::ConnectorCreated { connector });
        Ok(())
    }

    /// Element under a viewport position: nodes first, in tracked order,
    /// then connectors.
    fn element_at(&self, position: LogicalPosition) -> Option<SharedString> {
        let point = self.to_canvas(position);
        find_node_at(point, self.tracked.nodes()).or_else(|| {
            let curves = connector_curves(&self.tracked, &self.config);
            find_connector_at(
                point,
                &curves,
                self.config.curve_hit_tolerance,
                self.config.curve_hit_samples,
            )
        })
    }

    fn delete_target(&self) -> CanvasResult<SharedString> {
        if !self.config.delete_allowed {
            return Err(CanvasError::DeleteNotAllowed);
        }
        self.selection.get().cloned().ok_or(CanvasError::NothingSelected)
    }
}

fn collection_has_connector(elements: &VecModel<CanvasElement>, key: &ConnectorKey) -> bool {
    use slint::Model;
    elements
        .iter()
        .any(|element| element.as_connector().is_some_and(|c| c.borrow().connects(key)))
}
