//! Node entity.
//!
//! A [`FlowNode`] wraps one [`NodeKind`] with a mutable position, a size
//! seeded from the kind's auto-size rule, and the caption/icon attributes a
//! host edits directly. Nodes never interpret pointer gestures: they raise
//! [`NodeIntent`]s into whatever sink the canvas attached when it started
//! tracking them.

use std::cell::RefCell;
use std::rc::Rc;

use slint::{Color, LogicalPosition, LogicalSize, SharedString};

use crate::connector::FlowConnector;
use crate::geometry::{auto_height, auto_size, NodeKind, SlotRole};

/// Shared handle to a node, held by both the host collection and the canvas.
pub type NodeHandle = Rc<RefCell<FlowNode>>;

/// Receiver for the intents a node raises.
pub type IntentSink = Rc<dyn Fn(NodeIntent)>;

/// Which side of the node the icon sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconAnchor {
    #[default]
    Left,
    Right,
}

/// A gesture a node reports to its container without deciding what it means.
///
/// Positions are the raw viewport coordinates of the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeIntent {
    BodyPressed { node: SharedString, position: LogicalPosition },
    BodyReleased { node: SharedString, position: LogicalPosition },
    SlotPressed { node: SharedString, slot: usize, position: LogicalPosition },
    SlotReleased { node: SharedString, slot: usize, position: LogicalPosition },
}

impl NodeIntent {
    pub fn node_id(&self) -> &SharedString {
        match self {
            NodeIntent::BodyPressed { node, .. }
            | NodeIntent::BodyReleased { node, .. }
            | NodeIntent::SlotPressed { node, .. }
            | NodeIntent::SlotReleased { node, .. } => node,
        }
    }
}

pub struct FlowNode {
    id: SharedString,
    kind: NodeKind,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    label: SharedString,
    icon: Option<SharedString>,
    icon_anchor: IconAnchor,
    dirty: bool,
    sink: Option<IntentSink>,
}

impl std::fmt::Debug for FlowNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowNode")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("left", &self.left)
            .field("top", &self.top)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("label", &self.label)
            .field("listening", &self.sink.is_some())
            .finish()
    }
}

impl FlowNode {
    /// Create a node at the origin with an empty label, auto-sized.
    pub fn new(id: impl Into<SharedString>, kind: NodeKind) -> Self {
        let size = auto_size("", kind.slot_count());
        Self {
            id: id.into(),
            kind,
            left: 0.0,
            top: 0.0,
            width: size.width,
            height: size.height,
            label: SharedString::default(),
            icon: None,
            icon_anchor: IconAnchor::default(),
            dirty: true,
            sink: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<SharedString>) -> Self {
        self.set_label(label);
        self
    }

    pub fn with_position(mut self, left: f32, top: f32) -> Self {
        self.set_position(left, top);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<SharedString>, anchor: IconAnchor) -> Self {
        self.set_icon(Some(icon.into()));
        self.set_icon_anchor(anchor);
        self
    }

    pub fn into_handle(self) -> NodeHandle {
        Rc::new(RefCell::new(self))
    }

    // === Attributes ===

    pub fn id(&self) -> &SharedString {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn position(&self) -> LogicalPosition {
        LogicalPosition::new(self.left, self.top)
    }

    pub fn size(&self) -> LogicalSize {
        LogicalSize::new(self.width, self.height)
    }

    pub fn label(&self) -> &SharedString {
        &self.label
    }

    pub fn icon(&self) -> Option<&SharedString> {
        self.icon.as_ref()
    }

    pub fn icon_anchor(&self) -> IconAnchor {
        self.icon_anchor
    }

    pub fn slot_count(&self) -> usize {
        self.kind.slot_count()
    }

    pub fn color(&self) -> Color {
        self.kind.color()
    }

    /// Bounding box as `(left, top, width, height)`.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        (self.left, self.top, self.width, self.height)
    }

    /// Inclusive bounding-box containment in canvas coordinates.
    pub fn contains(&self, point: LogicalPosition) -> bool {
        self.left <= point.x
            && self.left + self.width >= point.x
            && self.top <= point.y
            && self.top + self.height >= point.y
    }

    // === Mutation ===

    /// Replace the label. Width and height are recomputed only when the
    /// text actually differs.
    pub fn set_label(&mut self, label: impl Into<SharedString>) {
        let label = label.into();
        if label == self.label {
            return;
        }
        self.label = label;
        let size = auto_size(&self.label, self.slot_count());
        self.width = size.width;
        self.height = size.height;
        self.dirty = true;
    }

    /// Switch to another kind. Height follows a slot-count change; width is
    /// left alone.
    ///
    /// Hosts go through [`FlowCanvas::set_node_kind`](crate::FlowCanvas::set_node_kind),
    /// which prunes connectors on slots the new kind lacks.
    pub(crate) fn set_kind(&mut self, kind: NodeKind) {
        if kind == self.kind {
            return;
        }
        let slots_changed = kind.slot_count() != self.kind.slot_count();
        self.kind = kind;
        if slots_changed {
            self.height = auto_height(&self.label, kind.slot_count());
        }
        self.dirty = true;
    }

    pub fn set_position(&mut self, left: f32, top: f32) {
        if left == self.left && top == self.top {
            return;
        }
        self.left = left;
        self.top = top;
        self.dirty = true;
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.set_position(self.left + dx, self.top + dy);
    }

    /// Override the authored size. It stays until the label or slot count
    /// changes again.
    pub fn set_size(&mut self, width: f32, height: f32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.dirty = true;
    }

    pub fn set_icon(&mut self, icon: Option<SharedString>) {
        if icon == self.icon {
            return;
        }
        self.icon = icon;
        self.dirty = true;
    }

    pub fn set_icon_anchor(&mut self, anchor: IconAnchor) {
        if anchor == self.icon_anchor {
            return;
        }
        self.icon_anchor = anchor;
        self.dirty = true;
    }

    /// Whether anything visible changed since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Read and reset the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    // === Slots ===

    pub fn slot_role(&self, index: usize) -> Option<SlotRole> {
        self.kind.slot_role(index)
    }

    pub fn is_input_slot(&self, index: usize) -> bool {
        self.kind.is_input_slot(index)
    }

    pub fn slot_local_position(&self, index: usize) -> Option<LogicalPosition> {
        self.kind.slot_local_position(index, self.width, self.height)
    }

    /// Slot position in canvas coordinates.
    pub fn global_slot_position(&self, index: usize) -> Option<LogicalPosition> {
        self.slot_local_position(index)
            .map(|local| LogicalPosition::new(local.x + self.left, local.y + self.top))
    }

    pub fn slot_exits_vertically(&self, index: usize) -> bool {
        self.kind.slot_exits_vertically(index)
    }

    /// Let the node kind pick a display color for a connector it just became
    /// an endpoint of.
    pub fn on_connector_created(&self, connector: &mut FlowConnector) {
        if connector.predecessor() != &self.id {
            return;
        }
        if let Some(color) = self.kind.connector_color(connector.predecessor_slot()) {
            connector.set_color(Some(color));
        }
    }

    // === Intents ===

    pub fn attach_listener(&mut self, sink: IntentSink) {
        self.sink = Some(sink);
    }

    pub fn detach_listener(&mut self) {
        self.sink = None;
    }

    pub fn has_listener(&self) -> bool {
        self.sink.is_some()
    }

    fn emit(&self, intent: NodeIntent) -> bool {
        match &self.sink {
            Some(sink) => {
                sink(intent);
                true
            }
            None => false,
        }
    }

    /// Report a press on the node body. Returns whether a listener received it.
    pub fn press_body(&self, position: LogicalPosition) -> bool {
        self.emit(NodeIntent::BodyPressed { node: self.id.clone(), position })
    }

    pub fn release_body(&self, position: LogicalPosition) -> bool {
        self.emit(NodeIntent::BodyReleased { node: self.id.clone(), position })
    }

    /// Report a press on slot `index`. Only output slots raise an intent.
    pub fn press_slot(&self, index: usize, position: LogicalPosition) -> bool {
        if !self.kind.is_output_slot(index) {
            return false;
        }
        self.emit(NodeIntent::SlotPressed { node: self.id.clone(), slot: index, position })
    }

    /// Report a release on slot `index`. Only input slots raise an intent.
    pub fn release_slot(&self, index: usize, position: LogicalPosition) -> bool {
        if !self.kind.is_input_slot(index) {
            return false;
        }
        self.emit(NodeIntent::SlotReleased { node: self.id.clone(), slot: index, position })
    }
}
