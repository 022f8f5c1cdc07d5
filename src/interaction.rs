//! Pointer-gesture state machine.
//!
//! ```text
//! Idle --body press--> DraggingNode --body release / pointer up--> Idle
//! Idle --output slot press--> DrawingConnector --input slot release--> Idle
//!                                              --pointer up--> Idle
//! ```
//!
//! The machine only moves nodes and tracks the floating endpoint. Creating
//! connectors, selection and notifications belong to the canvas, which acts
//! on the outcomes returned here.

use slint::{LogicalPosition, SharedString};

use crate::connector::ConnectorKey;
use crate::error::{CanvasError, CanvasResult};
use crate::geometry::SlotRole;
use crate::node::NodeHandle;

#[derive(Debug, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    DraggingNode {
        node: NodeHandle,
        /// Last pointer sample, viewport coordinates.
        last_pointer: LogicalPosition,
    },
    DrawingConnector {
        source: NodeHandle,
        slot: usize,
        /// Free end of the preview curve, canvas coordinates.
        floating: LogicalPosition,
    },
}

/// Result of releasing a node body while dragging.
#[derive(Debug, Clone, PartialEq)]
pub struct DragEnd {
    pub id: SharedString,
    pub left: f32,
    pub top: f32,
}

/// Geometry of the in-progress connector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preview {
    pub start: LogicalPosition,
    pub start_vertical: bool,
    pub end: LogicalPosition,
}

fn check_role(node: &NodeHandle, slot: usize, expected: SlotRole) -> CanvasResult<()> {
    let node = node.borrow();
    match node.slot_role(slot) {
        Some(role) if role == expected => Ok(()),
        Some(found) => Err(CanvasError::WrongSlotRole {
            node: node.id().clone(),
            slot,
            expected,
            found,
        }),
        None => Err(CanvasError::SlotOutOfRange {
            node: node.id().clone(),
            slot,
            count: node.slot_count(),
        }),
    }
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, InteractionState::DraggingNode { .. })
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, InteractionState::DrawingConnector { .. })
    }

    pub fn dragged_node_id(&self) -> Option<SharedString> {
        match self {
            InteractionState::DraggingNode { node, .. } => Some(node.borrow().id().clone()),
            _ => None,
        }
    }

    /// Source node id and slot of the connector being drawn.
    pub fn drawing_source(&self) -> Option<(SharedString, usize)> {
        match self {
            InteractionState::DrawingConnector { source, slot, .. } => Some((source.borrow().id().clone(), *slot)),
            _ => None,
        }
    }

    pub fn floating_endpoint(&self) -> Option<LogicalPosition> {
        match self {
            InteractionState::DrawingConnector { floating, .. } => Some(*floating),
            _ => None,
        }
    }

    /// Body press: start dragging `node`. Only an idle machine accepts it.
    pub fn press_body(&mut self, node: NodeHandle, pointer: LogicalPosition) -> CanvasResult<()> {
        self.ensure_idle()?;
        log::debug!("drag start: {}", node.borrow().id());
        *self = InteractionState::DraggingNode { node, last_pointer: pointer };
        Ok(())
    }

    /// Output-slot press: start drawing a connector from `slot` of `source`.
    ///
    /// Pressing an input slot (or a slot the node does not have) is rejected
    /// and leaves the state untouched, as is any press while a gesture is
    /// active.
    pub fn press_slot(&mut self, source: NodeHandle, slot: usize) -> CanvasResult<()> {
        self.ensure_idle()?;
        check_role(&source, slot, SlotRole::Output)?;
        let floating = {
            let node = source.borrow();
            node.global_slot_position(slot).unwrap_or_else(|| node.position())
        };
        log::debug!("connector draw start: {}[{}]", source.borrow().id(), slot);
        *self = InteractionState::DrawingConnector { source, slot, floating };
        Ok(())
    }

    fn ensure_idle(&self) -> CanvasResult<()> {
        match self {
            InteractionState::Idle => Ok(()),
            InteractionState::DraggingNode { .. } => Err(CanvasError::GestureInProgress("drag")),
            InteractionState::DrawingConnector { .. } => Err(CanvasError::GestureInProgress("connector")),
        }
    }

    /// Feed a pointer sample in viewport coordinates.
    ///
    /// While dragging, the node moves by the delta since the previous sample
    /// divided by `scale`. While drawing, the floating endpoint follows the
    /// pointer. Returns whether anything changed.
    pub fn pointer_moved(&mut self, pointer: LogicalPosition, scale: f32) -> bool {
        match self {
            InteractionState::Idle => false,
            InteractionState::DraggingNode { node, last_pointer } => {
                let dx = (pointer.x - last_pointer.x) / scale;
                let dy = (pointer.y - last_pointer.y) / scale;
                *last_pointer = pointer;
                let mut node = node.borrow_mut();
                node.translate(dx, dy);
                log::trace!("drag {} to ({}, {})", node.id(), node.left(), node.top());
                true
            }
            InteractionState::DrawingConnector { floating, .. } => {
                *floating = LogicalPosition::new(pointer.x / scale, pointer.y / scale);
                log::trace!("floating endpoint at ({}, {})", floating.x, floating.y);
                true
            }
        }
    }

    /// Body release: end a drag.
    ///
    /// Returns the final position when `node_id` is the dragged node (the
    /// drag is confirmed) and `None` when another node was released on.
    pub fn release_body(&mut self, node_id: &str) -> CanvasResult<Option<DragEnd>> {
        let node = match std::mem::take(self) {
            InteractionState::DraggingNode { node, .. } => node,
            other => {
                *self = other;
                return Err(CanvasError::NoActiveGesture("drag"));
            }
        };
        let node = node.borrow();
        log::debug!("drag end: {} released on {}", node.id(), node_id);
        if node.id().as_str() != node_id {
            return Ok(None);
        }
        Ok(Some(DragEnd {
            id: node.id().clone(),
            left: node.left(),
            top: node.top(),
        }))
    }

    /// Input-slot release: finish the connector being drawn.
    ///
    /// A release on a non-input slot is rejected with the gesture still
    /// active. A release that would duplicate an existing connector (as
    /// reported by `exists`) cancels the gesture. Otherwise the machine goes
    /// idle and returns the endpoints of the connector to create.
    pub fn release_slot<F>(&mut self, target: &NodeHandle, slot: usize, exists: F) -> CanvasResult<ConnectorKey>
    where
        F: FnOnce(&ConnectorKey) -> bool,
    {
        let InteractionState::DrawingConnector { source, slot: source_slot, .. } = self else {
            return Err(CanvasError::NoActiveGesture("connector"));
        };
        check_role(target, slot, SlotRole::Input)?;

        let key = ConnectorKey {
            predecessor: source.borrow().id().clone(),
            predecessor_slot: *source_slot,
            successor: target.borrow().id().clone(),
            successor_slot: slot,
        };
        *self = InteractionState::Idle;

        if exists(&key) {
            return Err(CanvasError::DuplicateConnector {
                predecessor: key.predecessor,
                predecessor_slot: key.predecessor_slot,
                successor: key.successor,
                successor_slot: key.successor_slot,
            });
        }
        log::debug!(
            "connector draw end: {}[{}] -> {}[{}]",
            key.predecessor,
            key.predecessor_slot,
            key.successor,
            key.successor_slot
        );
        Ok(key)
    }

    /// General pointer-up: drop whatever gesture is active. Returns whether
    /// one was.
    pub fn abandon(&mut self) -> bool {
        match std::mem::take(self) {
            InteractionState::Idle => false,
            InteractionState::DraggingNode { node, .. } => {
                log::debug!("drag abandoned: {}", node.borrow().id());
                true
            }
            InteractionState::DrawingConnector { source, .. } => {
                log::debug!("connector draw abandoned: {}", source.borrow().id());
                true
            }
        }
    }

    /// Abandon the gesture if it involves node `id`, which is going away.
    pub fn forget_node(&mut self, id: &str) -> bool {
        let involved = match self {
            InteractionState::Idle => false,
            InteractionState::DraggingNode { node, .. } => node.borrow().id().as_str() == id,
            InteractionState::DrawingConnector { source, .. } => source.borrow().id().as_str() == id,
        };
        involved && self.abandon()
    }

    /// Preview curve endpoints while drawing a connector.
    pub fn preview(&self) -> Option<Preview> {
        let InteractionState::DrawingConnector { source, slot, floating } = self else {
            return None;
        };
        let node = source.borrow();
        Some(Preview {
            start: node.global_slot_position(*slot)?,
            start_vertical: node.slot_exits_vertically(*slot),
            end: *floating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::NodeKind;
    use crate::node::FlowNode;

    fn p(x: f32, y: f32) -> LogicalPosition {
        LogicalPosition::new(x, y)
    }

    fn node(id: &str, left: f32, top: f32) -> NodeHandle {
        FlowNode::new(id, NodeKind::Default)
            .with_label("A")
            .with_position(left, top)
            .into_handle()
    }

    // ========================================================================
    // Dragging
    // ========================================================================

    #[test]
    fn test_drag_divides_delta_by_scale() {
        let n1 = node("n1", 10.0, 10.0);
        let mut state = InteractionState::Idle;
        state.press_body(n1.clone(), p(100.0, 100.0)).expect("idle");
        assert!(state.pointer_moved(p(120.0, 110.0), 2.0));
        assert_eq!(n1.borrow().position(), p(20.0, 15.0));
    }

    #[test]
    fn test_drag_accumulates_against_last_sample() {
        let n1 = node("n1", 0.0, 0.0);
        let mut state = InteractionState::Idle;
        state.press_body(n1.clone(), p(0.0, 0.0)).expect("idle");
        state.pointer_moved(p(3.0, 1.0), 0.5);
        state.pointer_moved(p(5.0, 5.0), 0.5);
        state.pointer_moved(p(4.0, 9.0), 0.5);
        // (3 + 2 - 1) / 0.5, (1 + 4 + 4) / 0.5
        assert_eq!(n1.borrow().position(), p(8.0, 18.0));
    }

    #[test]
    fn test_press_while_drawing_is_rejected() {
        let n2 = node("n2", 200.0, 0.0);
        let mut state = InteractionState::Idle;
        state.press_slot(node("n1", 0.0, 0.0), 1).expect("output slot");

        assert_eq!(state.press_body(n2.clone(), p(0.0, 0.0)), Err(CanvasError::GestureInProgress("connector")));
        assert_eq!(state.drawing_source(), Some(("n1".into(), 1)));
        assert_eq!(state.press_slot(n2, 1), Err(CanvasError::GestureInProgress("connector")));
        assert_eq!(state.drawing_source(), Some(("n1".into(), 1)));
    }

    #[test]
    fn test_press_while_dragging_is_rejected() {
        let mut state = InteractionState::Idle;
        state.press_body(node("n1", 0.0, 0.0), p(0.0, 0.0)).expect("idle");

        let err = state.press_slot(node("n2", 200.0, 0.0), 1).unwrap_err();
        assert_eq!(err, CanvasError::GestureInProgress("drag"));
        assert_eq!(state.dragged_node_id().as_deref(), Some("n1"));
    }

    #[test]
    fn test_release_on_dragged_node_confirms() {
        let n1 = node("n1", 0.0, 0.0);
        let mut state = InteractionState::Idle;
        state.press_body(n1, p(0.0, 0.0)).expect("idle");
        state.pointer_moved(p(10.0, 0.0), 1.0);

        let end = state.release_body("n1").expect("drag active");
        assert_eq!(end, Some(DragEnd { id: "n1".into(), left: 10.0, top: 0.0 }));
        assert!(state.is_idle());
    }

    #[test]
    fn test_release_on_other_node_does_not_confirm() {
        let mut state = InteractionState::Idle;
        state.press_body(node("n1", 0.0, 0.0), p(0.0, 0.0)).expect("idle");
        assert_eq!(state.release_body("n2"), Ok(None));
        assert!(state.is_idle());
    }

    #[test]
    fn test_release_without_drag_is_rejected() {
        let mut state = InteractionState::Idle;
        assert_eq!(state.release_body("n1"), Err(CanvasError::NoActiveGesture("drag")));
    }

    #[test]
    fn test_idle_move_is_noop() {
        let mut state = InteractionState::Idle;
        assert!(!state.pointer_moved(p(1.0, 1.0), 1.0));
    }

    // ========================================================================
    // Drawing connectors
    // ========================================================================

    #[test]
    fn test_press_output_slot_starts_drawing() {
        let n1 = node("n1", 10.0, 10.0);
        let mut state = InteractionState::Idle;
        state.press_slot(n1, 1).expect("output slot");
        assert_eq!(state.drawing_source(), Some(("n1".into(), 1)));
        assert_eq!(state.floating_endpoint(), Some(p(110.0, 25.0)));
    }

    #[test]
    fn test_press_input_slot_is_rejected() {
        let mut state = InteractionState::Idle;
        let err = state.press_slot(node("n1", 0.0, 0.0), 0).unwrap_err();
        assert!(matches!(err, CanvasError::WrongSlotRole { expected: SlotRole::Output, .. }));
        assert!(state.is_idle());
    }

    #[test]
    fn test_press_missing_slot_is_rejected() {
        let mut state = InteractionState::Idle;
        let err = state.press_slot(node("n1", 0.0, 0.0), 5).unwrap_err();
        assert_eq!(err, CanvasError::SlotOutOfRange { node: "n1".into(), slot: 5, count: 2 });
    }

    #[test]
    fn test_floating_endpoint_follows_scaled_pointer() {
        let mut state = InteractionState::Idle;
        state.press_slot(node("n1", 0.0, 0.0), 1).expect("output slot");
        state.pointer_moved(p(300.0, 100.0), 2.0);
        assert_eq!(state.floating_endpoint(), Some(p(150.0, 50.0)));
    }

    #[test]
    fn test_release_on_input_slot_yields_key() {
        let n2 = node("n2", 200.0, 0.0);
        let mut state = InteractionState::Idle;
        state.press_slot(node("n1", 0.0, 0.0), 1).expect("output slot");

        let key = state.release_slot(&n2, 0, |_| false).expect("connector");
        assert_eq!(key.predecessor.as_str(), "n1");
        assert_eq!(key.predecessor_slot, 1);
        assert_eq!(key.successor.as_str(), "n2");
        assert_eq!(key.successor_slot, 0);
        assert!(state.is_idle());
    }

    #[test]
    fn test_release_on_output_slot_keeps_drawing() {
        let n2 = node("n2", 200.0, 0.0);
        let mut state = InteractionState::Idle;
        state.press_slot(node("n1", 0.0, 0.0), 1).expect("output slot");

        assert!(state.release_slot(&n2, 1, |_| false).is_err());
        assert!(state.is_drawing());
    }

    #[test]
    fn test_duplicate_release_cancels() {
        let n2 = node("n2", 200.0, 0.0);
        let mut state = InteractionState::Idle;
        state.press_slot(node("n1", 0.0, 0.0), 1).expect("output slot");

        let err = state.release_slot(&n2, 0, |_| true).unwrap_err();
        assert!(matches!(err, CanvasError::DuplicateConnector { .. }));
        assert!(state.is_idle());
    }

    #[test]
    fn test_release_slot_without_gesture() {
        let mut state = InteractionState::Idle;
        let err = state.release_slot(&node("n2", 0.0, 0.0), 0, |_| false).unwrap_err();
        assert_eq!(err, CanvasError::NoActiveGesture("connector"));
    }

    #[test]
    fn test_preview_uses_source_orientation() {
        let cond = FlowNode::new("c", NodeKind::Condition).into_handle();
        let mut state = InteractionState::Idle;
        state.press_slot(cond, 2).expect("output slot");
        let preview = state.preview().expect("drawing");
        assert!(preview.start_vertical);
        assert_eq!(preview.start, preview.end);
    }

    // ========================================================================
    // Abandoning
    // ========================================================================

    #[test]
    fn test_abandon_resets_without_moving() {
        let n1 = node("n1", 5.0, 5.0);
        let mut state = InteractionState::Idle;
        state.press_body(n1.clone(), p(0.0, 0.0)).expect("idle");
        assert!(state.abandon());
        assert!(state.is_idle());
        assert!(!state.abandon());
        assert_eq!(n1.borrow().position(), p(5.0, 5.0));
    }

    #[test]
    fn test_forget_node_only_abandons_involved_gesture() {
        let mut state = InteractionState::Idle;
        state.press_slot(node("n1", 0.0, 0.0), 1).expect("output slot");
        assert!(!state.forget_node("n2"));
        assert!(state.is_drawing());
        assert!(state.forget_node("n1"));
        assert!(state.is_idle());
    }
}
