use slint::SharedString;
use thiserror::Error;

use crate::geometry::SlotRole;

/// Reasons a canvas operation was rejected.
///
/// None of these reach the user: the canvas turns every one of them into a
/// no-op and logs it at `debug` level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    #[error("node '{0}' is not tracked by the canvas")]
    UnknownNode(SharedString),

    #[error("node '{node}' has {count} slots, slot {slot} does not exist")]
    SlotOutOfRange {
        node: SharedString,
        slot: usize,
        count: usize,
    },

    #[error("slot {slot} of node '{node}' is an {found:?} slot, expected {expected:?}")]
    WrongSlotRole {
        node: SharedString,
        slot: usize,
        expected: SlotRole,
        found: SlotRole,
    },

    #[error("a connector from '{predecessor}'[{predecessor_slot}] to '{successor}'[{successor_slot}] already exists")]
    DuplicateConnector {
        predecessor: SharedString,
        predecessor_slot: usize,
        successor: SharedString,
        successor_slot: usize,
    },

    #[error("no {0} gesture is in progress")]
    NoActiveGesture(&'static str),

    #[error("a {0} gesture is already in progress")]
    GestureInProgress(&'static str),

    #[error("nothing is selected")]
    NothingSelected,

    #[error("deleting elements is disabled on this canvas")]
    DeleteNotAllowed,
}

pub type CanvasResult<T> = Result<T, CanvasError>;
