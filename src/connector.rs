//! Connector entity.
//!
//! A connector only stores the ids and slot indices of its two endpoints.
//! Positions are resolved on demand through the canvas's node index, so a
//! removed node never leaves a dangling reference behind.

use std::cell::RefCell;
use std::rc::Rc;

use slint::{Color, SharedString};

/// Shared handle to a connector record.
pub type ConnectorHandle = Rc<RefCell<FlowConnector>>;

/// Prefix of generated connector ids.
pub const CONNECTOR_ID_PREFIX: &str = "connector-";

/// The endpoint tuple that identifies a connection regardless of its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectorKey {
    pub predecessor: SharedString,
    pub predecessor_slot: usize,
    pub successor: SharedString,
    pub successor_slot: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowConnector {
    id: SharedString,
    predecessor: SharedString,
    predecessor_slot: usize,
    successor: SharedString,
    successor_slot: usize,
    color: Option<Color>,
}

impl FlowConnector {
    pub fn new(
        id: impl Into<SharedString>,
        predecessor: impl Into<SharedString>,
        predecessor_slot: usize,
        successor: impl Into<SharedString>,
        successor_slot: usize,
    ) -> Self {
        Self {
            id: id.into(),
            predecessor: predecessor.into(),
            predecessor_slot,
            successor: successor.into(),
            successor_slot,
            color: None,
        }
    }

    pub fn from_key(id: impl Into<SharedString>, key: ConnectorKey) -> Self {
        Self::new(id, key.predecessor, key.predecessor_slot, key.successor, key.successor_slot)
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn into_handle(self) -> ConnectorHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> &SharedString {
        &self.id
    }

    pub fn predecessor(&self) -> &SharedString {
        &self.predecessor
    }

    pub fn predecessor_slot(&self) -> usize {
        self.predecessor_slot
    }

    pub fn successor(&self) -> &SharedString {
        &self.successor
    }

    pub fn successor_slot(&self) -> usize {
        self.successor_slot
    }

    /// Display color, `None` when the renderer should use its default.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// The only attribute that may change after creation.
    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    pub fn key(&self) -> ConnectorKey {
        ConnectorKey {
            predecessor: self.predecessor.clone(),
            predecessor_slot: self.predecessor_slot,
            successor: self.successor.clone(),
            successor_slot: self.successor_slot,
        }
    }

    /// Exact endpoint match; a reversed connection is a different connector.
    pub fn connects(&self, key: &ConnectorKey) -> bool {
        self.predecessor == key.predecessor
            && self.predecessor_slot == key.predecessor_slot
            && self.successor == key.successor
            && self.successor_slot == key.successor_slot
    }

    /// Whether either endpoint is the node `node_id`.
    pub fn touches(&self, node_id: &str) -> bool {
        self.predecessor.as_str() == node_id || self.successor.as_str() == node_id
    }
}

/// Find the first `connector-N` id for which `is_taken` returns false.
pub fn next_connector_id<F>(is_taken: F) -> SharedString
where
    F: Fn(&str) -> bool,
{
    let mut index = 0usize;
    loop {
        let candidate = format!("{}{}", CONNECTOR_ID_PREFIX, index);
        if !is_taken(&candidate) {
            return candidate.into();
        }
        index += 1;
    }
}

/// Check if a connector with the given endpoints already exists.
pub fn duplicate_connector_exists<'a, I>(key: &ConnectorKey, connectors: I) -> bool
where
    I: IntoIterator<Item = &'a ConnectorHandle>,
{
    connectors.into_iter().any(|connector| connector.borrow().connects(key))
}
