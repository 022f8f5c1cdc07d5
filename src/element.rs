//! Items of the host-owned element collection.
//!
//! The host keeps nodes and connectors in one `VecModel<CanvasElement>`.
//! The canvas only reads membership from it (and appends the connectors it
//! creates); removal is the host's job, helped by [`remove_element`].

use slint::{Model, SharedString, VecModel};

use crate::connector::{ConnectorHandle, FlowConnector};
use crate::node::{FlowNode, NodeHandle};

#[derive(Clone, Debug)]
pub enum CanvasElement {
    Node(NodeHandle),
    Connector(ConnectorHandle),
}

impl CanvasElement {
    pub fn id(&self) -> SharedString {
        match self {
            CanvasElement::Node(node) => node.borrow().id().clone(),
            CanvasElement::Connector(connector) => connector.borrow().id().clone(),
        }
    }

    pub fn as_node(&self) -> Option<&NodeHandle> {
        match self {
            CanvasElement::Node(node) => Some(node),
            CanvasElement::Connector(_) => None,
        }
    }

    pub fn as_connector(&self) -> Option<&ConnectorHandle> {
        match self {
            CanvasElement::Node(_) => None,
            CanvasElement::Connector(connector) => Some(connector),
        }
    }
}

impl From<FlowNode> for CanvasElement {
    fn from(node: FlowNode) -> Self {
        CanvasElement::Node(node.into_handle())
    }
}

impl From<FlowConnector> for CanvasElement {
    fn from(connector: FlowConnector) -> Self {
        CanvasElement::Connector(connector.into_handle())
    }
}

impl From<NodeHandle> for CanvasElement {
    fn from(node: NodeHandle) -> Self {
        CanvasElement::Node(node)
    }
}

impl From<ConnectorHandle> for CanvasElement {
    fn from(connector: ConnectorHandle) -> Self {
        CanvasElement::Connector(connector)
    }
}

/// Find an element by id. Returns the first match with its row index.
pub fn find_element(model: &dyn Model<Data = CanvasElement>, id: &str) -> Option<(usize, CanvasElement)> {
    for i in 0..model.row_count() {
        if let Some(element) = model.row_data(i) {
            if element.id().as_str() == id {
                return Some((i, element));
            }
        }
    }
    None
}

/// Whether any element in the collection uses `id`.
pub fn contains_id(model: &dyn Model<Data = CanvasElement>, id: &str) -> bool {
    find_element(model, id).is_some()
}

/// Remove the element with `id` from the collection.
///
/// This is the host-side half of a deletion request; the canvas picks the
/// change up on its next `sync`.
pub fn remove_element(model: &VecModel<CanvasElement>, id: &str) -> Option<CanvasElement> {
    let (index, _) = find_element(model, id)?;
    Some(model.remove(index))
}
