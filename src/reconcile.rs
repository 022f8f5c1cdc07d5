//! Reconciliation of the canvas's tracked entities with the host collection.
//!
//! The host owns a `VecModel<CanvasElement>` and mutates its membership at
//! will. [`TrackedElements::reconcile`] brings the canvas's own ordered lists
//! back in line with it: nodes first, then connectors, then a pruning pass so
//! that every tracked connector resolves to two tracked nodes.
//!
//! Attribute edits on entities that are already tracked need no
//! reconciliation; the canvas shares the same `Rc` handles as the host.

use std::collections::{HashMap, HashSet};

use slint::{Model, SharedString};

use crate::connector::ConnectorHandle;
use crate::element::CanvasElement;
use crate::node::{IntentSink, NodeHandle};

/// What one reconciliation pass changed. Empty when nothing did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub nodes_added: Vec<SharedString>,
    pub nodes_removed: Vec<SharedString>,
    pub connectors_added: Vec<SharedString>,
    pub connectors_removed: Vec<SharedString>,
    /// Connectors dropped because an endpoint node is no longer tracked, or
    /// no longer has the slot they attach to.
    pub connectors_pruned: Vec<SharedString>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.nodes_added.is_empty()
            && self.nodes_removed.is_empty()
            && self.connectors_added.is_empty()
            && self.connectors_removed.is_empty()
            && self.connectors_pruned.is_empty()
    }

    /// Ids of every element that stopped being tracked.
    pub fn removed_ids(&self) -> impl Iterator<Item = &SharedString> {
        self.nodes_removed
            .iter()
            .chain(&self.connectors_removed)
            .chain(&self.connectors_pruned)
    }
}

/// The canvas's ordered view of the host collection.
#[derive(Default)]
pub struct TrackedElements {
    nodes: Vec<NodeHandle>,
    connectors: Vec<ConnectorHandle>,
    /// Node id to position in `nodes`; rebuilt after every pass.
    node_index: HashMap<String, usize>,
}

impl TrackedElements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    pub fn connectors(&self) -> &[ConnectorHandle] {
        &self.connectors
    }

    /// Resolve a node id through the tracked node index.
    pub fn node(&self, id: &str) -> Option<&NodeHandle> {
        self.node_index.get(id).and_then(|&i| self.nodes.get(i))
    }

    pub fn connector(&self, id: &str) -> Option<&ConnectorHandle> {
        self.connectors.iter().find(|c| c.borrow().id().as_str() == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Whether `id` names any tracked node or connector.
    pub fn contains(&self, id: &str) -> bool {
        self.contains_node(id) || self.connector(id).is_some()
    }

    /// Sync the tracked lists with `model`.
    ///
    /// New nodes get `sink` attached; dropped nodes have their listener
    /// detached. Running this twice against an unchanged model is a no-op
    /// the second time.
    pub fn reconcile(&mut self, model: &dyn Model<Data = CanvasElement>, sink: &IntentSink) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let mut candidate_nodes = Vec::new();
        let mut candidate_connectors = Vec::new();
        for row in 0..model.row_count() {
            match model.row_data(row) {
                Some(CanvasElement::Node(node)) => candidate_nodes.push(node),
                Some(CanvasElement::Connector(connector)) => candidate_connectors.push(connector),
                None => {}
            }
        }

        // Nodes: drop, then append
        let candidate_node_ids: HashSet<SharedString> =
            candidate_nodes.iter().map(|n| n.borrow().id().clone()).collect();
        // Surviving nodes are only borrowed shared: one of them may be the
        // node whose intent triggered this pass.
        self.nodes.retain(|node| {
            let id = node.borrow().id().clone();
            if candidate_node_ids.contains(&id) {
                return true;
            }
            node.borrow_mut().detach_listener();
            report.nodes_removed.push(id);
            false
        });

        let mut tracked_node_ids: HashSet<SharedString> =
            self.nodes.iter().map(|n| n.borrow().id().clone()).collect();
        for node in candidate_nodes {
            let id = node.borrow().id().clone();
            if tracked_node_ids.contains(&id) {
                continue;
            }
            node.borrow_mut().attach_listener(sink.clone());
            tracked_node_ids.insert(id.clone());
            report.nodes_added.push(id);
            self.nodes.push(node);
        }

        // Connectors: drop, then append those whose endpoints resolve
        let candidate_connector_ids: HashSet<SharedString> =
            candidate_connectors.iter().map(|c| c.borrow().id().clone()).collect();
        self.connectors.retain(|connector| {
            let connector = connector.borrow();
            if candidate_connector_ids.contains(connector.id()) {
                return true;
            }
            report.connectors_removed.push(connector.id().clone());
            false
        });

        let slot_counts: HashMap<SharedString, usize> = self
            .nodes
            .iter()
            .map(|n| {
                let n = n.borrow();
                (n.id().clone(), n.slot_count())
            })
            .collect();
        let resolves = |c: &ConnectorHandle| {
            let c = c.borrow();
            let has_slot = |node: &SharedString, slot: usize| slot_counts.get(node).is_some_and(|&count| slot < count);
            has_slot(c.predecessor(), c.predecessor_slot()) && has_slot(c.successor(), c.successor_slot())
        };

        let mut tracked_connector_ids: HashSet<SharedString> =
            self.connectors.iter().map(|c| c.borrow().id().clone()).collect();
        for connector in candidate_connectors {
            let id = connector.borrow().id().clone();
            // Dangling records stay in the host collection but are never tracked
            if tracked_connector_ids.contains(&id) || !resolves(&connector) {
                continue;
            }
            tracked_connector_ids.insert(id.clone());
            report.connectors_added.push(id);
            self.connectors.push(connector);
        }

        // Prune connectors left dangling by node removal or a slot-count change
        self.connectors.retain(|connector| {
            if resolves(connector) {
                return true;
            }
            report.connectors_pruned.push(connector.borrow().id().clone());
            false
        });

        self.reindex();

        if !report.is_empty() {
            log::debug!(
                "reconcile: +{} -{} nodes, +{} -{} connectors, {} pruned",
                report.nodes_added.len(),
                report.nodes_removed.len(),
                report.connectors_added.len(),
                report.connectors_removed.len(),
                report.connectors_pruned.len()
            );
        }

        report
    }

    /// Detach every tracked node's listener and forget all entities.
    pub fn clear(&mut self) {
        for node in self.nodes.drain(..) {
            node.borrow_mut().detach_listener();
        }
        self.connectors.clear();
        self.node_index.clear();
    }

    fn reindex(&mut self) {
        self.node_index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.borrow().id().to_string(), i))
            .collect();
    }
}
