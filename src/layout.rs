//! Layered (Sugiyama) auto-arrangement of tracked nodes.
//!
//! Positions come from the `rust-sugiyama` crate, which works in `f64`; they
//! are shifted so the arrangement starts at `margin` and converted back to
//! `f32` canvas coordinates.
//!
//! Requires the `layout` feature to be enabled.

use std::collections::{HashMap, HashSet};

use slint::SharedString;

use crate::reconcile::TrackedElements;

/// Direction layers flow in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Direction {
    /// Layers flow left to right, matching connectors that leave nodes on
    /// the right and enter on the left (default).
    #[default]
    LeftToRight,
    TopToBottom,
}

/// A node position computed by [`layered_layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodePosition {
    pub id: SharedString,
    pub left: f32,
    pub top: f32,
}

#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct LayoutConfig {
    /// Minimum spacing between vertices (0.0 keeps the `rust-sugiyama`
    /// default of 10.0).
    pub vertex_spacing: f64,
    /// Minimum edge length between layers (0 keeps the default of 1).
    pub minimum_length: u32,
    pub dummy_vertices: bool,
    pub direction: Direction,
    /// Distance of the arrangement's top-left corner from the canvas origin.
    pub margin: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            vertex_spacing: 0.0,
            minimum_length: 0,
            dummy_vertices: false,
            direction: Direction::default(),
            margin: 20.0,
        }
    }
}

impl LayoutConfig {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_vertex_spacing(mut self, spacing: f64) -> Self {
        self.vertex_spacing = spacing;
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }
}

/// Compute a layered layout.
///
/// `edges` are `(predecessor, successor)` node id pairs; `node_sizes` gives
/// each node's `(width, height)`. Edges naming unknown nodes are skipped and
/// duplicate node ids keep their first size.
pub fn layered_layout(
    edges: &[(SharedString, SharedString)],
    node_sizes: &[(SharedString, (f64, f64))],
    config: &LayoutConfig,
) -> Vec<NodePosition> {
    if node_sizes.is_empty() {
        return Vec::new();
    }

    let horizontal = config.direction == Direction::LeftToRight;

    let mut id_to_idx: HashMap<&SharedString, u32> = HashMap::new();
    let mut vertices: Vec<(u32, (f64, f64))> = Vec::with_capacity(node_sizes.len());
    let mut idx_to_id: Vec<&SharedString> = Vec::with_capacity(node_sizes.len());
    for (id, (w, h)) in node_sizes {
        if id_to_idx.contains_key(id) {
            continue;
        }
        let idx = idx_to_id.len() as u32;
        id_to_idx.insert(id, idx);
        idx_to_id.push(id);
        // rust-sugiyama layers top to bottom; swap axes for horizontal flow
        vertices.push((idx, if horizontal { (*h, *w) } else { (*w, *h) }));
    }

    let mapped_edges: Vec<(u32, u32)> = edges
        .iter()
        .filter_map(|(src, dst)| Some((*id_to_idx.get(src)?, *id_to_idx.get(dst)?)))
        .collect();

    let mut sg_config = rust_sugiyama::configure::Config {
        dummy_vertices: config.dummy_vertices,
        ..Default::default()
    };
    if config.vertex_spacing > 0.0 {
        sg_config.vertex_spacing = config.vertex_spacing;
    }
    if config.minimum_length > 0 {
        sg_config.minimum_length = config.minimum_length;
    }

    let subgraphs = rust_sugiyama::from_vertices_and_edges(&vertices, &mapped_edges, &sg_config);

    let mut raw = Vec::with_capacity(idx_to_id.len());
    for (layout, _width, _height) in &subgraphs {
        for &(idx, (x, y)) in layout {
            if let Some(&id) = idx_to_id.get(idx) {
                raw.push((id, if horizontal { (y, x) } else { (x, y) }));
            }
        }
    }

    let min_x = raw.iter().map(|(_, (x, _))| *x).fold(f64::INFINITY, f64::min);
    let min_y = raw.iter().map(|(_, (_, y))| *y).fold(f64::INFINITY, f64::min);
    let margin = config.margin as f64;

    raw.into_iter()
        .map(|(id, (x, y))| NodePosition {
            id: id.clone(),
            left: (x - min_x + margin) as f32,
            top: (y - min_y + margin) as f32,
        })
        .collect()
}

/// Lay out the tracked nodes using tracked connectors as edges.
///
/// Parallel connectors between the same two nodes count once; self-loops
/// are ignored.
pub fn layout_tracked(tracked: &TrackedElements, config: &LayoutConfig) -> Vec<NodePosition> {
    let mut seen = HashSet::new();
    let edges: Vec<(SharedString, SharedString)> = tracked
        .connectors()
        .iter()
        .filter_map(|handle| {
            let connector = handle.borrow();
            if connector.predecessor() == connector.successor() {
                return None;
            }
            let edge = (connector.predecessor().clone(), connector.successor().clone());
            seen.insert(edge.clone()).then_some(edge)
        })
        .collect();

    let node_sizes: Vec<(SharedString, (f64, f64))> = tracked
        .nodes()
        .iter()
        .map(|handle| {
            let node = handle.borrow();
            (node.id().clone(), (node.width() as f64, node.height() as f64))
        })
        .collect();

    layered_layout(&edges, &node_sizes, config)
}
