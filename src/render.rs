//! Frame composition.
//!
//! The canvas never draws. It derives an ordered list of [`DrawCommand`]s
//! from its state and replays them into a host-supplied [`DrawingContext`].
//! Commands use canvas coordinates; the context applies the scale.
//!
//! Paint order: background, grid, connectors, idle nodes in tracked order,
//! the selected node, the dragged node, the preview curve.

use slint::{Color, LogicalPosition, LogicalSize, SharedString};

use crate::config::CanvasConfig;
use crate::connector::FlowConnector;
use crate::geometry::{label_lines, Decoration, Drawable, SlotRole, LINE_HEIGHT};
use crate::grid::generate_grid_commands;
use crate::hit_test::ConnectorCurve;
use crate::interaction::InteractionState;
use crate::node::{FlowNode, IconAnchor, NodeHandle};
use crate::reconcile::TrackedElements;
use crate::router::{route, ArrowMarker, CubicCurve};
use crate::selection::Selection;

/// Caption x offset when the icon is anchored left.
const CAPTION_X_AFTER_ICON: f32 = 38.0;
/// Caption x offset when the icon is anchored right.
const CAPTION_X_PLAIN: f32 = 8.0;
/// Baseline offset of the first caption line inside its block.
const CAPTION_BASELINE: f32 = 15.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLine {
    pub text: SharedString,
    /// Baseline start, relative to the node.
    pub position: LogicalPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconPlacement {
    pub source: SharedString,
    /// Top-left corner, relative to the node.
    pub position: LogicalPosition,
    pub size: LogicalSize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotMarker {
    pub index: usize,
    pub role: SlotRole,
    /// Top-left corner of the marker square, relative to the node.
    pub position: LogicalPosition,
    pub size: f32,
}

/// Everything needed to paint one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub id: SharedString,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub drawable: Drawable,
    /// Outline stroke; set for the selected node only.
    pub stroke_width: Option<f32>,
    pub caption: Vec<CaptionLine>,
    pub icon: Option<IconPlacement>,
    pub slots: Vec<SlotMarker>,
    pub decorations: Vec<Decoration>,
}

impl NodeVisual {
    pub fn new(node: &FlowNode, selected: bool, config: &CanvasConfig) -> Self {
        let (width, height) = (node.width(), node.height());
        let kind = node.kind();
        let left_anchored = node.icon_anchor() == IconAnchor::Left;

        let line_count = label_lines(node.label()).count() as f32;
        let caption_x = if left_anchored { CAPTION_X_AFTER_ICON } else { CAPTION_X_PLAIN };
        let caption_y = (height - line_count * LINE_HEIGHT) / 2.0 + CAPTION_BASELINE;
        let caption = label_lines(node.label())
            .enumerate()
            .map(|(i, line)| CaptionLine {
                text: line.into(),
                position: LogicalPosition::new(caption_x, caption_y + i as f32 * LINE_HEIGHT),
            })
            .collect();

        let icon = node.icon().map(|source| {
            let (x, y, w, h) = kind.icon_rect(width, height, left_anchored);
            IconPlacement {
                source: source.clone(),
                position: LogicalPosition::new(x, y),
                size: LogicalSize::new(w, h),
            }
        });

        let half = config.slot_marker_size / 2.0;
        let slots = (0..node.slot_count())
            .filter_map(|index| {
                let center = node.slot_local_position(index)?;
                Some(SlotMarker {
                    index,
                    role: node.slot_role(index)?,
                    position: LogicalPosition::new(center.x - half, center.y - half),
                    size: config.slot_marker_size,
                })
            })
            .collect();

        Self {
            id: node.id().clone(),
            left: node.left(),
            top: node.top(),
            width,
            height,
            drawable: kind.drawable(width, height),
            stroke_width: selected.then_some(config.selected_stroke_width),
            caption,
            icon,
            slots,
            decorations: kind.decorations(width, height),
        }
    }
}

/// Everything needed to paint one connector or the preview curve.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorVisual {
    pub id: SharedString,
    /// Drawn curve; ends `arrow_inset` before the target.
    pub curve: CubicCurve,
    pub arrow: ArrowMarker,
    pub color: Color,
    pub stroke_width: f32,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Background { width: f32, height: f32 },
    /// SVG path of all grid lines.
    Grid { commands: SharedString },
    Connector(ConnectorVisual),
    Node(NodeVisual),
    Preview(ConnectorVisual),
}

/// The rendering surface a host provides.
pub trait DrawingContext {
    fn background(&mut self, width: f32, height: f32);
    fn grid(&mut self, commands: &str);
    fn connector(&mut self, visual: &ConnectorVisual);
    fn node(&mut self, visual: &NodeVisual);

    /// The in-progress connector. Drawn like a connector unless overridden.
    fn preview(&mut self, visual: &ConnectorVisual) {
        self.connector(visual);
    }
}

/// Replay `commands` into `ctx` in order.
pub fn replay<C: DrawingContext + ?Sized>(commands: &[DrawCommand], ctx: &mut C) {
    for command in commands {
        match command {
            DrawCommand::Background { width, height } => ctx.background(*width, *height),
            DrawCommand::Grid { commands } => ctx.grid(commands),
            DrawCommand::Connector(visual) => ctx.connector(visual),
            DrawCommand::Node(visual) => ctx.node(visual),
            DrawCommand::Preview(visual) => ctx.preview(visual),
        }
    }
}

fn tracked_node<'a>(tracked: &'a TrackedElements, connector: &FlowConnector, id: &SharedString) -> &'a NodeHandle {
    tracked.node(id).unwrap_or_else(|| {
        panic!(
            "connector '{}' references node '{}' which is not tracked; reconcile before rendering",
            connector.id(),
            id
        )
    })
}

fn slot_position(node: &FlowNode, connector: &FlowConnector, slot: usize) -> LogicalPosition {
    node.global_slot_position(slot).unwrap_or_else(|| {
        panic!(
            "connector '{}' references slot {} of node '{}' which has {} slots",
            connector.id(),
            slot,
            node.id(),
            node.slot_count()
        )
    })
}

/// Full route of a tracked connector, from its output slot to its input slot.
///
/// # Panics
///
/// Panics if an endpoint node or slot does not resolve. Reconciliation
/// guarantees this never happens for tracked connectors.
pub fn resolve_route(tracked: &TrackedElements, connector: &FlowConnector) -> CubicCurve {
    let predecessor = tracked_node(tracked, connector, connector.predecessor()).borrow();
    let successor = tracked_node(tracked, connector, connector.successor()).borrow();
    route(
        slot_position(&predecessor, connector, connector.predecessor_slot()),
        predecessor.slot_exits_vertically(connector.predecessor_slot()),
        slot_position(&successor, connector, connector.successor_slot()),
        successor.slot_exits_vertically(connector.successor_slot()),
    )
}

fn connector_visual(
    id: SharedString,
    full: CubicCurve,
    color: Color,
    highlighted: bool,
    config: &CanvasConfig,
) -> ConnectorVisual {
    let curve = full.inset_end(config.arrow_inset);
    let (length, width) = config.arrow_size;
    ConnectorVisual {
        id,
        arrow: ArrowMarker::at_end(&curve, full.p3, length, width),
        curve,
        color,
        stroke_width: config.connector_stroke_width,
        highlighted,
    }
}

/// Drawn curves of every tracked connector, for hit-testing.
pub fn connector_curves(tracked: &TrackedElements, config: &CanvasConfig) -> Vec<ConnectorCurve> {
    tracked
        .connectors()
        .iter()
        .map(|handle| {
            let connector = handle.borrow();
            ConnectorCurve {
                id: connector.id().clone(),
                curve: resolve_route(tracked, &connector).inset_end(config.arrow_inset),
            }
        })
        .collect()
}

/// Tracked nodes in paint order: idle nodes, then the selected node, then
/// the dragged node.
pub fn paint_order(tracked: &TrackedElements, state: &InteractionState, selection: &Selection) -> Vec<NodeHandle> {
    let dragged = state.dragged_node_id();
    let is_dragged = |id: &str| dragged.as_deref() == Some(id);

    let mut idle = Vec::with_capacity(tracked.nodes().len());
    let mut selected = None;
    let mut on_top = None;
    for node in tracked.nodes() {
        let id = node.borrow().id().clone();
        if is_dragged(id.as_str()) {
            on_top = Some(node.clone());
        } else if selection.contains(&id) {
            selected = Some(node.clone());
        } else {
            idle.push(node.clone());
        }
    }
    idle.extend(selected);
    idle.extend(on_top);
    idle
}

/// Derive the full frame from canvas state.
pub fn compose_frame(
    tracked: &TrackedElements,
    state: &InteractionState,
    selection: &Selection,
    config: &CanvasConfig,
    scale: f32,
) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(3 + tracked.nodes().len() + tracked.connectors().len());

    commands.push(DrawCommand::Background { width: config.width, height: config.height });
    if config.show_grid {
        let grid = generate_grid_commands(config.width, config.height, config.grid_size, scale);
        if !grid.is_empty() {
            commands.push(DrawCommand::Grid { commands: grid.into() });
        }
    }

    for handle in tracked.connectors() {
        let connector = handle.borrow();
        let highlighted = selection.contains(connector.id());
        let color = if highlighted {
            config.highlight_color
        } else {
            connector.color().unwrap_or(config.default_connector_color)
        };
        let full = resolve_route(tracked, &connector);
        commands.push(DrawCommand::Connector(connector_visual(
            connector.id().clone(),
            full,
            color,
            highlighted,
            config,
        )));
    }

    for handle in paint_order(tracked, state, selection) {
        let node = handle.borrow();
        let selected = selection.contains(node.id());
        commands.push(DrawCommand::Node(NodeVisual::new(&node, selected, config)));
    }

    if let Some(preview) = state.preview() {
        let full = route(preview.start, preview.start_vertical, preview.end, true);
        commands.push(DrawCommand::Preview(connector_visual(
            "preview".into(),
            full,
            config.preview_color,
            false,
            config,
        )));
    }

    commands
}
