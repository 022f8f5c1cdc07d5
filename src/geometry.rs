//! Node geometry model.
//!
//! Every node kind is a row in a static table of geometry functions
//! ([`KindGeometry`]). Adding a kind means adding a [`NodeKind`] variant and
//! its table row; nothing else in the crate branches on the kind.

use slint::{Color, LogicalPosition, LogicalSize};

/// Smallest width a node is auto-sized to.
pub const MIN_WIDTH: f32 = 100.0;
/// Smallest height a node is auto-sized to.
pub const MIN_HEIGHT: f32 = 30.0;
/// Horizontal advance of one label character.
pub const CHAR_WIDTH: f32 = 7.2;
/// Height of one label line.
pub const LINE_HEIGHT: f32 = 24.0;
/// Width reserved for the node icon.
pub const ICON_WIDTH: f32 = 30.0;
/// Margin on each side of the icon.
pub const ICON_MARGIN: f32 = 5.0;
/// Side length of a slot marker.
pub const SLOT_SIZE: f32 = 10.0;
/// Vertical room each slot needs when sizing a node.
pub const SLOT_PITCH: f32 = 10.0;
/// Extra vertical room added on top of the slot pitch.
pub const SLOT_MARGIN: f32 = 2.0 * ICON_MARGIN;

/// Whether a slot accepts connectors or emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRole {
    Input,
    Output,
}

/// Outline a node kind is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle with rounded corners.
    RoundedRect { width: f32, height: f32, radius: f32 },
    /// Closed polygon, points relative to the node's top-left corner.
    Polygon { points: Vec<LogicalPosition> },
}

/// A node outline plus the color it is filled with.
///
/// This is what a node kind hands to the drawing context; the context owns
/// turning it into pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub shape: Shape,
    pub fill: Color,
}

/// A small text marker drawn next to a slot (e.g. the `+`/`-` of a condition).
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub text: &'static str,
    pub position: LogicalPosition,
}

/// The capability set every node kind provides.
#[derive(Clone, Copy)]
pub struct KindGeometry {
    pub name: &'static str,
    pub slot_count: usize,
    pub color: fn() -> Color,
    pub is_input_slot: fn(usize) -> bool,
    pub slot_local_position: fn(usize, f32, f32) -> LogicalPosition,
    pub slot_exits_vertically: fn(usize) -> bool,
    pub shape: fn(f32, f32) -> Shape,
    pub decorations: fn(f32, f32) -> Vec<Decoration>,
    /// Icon box `(x, y, width, height)` for a node of the given size; the
    /// flag is true when the icon is anchored left.
    pub icon_rect: fn(f32, f32, bool) -> (f32, f32, f32, f32),
    pub connector_color: fn(usize) -> Option<Color>,
}

/// The node kinds a canvas knows how to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// Rounded box, one input on the left, outputs along the right edge.
    #[default]
    Default,
    /// Diamond with an input and a "true"/"false" pair of outputs.
    Condition,
    /// Box with a body output and a loop-back input at the bottom.
    ForLoop,
    /// Free text, no slots.
    Comment,
}

static DEFAULT_GEOMETRY: KindGeometry = KindGeometry {
    name: "default",
    slot_count: 2,
    color: default_color,
    is_input_slot: default_is_input,
    slot_local_position: default_slot_position,
    slot_exits_vertically: never_vertical,
    shape: rounded_rect,
    decorations: no_decorations,
    icon_rect: side_icon,
    connector_color: no_connector_color,
};

static CONDITION_GEOMETRY: KindGeometry = KindGeometry {
    name: "condition",
    slot_count: 3,
    color: condition_color,
    is_input_slot: default_is_input,
    slot_local_position: condition_slot_position,
    slot_exits_vertically: condition_vertical,
    shape: diamond,
    decorations: condition_decorations,
    icon_rect: corner_icon,
    connector_color: condition_connector_color,
};

static FOR_LOOP_GEOMETRY: KindGeometry = KindGeometry {
    name: "for-loop",
    slot_count: 4,
    color: for_loop_color,
    is_input_slot: for_loop_is_input,
    slot_local_position: for_loop_slot_position,
    slot_exits_vertically: for_loop_vertical,
    shape: rounded_rect,
    decorations: no_decorations,
    icon_rect: side_icon,
    connector_color: no_connector_color,
};

static COMMENT_GEOMETRY: KindGeometry = KindGeometry {
    name: "comment",
    slot_count: 0,
    color: default_color,
    is_input_slot: default_is_input,
    slot_local_position: default_slot_position,
    slot_exits_vertically: never_vertical,
    shape: rounded_rect,
    decorations: no_decorations,
    icon_rect: side_icon,
    connector_color: no_connector_color,
};

impl NodeKind {
    /// All built-in kinds, in table order.
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Default,
        NodeKind::Condition,
        NodeKind::ForLoop,
        NodeKind::Comment,
    ];

    /// The geometry table row for this kind.
    pub fn geometry(self) -> &'static KindGeometry {
        match self {
            NodeKind::Default => &DEFAULT_GEOMETRY,
            NodeKind::Condition => &CONDITION_GEOMETRY,
            NodeKind::ForLoop => &FOR_LOOP_GEOMETRY,
            NodeKind::Comment => &COMMENT_GEOMETRY,
        }
    }

    pub fn name(self) -> &'static str {
        self.geometry().name
    }

    pub fn slot_count(self) -> usize {
        self.geometry().slot_count
    }

    pub fn color(self) -> Color {
        (self.geometry().color)()
    }

    /// Role of `index`, or `None` when the kind has no such slot.
    pub fn slot_role(self, index: usize) -> Option<SlotRole> {
        if index >= self.slot_count() {
            return None;
        }
        Some(if (self.geometry().is_input_slot)(index) {
            SlotRole::Input
        } else {
            SlotRole::Output
        })
    }

    pub fn is_input_slot(self, index: usize) -> bool {
        self.slot_role(index) == Some(SlotRole::Input)
    }

    pub fn is_output_slot(self, index: usize) -> bool {
        self.slot_role(index) == Some(SlotRole::Output)
    }

    /// Slot position relative to the node's top-left corner.
    pub fn slot_local_position(self, index: usize, width: f32, height: f32) -> Option<LogicalPosition> {
        (index < self.slot_count()).then(|| (self.geometry().slot_local_position)(index, width, height))
    }

    /// Whether a connector touching this slot leaves it vertically.
    pub fn slot_exits_vertically(self, index: usize) -> bool {
        index < self.slot_count() && (self.geometry().slot_exits_vertically)(index)
    }

    pub fn auto_size(self, label: &str) -> LogicalSize {
        auto_size(label, self.slot_count())
    }

    pub fn drawable(self, width: f32, height: f32) -> Drawable {
        Drawable {
            shape: (self.geometry().shape)(width, height),
            fill: self.color(),
        }
    }

    pub fn decorations(self, width: f32, height: f32) -> Vec<Decoration> {
        (self.geometry().decorations)(width, height)
    }

    pub fn icon_rect(self, width: f32, height: f32, left_anchored: bool) -> (f32, f32, f32, f32) {
        (self.geometry().icon_rect)(width, height, left_anchored)
    }

    /// Color this kind assigns to a connector leaving `predecessor_slot`.
    pub fn connector_color(self, predecessor_slot: usize) -> Option<Color> {
        (self.geometry().connector_color)(predecessor_slot)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Compute the size a node needs for `label` and `slot_count` slots.
///
/// The label is split on `\n`; characters are counted, not bytes. The result
/// never goes below [`MIN_WIDTH`] x [`MIN_HEIGHT`].
pub fn auto_size(label: &str, slot_count: usize) -> LogicalSize {
    LogicalSize::new(auto_width(label), auto_height(label, slot_count))
}

pub fn auto_width(label: &str) -> f32 {
    let longest = label.split('\n').map(|line| line.chars().count()).max().unwrap_or(0);
    let needed = longest as f32 * CHAR_WIDTH + ICON_WIDTH + ICON_MARGIN * 2.0 + SLOT_SIZE;
    MIN_WIDTH.max(needed)
}

pub fn auto_height(label: &str, slot_count: usize) -> f32 {
    let lines = label.split('\n').count();
    MIN_HEIGHT
        .max(lines as f32 * LINE_HEIGHT)
        .max(slot_count as f32 * SLOT_PITCH + SLOT_MARGIN)
}

/// Number of caption lines a label renders as.
pub fn label_lines(label: &str) -> impl Iterator<Item = &str> {
    label.split('\n')
}

// === Table functions ===

fn default_color() -> Color {
    Color::from_rgb_u8(0xc0, 0xed, 0xc0)
}

fn condition_color() -> Color {
    Color::from_rgb_u8(255, 255, 0)
}

fn for_loop_color() -> Color {
    Color::from_rgb_u8(173, 216, 230)
}

fn default_is_input(index: usize) -> bool {
    index == 0
}

fn for_loop_is_input(index: usize) -> bool {
    index == 0 || index == 3
}

fn default_slot_position(index: usize, width: f32, height: f32) -> LogicalPosition {
    if default_is_input(index) {
        LogicalPosition::new(0.0, height / 2.0)
    } else {
        let count = DEFAULT_GEOMETRY.slot_count as f32;
        LogicalPosition::new(width, index as f32 * height / count)
    }
}

fn condition_slot_position(index: usize, width: f32, height: f32) -> LogicalPosition {
    match index {
        0 => LogicalPosition::new(0.0, height / 2.0),
        1 => LogicalPosition::new(width, height / 2.0),
        _ => LogicalPosition::new(width / 2.0, height),
    }
}

fn for_loop_slot_position(index: usize, width: f32, height: f32) -> LogicalPosition {
    match index {
        0 => LogicalPosition::new(0.0, height / 2.0),
        1 => LogicalPosition::new(width, height / 2.0),
        2 => LogicalPosition::new(width / 2.0, height),
        _ => LogicalPosition::new(width - 15.0, height),
    }
}

fn never_vertical(_index: usize) -> bool {
    false
}

fn condition_vertical(index: usize) -> bool {
    index == 2
}

fn for_loop_vertical(index: usize) -> bool {
    index >= 2
}

fn rounded_rect(width: f32, height: f32) -> Shape {
    Shape::RoundedRect { width, height, radius: 5.0 }
}

fn diamond(width: f32, height: f32) -> Shape {
    Shape::Polygon {
        points: vec![
            LogicalPosition::new(0.0, height / 2.0),
            LogicalPosition::new(width / 2.0, 0.0),
            LogicalPosition::new(width, height / 2.0),
            LogicalPosition::new(width / 2.0, height),
        ],
    }
}

fn no_decorations(_width: f32, _height: f32) -> Vec<Decoration> {
    Vec::new()
}

fn condition_decorations(width: f32, height: f32) -> Vec<Decoration> {
    vec![
        Decoration { text: "+", position: LogicalPosition::new(width - 4.0, height / 2.0 - 16.0) },
        Decoration { text: "-", position: LogicalPosition::new(width / 2.0 - 16.0, height) },
    ]
}

fn side_icon(width: f32, height: f32, left_anchored: bool) -> (f32, f32, f32, f32) {
    let x = if left_anchored { 0.0 } else { width - ICON_WIDTH };
    (x, 0.0, ICON_WIDTH, height)
}

// Diamond: icon sits over the upper-left edge
fn corner_icon(_width: f32, _height: f32, _left_anchored: bool) -> (f32, f32, f32, f32) {
    (16.0, -16.0, ICON_WIDTH, ICON_WIDTH)
}

fn no_connector_color(_slot: usize) -> Option<Color> {
    None
}

fn condition_connector_color(slot: usize) -> Option<Color> {
    match slot {
        1 => Some(Color::from_rgb_u8(0, 128, 0)),
        2 => Some(Color::from_rgb_u8(0x99, 0, 0)),
        _ => None,
    }
}
