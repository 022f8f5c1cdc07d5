use slint::Color;

/// Settings a host hands to [`FlowCanvas::new`](crate::FlowCanvas::new).
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    /// Canvas extent in canvas units.
    pub width: f32,
    pub height: f32,
    pub grid_size: f32,
    pub show_grid: bool,
    pub min_scale: f32,
    pub max_scale: f32,
    pub scale_step: f32,
    /// Whether the deletion intent is honored at all.
    pub delete_allowed: bool,
    pub connector_stroke_width: f32,
    /// Stroke of connectors that carry no color of their own.
    pub default_connector_color: Color,
    /// Stroke of the selected connector.
    pub highlight_color: Color,
    /// Stroke of the connector being drawn.
    pub preview_color: Color,
    /// How far before the input slot a connector curve stops, leaving room
    /// for the arrow head.
    pub arrow_inset: f32,
    /// Arrow head `(length, width)`.
    pub arrow_size: (f32, f32),
    pub slot_marker_size: f32,
    /// Stroke width of the selected node's outline.
    pub selected_stroke_width: f32,
    pub curve_hit_tolerance: f32,
    pub curve_hit_samples: usize,
    /// Zoom-to-fit widens the node bounds by this much on the top/left.
    pub fit_margin: f32,
    /// Zoom-to-fit widens the node bounds by this much on the bottom/right.
    pub fit_padding: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 8000.0,
            height: 8000.0,
            grid_size: 20.0,
            show_grid: true,
            min_scale: 0.1,
            max_scale: 2.0,
            scale_step: 0.1,
            delete_allowed: true,
            connector_stroke_width: 3.0,
            default_connector_color: Color::from_rgb_u8(0, 0, 0),
            highlight_color: Color::from_rgb_u8(255, 0, 0),
            preview_color: Color::from_rgb_u8(255, 0, 0),
            arrow_inset: 10.0,
            arrow_size: (12.0, 6.0),
            slot_marker_size: 10.0,
            selected_stroke_width: 3.0,
            curve_hit_tolerance: 5.0,
            curve_hit_samples: 20,
            fit_margin: 10.0,
            fit_padding: 20.0,
        }
    }
}

impl CanvasConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_grid(mut self, grid_size: f32, show_grid: bool) -> Self {
        self.grid_size = grid_size;
        self.show_grid = show_grid;
        self
    }

    /// Scale bounds; swapped if given in the wrong order.
    pub fn with_scale_range(mut self, min_scale: f32, max_scale: f32) -> Self {
        self.min_scale = min_scale.min(max_scale);
        self.max_scale = max_scale.max(min_scale);
        self
    }

    pub fn with_scale_step(mut self, step: f32) -> Self {
        self.scale_step = step;
        self
    }

    pub fn with_delete_allowed(mut self, allowed: bool) -> Self {
        self.delete_allowed = allowed;
        self
    }

    pub fn with_connector_colors(mut self, default: Color, highlight: Color, preview: Color) -> Self {
        self.default_connector_color = default;
        self.highlight_color = highlight;
        self.preview_color = preview;
        self
    }

    pub fn with_connector_stroke_width(mut self, width: f32) -> Self {
        self.connector_stroke_width = width;
        self
    }

    pub fn with_curve_hit(mut self, tolerance: f32, samples: usize) -> Self {
        self.curve_hit_tolerance = tolerance;
        self.curve_hit_samples = samples;
        self
    }

    pub fn with_fit_insets(mut self, margin: f32, padding: f32) -> Self {
        self.fit_margin = margin;
        self.fit_padding = padding;
        self
    }

    /// Clamp `scale` into the configured range.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        if scale.is_nan() {
            return 1.0_f32.clamp(self.min_scale, self.max_scale);
        }
        scale.clamp(self.min_scale, self.max_scale)
    }
}
