//! Level 4: Selection Tests
//!
//! Tests click selection of nodes and connectors, clearing, programmatic
//! selection, and how selection shows up in the frame.

mod common;

use common::harness::{node, p, CanvasTestHarness};
use pretty_assertions::assert_eq;
use slint::SharedString;
use slint_flow_canvas::{CanvasConfig, CanvasEvent, ConnectorVisual, DrawCommand, NodeKind};

fn selected(id: &str) -> Option<SharedString> {
    Some(SharedString::from(id))
}

fn connected() -> CanvasTestHarness {
    let harness = CanvasTestHarness::new();
    harness.connect("n1", 1, "n2", 0);
    harness.recorder.clear();
    harness
}

fn connector_visuals(harness: &CanvasTestHarness) -> Vec<ConnectorVisual> {
    harness
        .canvas
        .frame()
        .into_iter()
        .filter_map(|command| match command {
            DrawCommand::Connector(visual) => Some(visual),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Node Selection
// ============================================================================

#[test]
fn test_click_selects_node() {
    let harness = CanvasTestHarness::new();

    harness.click_node("n1");

    assert_eq!(harness.canvas.selected_id(), selected("n1"));
    assert_eq!(harness.recorder.all(), vec![CanvasEvent::ElementSelected { id: selected("n1") }]);
}

#[test]
fn test_click_replaces_selection() {
    let harness = CanvasTestHarness::new();

    harness.click_node("n1");
    harness.click_node("n2");

    assert_eq!(harness.canvas.selected_id(), selected("n2"));
    assert_eq!(harness.recorder.selections(), vec![selected("n1"), selected("n2")]);
}

#[test]
fn test_click_same_node_reports_again() {
    let harness = CanvasTestHarness::new();

    harness.click_node("n1");
    harness.click_node("n1");

    assert_eq!(harness.recorder.selections(), vec![selected("n1"), selected("n1")]);
}

#[test]
fn test_click_respects_scale() {
    let harness = CanvasTestHarness::new();
    harness.canvas.set_scale(2.0);

    // Canvas (150, 10) is empty; viewport (150, 10) is n1 at scale 2
    harness.canvas.click(p(150.0, 10.0));

    assert_eq!(harness.canvas.selected_id(), selected("n1"));
}

#[test]
fn test_click_on_overlap_prefers_first_tracked_node() {
    let harness = CanvasTestHarness::with_elements(vec![
        node("n1", NodeKind::Default, 0.0, 0.0),
        node("n2", NodeKind::Default, 50.0, 0.0),
    ]);

    harness.canvas.click(p(75.0, 4.0));

    assert_eq!(harness.canvas.selected_id(), selected("n1"));
}

#[test]
fn test_press_on_overlap_grabs_topmost_node() {
    let harness = CanvasTestHarness::with_elements(vec![
        node("n1", NodeKind::Default, 0.0, 0.0),
        node("n2", NodeKind::Default, 50.0, 0.0),
    ]);

    harness.canvas.pointer_down(p(75.0, 4.0));

    assert_eq!(harness.canvas.dragged_node_id(), selected("n2"));
}

// ============================================================================
// Connector Selection
// ============================================================================

#[test]
fn test_click_on_connector_selects_it() {
    let harness = connected();

    harness.canvas.click(p(150.0, 17.0));

    assert_eq!(harness.canvas.selected_id(), selected("connector-0"));
    assert_eq!(harness.recorder.selections(), vec![selected("connector-0")]);
}

#[test]
fn test_click_beside_connector_misses() {
    let harness = connected();

    harness.canvas.click(p(150.0, 40.0));

    assert_eq!(harness.canvas.selected_id(), None);
}

#[test]
fn test_selected_connector_is_highlighted() {
    let harness = connected();
    let config = CanvasConfig::default();

    harness.canvas.click(p(150.0, 15.0));

    let visuals = connector_visuals(&harness);
    assert!(visuals[0].highlighted);
    assert_eq!(visuals[0].color, config.highlight_color);
}

#[test]
fn test_unselected_connector_uses_default_color() {
    let harness = connected();
    let config = CanvasConfig::default();

    let visuals = connector_visuals(&harness);
    assert!(!visuals[0].highlighted);
    assert_eq!(visuals[0].color, config.default_connector_color);
}

// ============================================================================
// Clearing
// ============================================================================

#[test]
fn test_click_on_empty_canvas_clears_selection() {
    let harness = CanvasTestHarness::new();

    harness.click_node("n1");
    harness.canvas.click(p(700.0, 700.0));

    assert_eq!(harness.canvas.selected_id(), None);
    assert_eq!(harness.recorder.last(), Some(CanvasEvent::ElementSelected { id: None }));
}

#[test]
fn test_click_on_empty_canvas_always_reports() {
    let harness = CanvasTestHarness::new();

    harness.canvas.click(p(700.0, 700.0));

    assert_eq!(harness.recorder.selections(), vec![None]);
}

#[test]
fn test_clear_selection_reports_only_when_changed() {
    let harness = CanvasTestHarness::new();

    harness.canvas.clear_selection();
    assert!(harness.recorder.is_empty());

    harness.click_node("n1");
    harness.canvas.clear_selection();
    assert_eq!(harness.recorder.selections(), vec![selected("n1"), None]);
}

#[test]
fn test_removing_selected_element_clears_selection() {
    let harness = connected();
    harness.canvas.click(p(150.0, 15.0));

    harness.remove("connector-0");

    assert_eq!(harness.canvas.selected_id(), None);
    assert_eq!(harness.recorder.last(), Some(CanvasEvent::ElementSelected { id: None }));
}

// ============================================================================
// Programmatic Selection
// ============================================================================

#[test]
fn test_select_by_id() {
    let harness = CanvasTestHarness::new();

    assert!(harness.canvas.select("n2"));
    assert_eq!(harness.canvas.selected_id(), selected("n2"));
    assert_eq!(harness.recorder.selections(), vec![selected("n2")]);
}

#[test]
fn test_select_unknown_id_is_ignored() {
    let harness = CanvasTestHarness::new();

    assert!(!harness.canvas.select("ghost"));
    assert_eq!(harness.canvas.selected_id(), None);
    assert!(harness.recorder.is_empty());
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_selected_node_has_outline_and_paints_last() {
    let harness = CanvasTestHarness::new();
    harness.click_node("n1");

    let nodes: Vec<(SharedString, Option<f32>)> = harness
        .canvas
        .frame()
        .into_iter()
        .filter_map(|command| match command {
            DrawCommand::Node(visual) => Some((visual.id, visual.stroke_width)),
            _ => None,
        })
        .collect();

    assert_eq!(
        nodes,
        vec![(SharedString::from("n2"), None), (SharedString::from("n1"), Some(3.0))]
    );
}

// ============================================================================
// Double Click
// ============================================================================

#[test]
fn test_double_click_on_node() {
    let harness = CanvasTestHarness::new();

    harness.canvas.double_click(harness.body_point("n2"));

    assert_eq!(harness.recorder.double_clicks(), vec![SharedString::from("n2")]);
}

#[test]
fn test_double_click_on_connector() {
    let harness = connected();

    harness.canvas.double_click(p(150.0, 15.0));

    assert_eq!(harness.recorder.double_clicks(), vec![SharedString::from("connector-0")]);
}

#[test]
fn test_double_click_on_background_is_silent() {
    let harness = CanvasTestHarness::new();

    harness.canvas.double_click(p(700.0, 700.0));

    assert!(harness.recorder.is_empty());
}
