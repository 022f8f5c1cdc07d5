//! Level 5: Keyboard & Deletion Tests
//!
//! Tests Delete/Backspace handling, the delete-allowed switch, and the full
//! round trip through a host that honors deletion requests.

mod common;

use common::harness::{p, CanvasTestHarness};
use pretty_assertions::assert_eq;
use slint::platform::Key;
use slint::SharedString;
use slint_flow_canvas::{CanvasConfig, CanvasEvent};

fn key_text(key: Key) -> SharedString {
    SharedString::from(key)
}

#[test]
fn test_delete_key_requests_deletion_of_selection() {
    let harness = CanvasTestHarness::new();
    harness.click_node("n1");
    harness.recorder.clear();

    assert!(harness.canvas.key_released(&key_text(Key::Delete)));

    assert_eq!(harness.recorder.all(), vec![CanvasEvent::DeleteRequested { id: "n1".into() }]);
}

#[test]
fn test_backspace_key_requests_deletion() {
    let harness = CanvasTestHarness::new();
    harness.click_node("n2");

    assert!(harness.canvas.key_released(&key_text(Key::Backspace)));

    assert_eq!(harness.recorder.delete_requests(), vec![SharedString::from("n2")]);
}

#[test]
fn test_key_names_are_accepted() {
    let harness = CanvasTestHarness::new();
    harness.click_node("n1");

    assert!(harness.canvas.key_released("Delete"));
    assert!(harness.canvas.key_released("Backspace"));

    assert_eq!(harness.recorder.delete_requests().len(), 2);
}

#[test]
fn test_other_keys_are_ignored() {
    let harness = CanvasTestHarness::new();
    harness.click_node("n1");
    harness.recorder.clear();

    assert!(!harness.canvas.key_released("a"));
    assert!(!harness.canvas.key_released(&key_text(Key::Escape)));

    assert!(harness.recorder.is_empty());
}

#[test]
fn test_delete_without_selection_is_ignored() {
    let harness = CanvasTestHarness::new();

    assert!(!harness.canvas.key_released("Delete"));
    assert!(harness.recorder.is_empty());
}

#[test]
fn test_delete_not_allowed() {
    let harness = CanvasTestHarness::with_config(
        vec![common::harness::node("n1", slint_flow_canvas::NodeKind::Default, 0.0, 0.0)],
        CanvasConfig::default().with_delete_allowed(false),
    );
    harness.click_node("n1");
    harness.recorder.clear();

    assert!(!harness.canvas.request_delete());
    assert!(harness.recorder.is_empty());
}

#[test]
fn test_delete_allowed_can_be_toggled() {
    let harness = CanvasTestHarness::new();
    harness.click_node("n1");

    harness.canvas.set_delete_allowed(false);
    assert!(!harness.canvas.key_released("Delete"));

    harness.canvas.set_delete_allowed(true);
    assert!(harness.canvas.key_released("Delete"));
    assert_eq!(harness.recorder.delete_requests(), vec![SharedString::from("n1")]);
}

#[test]
fn test_canvas_does_not_remove_elements_itself() {
    let harness = CanvasTestHarness::new();
    harness.click_node("n1");

    harness.canvas.request_delete();

    assert_eq!(harness.row_count(), 2);
    assert_eq!(harness.canvas.selected_id().as_deref(), Some("n1"));
}

#[test]
fn test_host_deletion_of_node_prunes_connectors() {
    let harness = CanvasTestHarness::new();
    harness.honor_delete_requests();
    harness.connect("n1", 1, "n2", 0);
    harness.click_node("n2");

    assert!(harness.canvas.key_released("Delete"));

    assert_eq!(harness.tracked_node_ids(), vec![SharedString::from("n1")]);
    assert_eq!(harness.connector_count(), 0);
    assert_eq!(harness.canvas.selected_id(), None);
    assert_eq!(harness.recorder.last(), Some(CanvasEvent::ElementSelected { id: None }));
}

#[test]
fn test_host_deletion_of_connector() {
    let harness = CanvasTestHarness::new();
    harness.honor_delete_requests();
    harness.connect("n1", 1, "n2", 0);
    harness.canvas.click(p(150.0, 15.0));

    assert!(harness.canvas.key_released("Backspace"));

    assert_eq!(harness.connector_count(), 0);
    assert_eq!(harness.row_count(), 2);
    assert_eq!(harness.tracked_node_ids().len(), 2);
}
