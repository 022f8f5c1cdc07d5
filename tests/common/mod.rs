//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use std::cell::RefCell;
use std::rc::Rc;

use slint::SharedString;
use slint_flow_canvas::{CanvasEvent, FlowCanvas, FlowConnector};

/// Records every event a canvas emits, in order.
#[derive(Default, Clone)]
pub struct EventRecorder {
    pub events: Rc<RefCell<Vec<CanvasEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a new recorder to `canvas`.
    pub fn attach(canvas: &FlowCanvas) -> Self {
        let recorder = Self::new();
        canvas.on_event({
            let events = recorder.events.clone();
            move |event| events.borrow_mut().push(event.clone())
        });
        recorder
    }

    pub fn all(&self) -> Vec<CanvasEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn last(&self) -> Option<CanvasEvent> {
        self.events.borrow().last().cloned()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn selections(&self) -> Vec<Option<SharedString>> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                CanvasEvent::ElementSelected { id } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// (id, left, top)
    pub fn value_changes(&self) -> Vec<(SharedString, f32, f32)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                CanvasEvent::ValueChanged { id, left, top } => Some((id.clone(), *left, *top)),
                _ => None,
            })
            .collect()
    }

    pub fn created_connectors(&self) -> Vec<FlowConnector> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                CanvasEvent::ConnectorCreated { connector } => Some(connector.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn delete_requests(&self) -> Vec<SharedString> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                CanvasEvent::DeleteRequested { id } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn double_clicks(&self) -> Vec<SharedString> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                CanvasEvent::ElementDoubleClicked { id } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }
}
