//! Test and replay double: an in-memory [`InputHost`] that records every injected event

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use wd_actions_core_types::{ElementRef, Point, Viewport};

use crate::errors::HostError;
use crate::host::InputHost;
use crate::types::{CenterMode, KeyEvent, MouseEvent, MouseEventKind};

/// One injected event, tagged with the channel it was delivered on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "channel", rename_all = "lowercase")]
pub enum RecordedEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
}

impl RecordedEvent {
    pub fn as_key(&self) -> Option<&KeyEvent> {
        match self {
            RecordedEvent::Key(event) => Some(event),
            RecordedEvent::Mouse(_) => None,
        }
    }

    pub fn as_mouse(&self) -> Option<&MouseEvent> {
        match self {
            RecordedEvent::Mouse(event) => Some(event),
            RecordedEvent::Key(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ElementGeometry {
    in_view: Point,
    legacy: Point,
}

/// Host double that accepts every event and keeps them in arrival order
/// along with the (tokio) instant they arrived.
#[derive(Debug)]
pub struct RecordingHost {
    viewport: Mutex<Viewport>,
    elements: Mutex<HashMap<String, ElementGeometry>>,
    events: Mutex<Vec<(Instant, RecordedEvent)>>,
    double_click: AtomicBool,
    resets: AtomicUsize,
    fail_next: Mutex<Option<HostError>>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl RecordingHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Mutex::new(viewport),
            elements: Mutex::new(HashMap::new()),
            events: Mutex::new(Vec::new()),
            double_click: AtomicBool::new(false),
            resets: AtomicUsize::new(0),
            fail_next: Mutex::new(None),
        }
    }

    /// Register an element whose centre is the same in both resolution modes.
    pub fn with_element(self, element: impl Into<String>, center: Point) -> Self {
        self.add_element(element, center, center);
        self
    }

    pub fn add_element(&self, element: impl Into<String>, in_view: Point, legacy: Point) {
        self.elements
            .lock()
            .insert(element.into(), ElementGeometry { in_view, legacy });
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        *self.viewport.lock() = viewport;
    }

    /// Report every following press as part of a double click.
    pub fn set_double_click(&self, value: bool) {
        self.double_click.store(value, Ordering::SeqCst);
    }

    /// Times the engine asked to forget the previous click
    pub fn click_resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    /// Reject the next injected event with `error`.
    pub fn fail_next(&self, error: HostError) {
        *self.fail_next.lock() = Some(error);
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn timed_events(&self) -> Vec<(Instant, RecordedEvent)> {
        self.events.lock().clone()
    }

    pub fn key_events(&self) -> Vec<KeyEvent> {
        self.events()
            .iter()
            .filter_map(RecordedEvent::as_key)
            .cloned()
            .collect()
    }

    pub fn mouse_events(&self) -> Vec<MouseEvent> {
        self.events()
            .iter()
            .filter_map(RecordedEvent::as_mouse)
            .cloned()
            .collect()
    }

    /// Coordinates of every mousemove, in order
    pub fn moves(&self) -> Vec<Point> {
        self.mouse_events()
            .iter()
            .filter(|event| event.kind == MouseEventKind::MouseMove)
            .map(|event| Point::new(event.x, event.y))
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn record(&self, event: RecordedEvent) -> Result<(), HostError> {
        if let Some(error) = self.fail_next.lock().take() {
            return Err(error);
        }
        self.events.lock().push((Instant::now(), event));
        Ok(())
    }
}

#[async_trait]
impl InputHost for RecordingHost {
    async fn dispatch_key_event(&self, event: &KeyEvent) -> Result<(), HostError> {
        self.record(RecordedEvent::Key(event.clone()))
    }

    async fn dispatch_mouse_event(&self, event: &MouseEvent) -> Result<(), HostError> {
        self.record(RecordedEvent::Mouse(event.clone()))
    }

    async fn element_center(
        &self,
        element: &ElementRef,
        mode: CenterMode,
    ) -> Result<Point, HostError> {
        let geometry = self
            .elements
            .lock()
            .get(element.as_str())
            .copied()
            .ok_or_else(|| HostError::NoSuchElement(element.to_string()))?;
        Ok(match mode {
            CenterMode::InView => geometry.in_view,
            CenterMode::Legacy => geometry.legacy,
        })
    }

    async fn viewport(&self) -> Result<Viewport, HostError> {
        Ok(*self.viewport.lock())
    }

    fn is_double_click(&self) -> bool {
        self.double_click.load(Ordering::SeqCst)
    }

    fn reset_click(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}
