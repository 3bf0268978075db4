//! Capabilities the engine requires from the rendering host

use async_trait::async_trait;
use wd_actions_core_types::{ElementRef, Point, Viewport};

use crate::errors::HostError;
use crate::types::{CenterMode, KeyEvent, MouseEvent};

/// Rendering surface that receives synthesized input.
///
/// Each injection resolves once the host acknowledged the event; the
/// engine treats that acknowledgement as a suspension point.
#[async_trait]
pub trait InputHost: Send + Sync {
    /// Deliver a keydown, keypress or keyup event
    async fn dispatch_key_event(&self, event: &KeyEvent) -> Result<(), HostError>;

    /// Deliver a mouse event at the event's viewport coordinates
    async fn dispatch_mouse_event(&self, event: &MouseEvent) -> Result<(), HostError>;

    /// Centre point of an element in viewport coordinates
    async fn element_center(&self, element: &ElementRef, mode: CenterMode)
        -> Result<Point, HostError>;

    /// Current inner width and height of the viewport
    async fn viewport(&self) -> Result<Viewport, HostError>;

    /// Whether the next press completes a double click. Timing heuristics
    /// belong to the host.
    fn is_double_click(&self) -> bool {
        false
    }

    /// Forget the previous click so the next one is not a double click
    fn reset_click(&self) {}
}
