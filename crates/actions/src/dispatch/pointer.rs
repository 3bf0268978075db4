//! pointerDown / pointerUp / pointerMove handlers

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, trace};
use wd_actions_core_types::{InputSourceId, Point};

use super::{mouse_state_mut, DispatchCtx};
use crate::errors::{ActionError, ActionResult};
use crate::model::{Action, PointerOrigin};
use crate::state::PressToken;
use crate::types::{MouseEvent, MouseEventKind, Platform};

const SECONDARY_BUTTON: u32 = 2;

/// Press a mouse button at the current pointer position.
pub(super) async fn pointer_down(
    ctx: &DispatchCtx<'_>,
    action: &Action,
    button: u32,
) -> ActionResult<()> {
    let mut event = {
        let mut state = ctx.state.lock();
        mouse_state_mut(&mut state.store, &action.id)?;
        if !state.store.press(&action.id, &PressToken::Button(button))? {
            trace!(source = %action.id, button, "button already pressed; skipping pointerDown");
            return Ok(());
        }
        if let Some(inverse) = action.inverse() {
            state.pending.push(inverse);
        }
        let modifiers = state.store.global_modifiers();
        let pointer = mouse_state_mut(&mut state.store, &action.id)?;
        let mut event = MouseEvent::new(
            MouseEventKind::MouseDown,
            pointer.position.x,
            pointer.position.y,
            modifiers,
        );
        event.button = button;
        event.buttons = pointer.buttons_mask();
        event
    };

    event.click_count = 1;
    let mac_context_click = event.modifiers.ctrl && ctx.config.platform == Platform::Mac;
    if event.modifiers.ctrl {
        if mac_context_click {
            event.button = SECONDARY_BUTTON;
            ctx.host.reset_click();
        }
    } else if ctx.host.is_double_click() {
        event.click_count = 2;
    }

    ctx.host.dispatch_mouse_event(&event).await?;

    if button == SECONDARY_BUTTON || mac_context_click {
        let context_menu = MouseEvent {
            kind: MouseEventKind::ContextMenu,
            ..event.clone()
        };
        ctx.host.dispatch_mouse_event(&context_menu).await?;
    }
    Ok(())
}

/// Release a mouse button. Resolves without injecting when it is not held.
pub(super) async fn pointer_up(
    ctx: &DispatchCtx<'_>,
    action: &Action,
    button: u32,
) -> ActionResult<()> {
    let mut event = {
        let mut state = ctx.state.lock();
        mouse_state_mut(&mut state.store, &action.id)?;
        if !state.store.release(&action.id, &PressToken::Button(button))? {
            trace!(source = %action.id, button, "button not pressed; skipping pointerUp");
            return Ok(());
        }
        let modifiers = state.store.global_modifiers();
        let pointer = mouse_state_mut(&mut state.store, &action.id)?;
        let mut event = MouseEvent::new(
            MouseEventKind::MouseUp,
            pointer.position.x,
            pointer.position.y,
            modifiers,
        );
        event.button = button;
        event.buttons = pointer.buttons_mask();
        event
    };

    event.click_count = if ctx.host.is_double_click() { 2 } else { 1 };
    if let Err(err) = ctx.host.dispatch_mouse_event(&event).await {
        // the host never saw the release; keep the button held so a retry injects it
        let mut state = ctx.state.lock();
        state.store.press(&action.id, &PressToken::Button(button))?;
        return Err(err.into());
    }
    Ok(())
}

/// Move the pointer to `offset` relative to `origin`, interpolating over
/// `duration` milliseconds.
pub(super) async fn pointer_move(
    ctx: &DispatchCtx<'_>,
    action: &Action,
    origin: &PointerOrigin,
    offset: (i64, i64),
    duration: u64,
) -> ActionResult<()> {
    let started = Instant::now();
    let start = {
        let mut state = ctx.state.lock();
        let position = mouse_state_mut(&mut state.store, &action.id)?.position;
        position
    };

    let base = match origin {
        PointerOrigin::Viewport => Point::ORIGIN,
        PointerOrigin::Pointer => start,
        PointerOrigin::Element(element) => {
            ctx.host.element_center(element, ctx.center_mode).await?
        }
    };
    let viewport = ctx.host.viewport().await?;
    let Some(target) = base.offset(offset.0, offset.1) else {
        return Err(ActionError::MoveTargetOutOfBounds(format!(
            "{base} offset by ({}, {}) overflows the coordinate space",
            offset.0, offset.1
        )));
    };
    if !viewport.contains(target) {
        return Err(ActionError::MoveTargetOutOfBounds(format!(
            "{target} is out of bounds of viewport width ({}) and height ({})",
            viewport.width, viewport.height
        )));
    }

    if duration == 0 {
        return perform_one_move(ctx, &action.id, target).await;
    }

    let interval_ms = ctx.config.sample_interval_ms;
    let interval = Duration::from_millis(interval_ms);
    let epsilon = interval_ms as f64 / duration as f64 / 10.0;
    debug!(source = %action.id, %start, %target, duration, "interpolating pointer move");

    sleep(interval).await;
    let mut ratio = elapsed_ratio(started, duration);
    while 1.0 - ratio > epsilon {
        perform_one_move(ctx, &action.id, interpolate(start, target, ratio)).await?;
        sleep(interval).await;
        ratio = elapsed_ratio(started, duration);
    }

    perform_one_move(ctx, &action.id, target).await
}

fn elapsed_ratio(started: Instant, duration: u64) -> f64 {
    started.elapsed().as_millis() as f64 / duration as f64
}

/// Point at `ratio` along the line from `start` to `target`, floored to
/// integer coordinates.
pub fn interpolate(start: Point, target: Point, ratio: f64) -> Point {
    let x = (ratio * (target.x - start.x) as f64 + start.x as f64).floor() as i64;
    let y = (ratio * (target.y - start.y) as f64 + start.y as f64).floor() as i64;
    Point::new(x, y)
}

async fn perform_one_move(
    ctx: &DispatchCtx<'_>,
    id: &InputSourceId,
    target: Point,
) -> ActionResult<()> {
    let event = {
        let mut state = ctx.state.lock();
        let modifiers = state.store.global_modifiers();
        let pointer = mouse_state_mut(&mut state.store, id)?;
        if pointer.position == target {
            return Ok(());
        }
        let mut event = MouseEvent::new(MouseEventKind::MouseMove, target.x, target.y, modifiers);
        event.buttons = pointer.buttons_mask();
        event
    };

    ctx.host.dispatch_mouse_event(&event).await?;

    let mut state = ctx.state.lock();
    mouse_state_mut(&mut state.store, id)?.position = target;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn interpolation_floors_towards_negative_infinity() {
        let start = Point::new(0, 0);
        let target = Point::new(-10, 7);
        assert_eq!(interpolate(start, target, 0.25), Point::new(-3, 1));
        assert_eq!(interpolate(start, target, 1.0), target);
    }

    proptest! {
        #[test]
        fn interpolation_stays_within_the_segment(
            sx in -2000i64..2000, sy in -2000i64..2000,
            tx in -2000i64..2000, ty in -2000i64..2000,
            ratio in 0.0f64..=1.0,
        ) {
            let p = interpolate(Point::new(sx, sy), Point::new(tx, ty), ratio);
            prop_assert!(p.x >= sx.min(tx) && p.x <= sx.max(tx));
            prop_assert!(p.y >= sy.min(ty) && p.y <= sy.max(ty));
        }

        #[test]
        fn interpolation_is_monotonic_in_ratio(
            tx in 0i64..3000, ty in 0i64..3000,
            a in 0.0f64..=1.0, b in 0.0f64..=1.0,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let start = Point::new(0, 0);
            let target = Point::new(tx, ty);
            let p = interpolate(start, target, lo);
            let q = interpolate(start, target, hi);
            prop_assert!(p.x <= q.x && p.y <= q.y);
        }
    }
}
