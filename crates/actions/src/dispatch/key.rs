//! keyDown / keyUp handlers

use tracing::trace;

use super::{key_state_mut, DispatchCtx};
use crate::errors::ActionResult;
use crate::keys::{key_data, modifier_for, normalize, shifted_key};
use crate::model::Action;
use crate::state::PressToken;
use crate::types::{KeyEvent, KeyEventKind};

/// Press a key. Always injects; `repeat` is set when the key was already held.
pub(super) async fn key_down(ctx: &DispatchCtx<'_>, action: &Action, value: &str) -> ActionResult<()> {
    let normalized = normalize(value);

    let (event, printable) = {
        let mut state = ctx.state.lock();
        let shift = key_state_mut(&mut state.store, &action.id)?.modifiers.shift;
        let lookup = if shift {
            shifted_key(value)
        } else {
            value.to_string()
        };
        let data = key_data(&lookup);

        let newly_pressed = state
            .store
            .press(&action.id, &PressToken::Key(normalized.clone()))?;
        let key_state = key_state_mut(&mut state.store, &action.id)?;
        if let Some(modifier) = modifier_for(&normalized) {
            key_state.modifiers.set(modifier, true);
        }

        let mut event = KeyEvent::new(KeyEventKind::KeyDown, &data, key_state.modifiers);
        event.repeat = !newly_pressed;

        if let Some(inverse) = action.inverse() {
            state.pending.push(inverse);
        }
        (event, data.printable)
    };

    ctx.host.dispatch_key_event(&event).await?;

    let modifiers = event.modifiers;
    if printable && !(modifiers.ctrl || modifiers.alt || modifiers.meta) {
        ctx.host
            .dispatch_key_event(&event.with_kind(KeyEventKind::KeyPress))
            .await?;
    }
    Ok(())
}

/// Release a key. Resolves without injecting when the key is not held.
pub(super) async fn key_up(ctx: &DispatchCtx<'_>, action: &Action, value: &str) -> ActionResult<()> {
    let normalized = normalize(value);

    let event = {
        let mut state = ctx.state.lock();
        let key_state = key_state_mut(&mut state.store, &action.id)?;
        if !key_state.is_pressed(&normalized) {
            trace!(source = %action.id, key = %normalized, "key not pressed; skipping keyUp");
            return Ok(());
        }

        let lookup = if key_state.modifiers.shift {
            shifted_key(value)
        } else {
            value.to_string()
        };
        let data = key_data(&lookup);

        if let Some(modifier) = modifier_for(&normalized) {
            key_state.modifiers.set(modifier, false);
        }
        state
            .store
            .release(&action.id, &PressToken::Key(normalized.clone()))?;
        let modifiers = key_state_mut(&mut state.store, &action.id)?.modifiers;
        KeyEvent::new(KeyEventKind::KeyUp, &data, modifiers)
    };

    if let Err(err) = ctx.host.dispatch_key_event(&event).await {
        // the host never saw the release; keep the key held so a retry injects it
        let mut state = ctx.state.lock();
        state
            .store
            .press(&action.id, &PressToken::Key(normalized.clone()))?;
        if let Some(modifier) = modifier_for(&normalized) {
            key_state_mut(&mut state.store, &action.id)?.modifiers.set(modifier, true);
        }
        return Err(err.into());
    }
    Ok(())
}
