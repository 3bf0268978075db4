//! Event synthesis, one handler per action subtype
//!
//! Handlers read and write the session's input state only between
//! suspension points: the state lock is never held across an `.await`.

mod key;
mod pause;
mod pointer;

pub use pointer::interpolate;

use parking_lot::Mutex;
use tracing::debug;
use wd_actions_core_types::InputSourceId;

use crate::config::ActionsConfig;
use crate::errors::{ActionError, ActionResult};
use crate::host::InputHost;
use crate::model::{Action, ActionKind};
use crate::pending::PendingCancellations;
use crate::state::{InputState, InputStateStore, KeyState, PointerState, PointerType, SourceKind};
use crate::types::CenterMode;

/// Mutable state shared by every dispatch call of one session
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub store: InputStateStore,
    pub pending: PendingCancellations,
}

/// Everything a handler needs for one dispatch call
pub(crate) struct DispatchCtx<'a> {
    pub state: &'a Mutex<SessionState>,
    pub host: &'a dyn InputHost,
    pub config: &'a ActionsConfig,
    pub center_mode: CenterMode,
}

/// Dispatch one action. `tick_duration` is the fallback for pauses and
/// pointer moves that carry no duration of their own.
pub(crate) async fn dispatch_action(
    ctx: &DispatchCtx<'_>,
    action: &Action,
    tick_duration: u64,
) -> ActionResult<()> {
    debug!(
        source = %action.id,
        subtype = %action.subtype(),
        tick_duration,
        "dispatching action"
    );

    match &action.kind {
        ActionKind::KeyDown { value } => key::key_down(ctx, action, value).await,
        ActionKind::KeyUp { value } => key::key_up(ctx, action, value).await,
        ActionKind::PointerDown { button } => pointer::pointer_down(ctx, action, *button).await,
        ActionKind::PointerUp { button } => pointer::pointer_up(ctx, action, *button).await,
        ActionKind::PointerMove {
            duration,
            origin,
            x,
            y,
        } => {
            let duration = duration.unwrap_or(tick_duration);
            pointer::pointer_move(ctx, action, origin, (*x, *y), duration).await
        }
        ActionKind::PointerCancel => Err(ActionError::unsupported(
            "pointerCancel is not supported",
        )),
        ActionKind::Pause { duration } => pause::pause(duration.unwrap_or(tick_duration)).await,
    }
}

pub(crate) fn key_state_mut<'s>(
    store: &'s mut InputStateStore,
    id: &InputSourceId,
) -> ActionResult<&'s mut KeyState> {
    match store.get_mut(id) {
        Some(InputState::Key(state)) => Ok(state),
        Some(other) => Err(ActionError::invalid(format!(
            "Expected {id} to be a key input source, got {}",
            other.kind()
        ))),
        None => Err(ActionError::invalid(format!("Unknown input source {id}"))),
    }
}

/// Pointer state of `id`, provided it is a mouse.
pub(crate) fn mouse_state_mut<'s>(
    store: &'s mut InputStateStore,
    id: &InputSourceId,
) -> ActionResult<&'s mut PointerState> {
    match store.get(id).map(InputState::kind) {
        Some(SourceKind::Pointer(PointerType::Mouse)) => match store.get_mut(id) {
            Some(InputState::Pointer(state)) => Ok(state),
            _ => Err(ActionError::invalid(format!("Unknown input source {id}"))),
        },
        Some(SourceKind::Pointer(_)) => Err(ActionError::unsupported(
            "Only 'mouse' pointer type is supported",
        )),
        Some(other) => Err(ActionError::invalid(format!(
            "Expected {id} to be a pointer input source, got {other}"
        ))),
        None => Err(ActionError::invalid(format!("Unknown input source {id}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wd_actions_core_types::Point;

    fn store_with(id: &str, kind: SourceKind) -> InputStateStore {
        let mut store = InputStateStore::default();
        store
            .ensure(&InputSourceId::new(id), InputState::for_kind(kind))
            .unwrap();
        store
    }

    #[test]
    fn mouse_state_is_writable_for_mouse_sources() {
        let id = InputSourceId::new("mouse");
        let mut store = store_with("mouse", SourceKind::Pointer(PointerType::Mouse));
        mouse_state_mut(&mut store, &id).unwrap().position = Point::new(4, 2);
        let pointer = store.get(&id).and_then(InputState::as_pointer).unwrap();
        assert_eq!(pointer.position, Point::new(4, 2));
    }

    #[test]
    fn mouse_state_rejects_other_sources() {
        let pen = InputSourceId::new("pen");
        let mut store = store_with("pen", SourceKind::Pointer(PointerType::Pen));
        assert!(matches!(
            mouse_state_mut(&mut store, &pen),
            Err(ActionError::UnsupportedOperation(_))
        ));

        let kbd = InputSourceId::new("kbd");
        let mut store = store_with("kbd", SourceKind::Key);
        assert!(matches!(
            mouse_state_mut(&mut store, &kbd),
            Err(ActionError::InvalidArgument(_))
        ));
        assert!(matches!(
            mouse_state_mut(&mut store, &InputSourceId::new("missing")),
            Err(ActionError::InvalidArgument(_))
        ));
    }
}
