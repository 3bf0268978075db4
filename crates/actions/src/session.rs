//! Session-scoped entry points of the engine

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info_span, warn, Instrument};
use wd_actions_core_types::{InputSourceId, SessionId};

use crate::config::ActionsConfig;
use crate::dispatch::{dispatch_action, DispatchCtx, SessionState};
use crate::errors::ActionResult;
use crate::host::InputHost;
use crate::model::{Action, Chain, SourceType};
use crate::scheduler;
use crate::state::{InputState, SourceKind};
use crate::types::CenterMode;
use crate::validate;

/// One WebDriver session's view of its input devices.
///
/// Owns the input state store and the pending-cancellation list; both
/// persist across `dispatch` calls until [`ActionSession::reset_input_state`].
/// Concurrent `dispatch` calls on the same session are not serialized.
#[derive(Debug)]
pub struct ActionSession {
    id: SessionId,
    config: ActionsConfig,
    state: Mutex<SessionState>,
}

impl ActionSession {
    pub fn new(config: ActionsConfig) -> Self {
        Self {
            id: SessionId::new(),
            config: config.normalized(),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ActionsConfig::from_env())
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn config(&self) -> &ActionsConfig {
        &self.config
    }

    /// Validate a payload and register the input sources it introduces.
    /// Nothing is registered when validation fails.
    pub fn parse_chain(&self, payload: &Value) -> ActionResult<Chain> {
        let mut state = self.state.lock();
        let validated = validate::parse_chain(payload, &state.store)?;
        validated.commit(&mut state.store)
    }

    /// Validate and perform an action chain, resolving element origins with
    /// the configured centre mode.
    pub async fn dispatch(&self, payload: &Value, host: &dyn InputHost) -> ActionResult<()> {
        self.dispatch_with(payload, host, self.config.center_mode())
            .await
    }

    pub async fn dispatch_with(
        &self,
        payload: &Value,
        host: &dyn InputHost,
        center_mode: CenterMode,
    ) -> ActionResult<()> {
        let chain = self.parse_chain(payload)?;
        self.dispatch_chain(&chain, host, center_mode).await
    }

    /// Perform a chain that was validated already. Sources it names are
    /// registered on first use.
    pub async fn dispatch_chain(
        &self,
        chain: &Chain,
        host: &dyn InputHost,
        center_mode: CenterMode,
    ) -> ActionResult<()> {
        {
            let mut state = self.state.lock();
            for action in chain.iter().flatten() {
                state
                    .store
                    .ensure(&action.id, InputState::for_kind(source_kind(action)))?;
            }
        }

        let span = info_span!(
            "actions.dispatch",
            session = %self.id,
            ticks = chain.len(),
            center_mode = ?center_mode,
        );
        let ctx = self.ctx(host, center_mode);
        async {
            let outcome = scheduler::dispatch_chain(&ctx, chain).await;
            if let Err(err) = &outcome {
                warn!(code = err.code(), error = %err, "action chain failed");
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Replay the inverse of every press recorded so far, in the order the
    /// presses happened, then empty the list. Entries not replayed because
    /// of an error stay pending.
    pub async fn release_pending_actions(&self, host: &dyn InputHost) -> ActionResult<()> {
        let entries = self.state.lock().pending.take();
        if entries.is_empty() {
            return Ok(());
        }

        let span = info_span!("actions.release", session = %self.id, pending = entries.len());
        let ctx = self.ctx(host, self.config.center_mode());
        async {
            for (index, action) in entries.iter().enumerate() {
                if let Err(err) = dispatch_action(&ctx, action, 0).await {
                    warn!(action = %action, error = %err, "release interrupted");
                    self.state.lock().pending.restore(entries[index..].to_vec());
                    return Err(err);
                }
            }
            debug!("released pending actions");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Forget every input source and pending cancellation.
    pub fn reset_input_state(&self) {
        let mut state = self.state.lock();
        state.store.clear();
        state.pending.clear();
        debug!(session = %self.id, "input state reset");
    }

    /// Snapshot of one input source's state
    pub fn input_state(&self, id: &InputSourceId) -> Option<InputState> {
        self.state.lock().store.get(id).cloned()
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn pending_actions(&self) -> Vec<Action> {
        self.state.lock().pending.entries().to_vec()
    }

    fn ctx<'a>(&'a self, host: &'a dyn InputHost, center_mode: CenterMode) -> DispatchCtx<'a> {
        DispatchCtx {
            state: &self.state,
            host,
            config: &self.config,
            center_mode,
        }
    }
}

impl Default for ActionSession {
    fn default() -> Self {
        Self::new(ActionsConfig::default())
    }
}

fn source_kind(action: &Action) -> SourceKind {
    match action.source {
        SourceType::None => SourceKind::None,
        SourceType::Key => SourceKind::Key,
        SourceType::Pointer => SourceKind::Pointer(action.pointer_type.unwrap_or_default()),
    }
}
