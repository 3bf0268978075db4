//! Tick scheduler
//!
//! Ticks run strictly one after another. Inside a tick every action is
//! started at once and the tick completes when all of them have settled.

use futures::future::join_all;
use tracing::debug;

use crate::dispatch::{dispatch_action, DispatchCtx};
use crate::errors::ActionResult;
use crate::model::{Action, ActionKind, Chain, SourceType};

/// Longest explicit duration among the tick's pauses and pointer moves,
/// or 0 when none carries one.
pub fn tick_duration(tick: &[Action]) -> u64 {
    tick.iter()
        .filter(|action| match action.kind {
            ActionKind::Pause { .. } => true,
            ActionKind::PointerMove { .. } => action.source == SourceType::Pointer,
            _ => false,
        })
        .filter_map(Action::duration)
        .max()
        .unwrap_or(0)
}

/// Run every action of one tick concurrently. All actions settle before
/// the first error, in tick order, is reported.
pub(crate) async fn dispatch_tick(
    ctx: &DispatchCtx<'_>,
    tick: &[Action],
    tick_duration: u64,
) -> ActionResult<()> {
    let outcomes = join_all(
        tick.iter()
            .map(|action| dispatch_action(ctx, action, tick_duration)),
    )
    .await;
    outcomes.into_iter().collect::<ActionResult<Vec<()>>>()?;
    Ok(())
}

/// Run the chain tick by tick, stopping at the first failing tick.
pub(crate) async fn dispatch_chain(ctx: &DispatchCtx<'_>, chain: &Chain) -> ActionResult<()> {
    for (index, tick) in chain.iter().enumerate() {
        let duration = tick_duration(tick);
        debug!(tick = index, actions = tick.len(), duration_ms = duration, "dispatching tick");
        dispatch_tick(ctx, tick, duration).await?;
    }
    Ok(())
}
