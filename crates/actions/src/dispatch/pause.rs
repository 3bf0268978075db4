use std::time::Duration;

use tokio::time::sleep;

use crate::errors::ActionResult;

/// Wait `duration_ms` milliseconds; zero resolves immediately.
pub(super) async fn pause(duration_ms: u64) -> ActionResult<()> {
    if duration_ms > 0 {
        sleep(Duration::from_millis(duration_ms)).await;
    }
    Ok(())
}
