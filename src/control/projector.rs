//! Status projector — mirrors the pipeline's status channel into the shared
//! state.
//!
//! [`StatusProjector::subscribe`] opens one receiver on the pipeline's status
//! channel and spawns a task that maps every raw token to its display label.
//! The returned [`StatusSubscription`] owns that task: call
//! [`StatusSubscription::unsubscribe`] on shutdown (or just drop it) and no
//! further event reaches the state.
//!
//! The projector and the resolver never wait on each other.  Each writes the
//! status line when its own event happens; the later write wins.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::pipeline::{PipelineController, StatusToken, STATUS_CHANNEL};

use super::state::{lock_state, DisplayStatus, SharedState};

// ---------------------------------------------------------------------------
// StatusProjector
// ---------------------------------------------------------------------------

/// Maps pipeline status tokens onto [`SharedState`].
pub struct StatusProjector;

impl StatusProjector {
    /// Subscribe to `pipeline`'s status channel for the lifetime of the
    /// returned handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe(state: SharedState, pipeline: &dyn PipelineController) -> StatusSubscription {
        Self::attach(state, pipeline.subscribe_status())
    }

    /// Drive `state` from an already-open receiver.
    pub fn attach(state: SharedState, rx: broadcast::Receiver<String>) -> StatusSubscription {
        log::info!("projector: subscribed to {STATUS_CHANNEL}");
        StatusSubscription {
            task: Some(tokio::spawn(project(state, rx))),
        }
    }

    /// Record one raw token: remember it and show its label.
    ///
    /// The active flag is not touched; only start/stop commands change it.
    pub fn apply(state: &SharedState, raw: &str) -> StatusToken {
        let token = StatusToken::parse(raw);
        if let StatusToken::Other(raw) = &token {
            log::debug!("projector: unrecognised status {raw:?}, shown verbatim");
        }

        let mut st = lock_state(state);
        st.last_event = Some(token.clone());
        st.display = DisplayStatus::Status(token.clone());
        token
    }
}

async fn project(state: SharedState, mut rx: broadcast::Receiver<String>) {
    loop {
        match rx.recv().await {
            Ok(raw) => {
                StatusProjector::apply(&state, &raw);
            }
            Err(RecvError::Lagged(skipped)) => {
                // Older tokens are gone; the next one received is the newest.
                log::warn!("projector: lagged, {skipped} status events skipped");
            }
            Err(RecvError::Closed) => {
                log::info!("projector: {STATUS_CHANNEL} closed");
                break;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// StatusSubscription
// ---------------------------------------------------------------------------

/// Handle to a running status subscription.
///
/// Dropping the handle aborts the projector task, so no event is applied
/// after teardown.  [`unsubscribe`](Self::unsubscribe) additionally waits
/// until the task, and with it the channel receiver, is gone.
#[derive(Debug)]
pub struct StatusSubscription {
    task: Option<JoinHandle<()>>,
}

impl StatusSubscription {
    /// `false` once the channel has closed or the subscription was released.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop projecting and release the receiver.
    ///
    /// Consumes the handle, so it can only happen once.
    pub async fn unsubscribe(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // A cancelled join error is the expected outcome here.
            let _ = task.await;
            log::info!("projector: unsubscribed from {STATUS_CHANNEL}");
        }
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::control::state::new_shared_state;
    use crate::pipeline::StatusBroadcaster;

    /// Poll `check` until it holds, failing after one second.
    async fn eventually(state: &SharedState, check: impl Fn(&crate::control::ControlState) -> bool) {
        let wait = async {
            while !check(&*lock_state(state)) {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(1), wait)
            .await
            .expect("state did not reach expected value");
    }

    #[test]
    fn apply_maps_known_tokens() {
        let state = new_shared_state();
        for (raw, label) in [
            ("listening", "Listening..."),
            ("processing", "Processing..."),
            ("speaking", "Speaking..."),
            ("stopped", "Stopped"),
        ] {
            StatusProjector::apply(&state, raw);
            assert_eq!(lock_state(&state).display.text(), label);
        }
    }

    #[test]
    fn apply_shows_unknown_token_verbatim() {
        let state = new_shared_state();
        let token = StatusProjector::apply(&state, "reloading-model");

        assert_eq!(token, StatusToken::Other("reloading-model".into()));
        let st = lock_state(&state);
        assert_eq!(st.display.text(), "reloading-model");
        assert_eq!(st.last_event, Some(token));
    }

    #[test]
    fn apply_does_not_touch_active_flag() {
        let state = new_shared_state();
        lock_state(&state).is_active = true;

        StatusProjector::apply(&state, "stopped");

        let st = lock_state(&state);
        assert!(st.is_active);
        assert_eq!(st.display.text(), "Stopped");
    }

    #[test]
    fn event_replaces_error_display() {
        let state = new_shared_state();
        lock_state(&state).display = DisplayStatus::Error("device busy".into());

        StatusProjector::apply(&state, "listening");
        assert_eq!(lock_state(&state).display.text(), "Listening...");
    }

    #[tokio::test]
    async fn events_are_projected_in_order() {
        let bus = StatusBroadcaster::new();
        let state = new_shared_state();
        let sub = StatusProjector::attach(state.clone(), bus.subscribe());

        bus.emit(&StatusToken::Listening);
        bus.emit(&StatusToken::Processing);
        bus.emit(&StatusToken::Speaking);

        eventually(&state, |st| st.last_event == Some(StatusToken::Speaking)).await;
        assert_eq!(lock_state(&state).display.text(), "Speaking...");
        sub.unsubscribe().await;
    }

    #[tokio::test]
    async fn late_event_after_unsubscribe_has_no_effect() {
        let bus = StatusBroadcaster::new();
        let state = new_shared_state();
        let sub = StatusProjector::attach(state.clone(), bus.subscribe());

        bus.emit(&StatusToken::Listening);
        eventually(&state, |st| st.last_event.is_some()).await;

        sub.unsubscribe().await;
        assert_eq!(bus.subscriber_count(), 0);

        bus.emit(&StatusToken::Speaking);
        tokio::time::sleep(Duration::from_millis(10)).await;

        let st = lock_state(&state);
        assert_eq!(st.last_event, Some(StatusToken::Listening));
        assert_eq!(st.display.text(), "Listening...");
    }

    #[tokio::test]
    async fn dropped_subscription_stops_projecting() {
        let bus = StatusBroadcaster::new();
        let state = new_shared_state();
        let sub = StatusProjector::attach(state.clone(), bus.subscribe());
        drop(sub);

        // Let the runtime reap the aborted task.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(bus.subscriber_count(), 0);

        bus.emit(&StatusToken::Processing);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(lock_state(&state).last_event.is_none());
    }

    #[tokio::test]
    async fn closed_channel_ends_subscription() {
        let bus = StatusBroadcaster::new();
        let state = new_shared_state();
        let sub = StatusProjector::attach(state.clone(), bus.subscribe());
        assert!(sub.is_active());

        drop(bus);
        let wait = async {
            while sub.is_active() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(1), wait)
            .await
            .expect("subscription should end when the channel closes");
    }
}
