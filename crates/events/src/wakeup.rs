//! Advisory wake-up bridge between publishers and the outbox worker.
//!
//! A successful fire-and-forget publish nudges the worker to poll now
//! instead of waiting out its interval. The bridge is purely an optimization:
//! nudges are dropped when the channel is full or the worker is gone, and
//! the scheduled poll remains the correctness backstop.

use tokio::sync::mpsc;

/// Pending nudges beyond this are redundant — one queued nudge already
/// guarantees a prompt poll.
const WAKEUP_CAPACITY: usize = 16;

/// Create a connected sender/receiver pair.
pub fn channel() -> (WakeupSender, WakeupReceiver) {
    let (tx, rx) = mpsc::channel(WAKEUP_CAPACITY);
    (WakeupSender { tx }, WakeupReceiver { rx })
}

/// Publisher-side handle. Cheap to clone.
#[derive(Clone)]
pub struct WakeupSender {
    tx: mpsc::Sender<()>,
}

impl WakeupSender {
    /// Best-effort nudge. Never blocks, never fails the caller.
    pub fn nudge(&self) {
        if let Err(e) = self.tx.try_send(()) {
            tracing::debug!(reason = %e, "Wake-up nudge dropped, scheduled poll will cover it");
        }
    }
}

/// Worker-side handle.
pub struct WakeupReceiver {
    rx: mpsc::Receiver<()>,
}

impl WakeupReceiver {
    /// Wait for the next nudge. `None` means every sender is gone.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn nudge_reaches_the_receiver() {
        let (tx, mut rx) = channel();
        tx.nudge();
        assert_eq!(rx.recv().await, Some(()));
    }

    #[test]
    fn nudge_on_a_full_channel_is_dropped_silently() {
        let (tx, _rx) = channel();
        for _ in 0..WAKEUP_CAPACITY * 2 {
            tx.nudge();
        }
    }

    #[test]
    fn nudge_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = channel();
        drop(rx);
        tx.nudge();
    }
}
