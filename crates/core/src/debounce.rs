use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Input that has stopped changing for the quiet period, or that is too
/// short to search and settled straight away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledInput {
    pub seq: u64,
    pub text: String,
    pub searchable: bool,
}

/// Owned timer; aborts the sleeping task when dropped.
#[derive(Debug)]
struct TimerHandle(JoinHandle<()>);

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Holds back query text until typing pauses. Must be driven from inside a
/// tokio runtime because each input arms a timer task.
#[derive(Debug)]
pub struct QueryDebouncer {
    quiet_period: Duration,
    min_chars: usize,
    seq: u64,
    pending: Option<TimerHandle>,
    settled_tx: mpsc::UnboundedSender<SettledInput>,
}

impl QueryDebouncer {
    pub fn new(
        quiet_period: Duration,
        min_chars: usize,
    ) -> (Self, mpsc::UnboundedReceiver<SettledInput>) {
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        (
            Self {
                quiet_period,
                min_chars,
                seq: 0,
                pending: None,
                settled_tx,
            },
            settled_rx,
        )
    }

    pub fn push(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.seq += 1;
        // Dropping the previous handle cancels its timer.
        self.pending = None;

        let trimmed_len = text.trim().chars().count();
        if trimmed_len == 0 || trimmed_len < self.min_chars {
            debug!(seq = self.seq, "input below minimum length, settling immediately");
            let _ = self.settled_tx.send(SettledInput {
                seq: self.seq,
                text,
                searchable: false,
            });
            return;
        }

        let settled = SettledInput {
            seq: self.seq,
            text,
            searchable: true,
        };
        let tx = self.settled_tx.clone();
        let quiet_period = self.quiet_period;
        self.pending = Some(TimerHandle(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            let _ = tx.send(settled);
        })));
    }

    /// True if `seq` belongs to the most recent input. A timer that fired
    /// just before being replaced can leave an older value in the channel.
    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.seq
    }

    pub fn current_seq(&self) -> u64 {
        self.seq
    }

    pub fn has_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|timer| !timer.0.is_finished())
    }

    /// Cancels any armed timer; nothing is emitted afterwards until the
    /// next `push`.
    pub fn stop(&mut self) {
        self.seq += 1;
        self.pending = None;
    }
}
