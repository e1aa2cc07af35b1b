//! Fire command channel — the single-producer/single-consumer bridge between
//! the controller thread and the range tick.
//!
//! Unlike the broadcast bus, this path guarantees FIFO order and exactly-once
//! execution: the controller enqueues one `FireCommand` per trigger rising
//! edge, and the range actor drains the whole queue once per tick. Enqueue
//! never blocks. After `close()` further enqueues fail with `ChannelClosed`
//! instead of being silently accepted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

/// One shot to execute. Carries no payload; ordering is the payload.
#[derive(Debug)]
pub struct FireCommand;

/// Error from `CommandSender::enqueue()` after shutdown.
#[derive(Debug, PartialEq, Eq)]
pub struct ChannelClosed;

impl std::fmt::Display for ChannelClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "command channel closed")
    }
}

/// Create a connected sender/drain pair.
pub fn command_channel() -> (CommandSender, CommandDrain) {
    let (tx, rx) = mpsc::channel();
    let closed = Arc::new(AtomicBool::new(false));
    (
        CommandSender {
            inner: tx,
            closed: Arc::clone(&closed),
        },
        CommandDrain { inner: rx, closed },
    )
}

// ---------------------------------------------------------------------------
// CommandSender — producer half, owned by the controller actor
// ---------------------------------------------------------------------------

pub struct CommandSender {
    inner: mpsc::Sender<FireCommand>,
    closed: Arc<AtomicBool>,
}

impl CommandSender {
    /// Queue a command for the next tick. Never blocks; the queue is
    /// unbounded. Fails fast once the channel is closed or the drain half
    /// is gone.
    pub fn enqueue(&self, cmd: FireCommand) -> Result<(), ChannelClosed> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(ChannelClosed);
        }
        self.inner.send(cmd).map_err(|_| ChannelClosed)
    }

    /// Mark the channel closed. Subsequent enqueues fail with
    /// `ChannelClosed`; commands already queued stay drainable.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }
}

impl Clone for CommandSender {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            closed: Arc::clone(&self.closed),
        }
    }
}

// ---------------------------------------------------------------------------
// CommandDrain — consumer half, owned by the range actor
// ---------------------------------------------------------------------------

pub struct CommandDrain {
    inner: mpsc::Receiver<FireCommand>,
    closed: Arc<AtomicBool>,
}

impl CommandDrain {
    /// Take everything currently queued, in enqueue order, leaving the
    /// queue empty. Called once per tick; never blocks.
    pub fn drain_all(&mut self) -> Vec<FireCommand> {
        let mut drained = Vec::new();
        while let Ok(cmd) = self.inner.try_recv() {
            drained.push(cmd);
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_fifo_order_and_leaves_queue_empty() {
        let (tx, mut rx) = command_channel();
        tx.enqueue(FireCommand).unwrap();
        tx.enqueue(FireCommand).unwrap();
        tx.enqueue(FireCommand).unwrap();

        assert_eq!(rx.drain_all().len(), 3);
        assert!(rx.drain_all().is_empty());
    }

    #[test]
    fn enqueue_after_close_fails() {
        let (tx, mut rx) = command_channel();
        tx.enqueue(FireCommand).unwrap();
        tx.close();

        assert_eq!(tx.enqueue(FireCommand), Err(ChannelClosed));
        // The command queued before close is still delivered.
        assert_eq!(rx.drain_all().len(), 1);
    }

    #[test]
    fn enqueue_after_drain_dropped_fails() {
        let (tx, rx) = command_channel();
        drop(rx);
        assert_eq!(tx.enqueue(FireCommand), Err(ChannelClosed));
    }

    #[test]
    fn commands_cross_threads_in_order() {
        let (tx, mut rx) = command_channel();
        let producer = std::thread::spawn(move || {
            for _ in 0..100 {
                tx.enqueue(FireCommand).unwrap();
            }
        });
        producer.join().unwrap();

        assert_eq!(rx.drain_all().len(), 100);
    }
}
