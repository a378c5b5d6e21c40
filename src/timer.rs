//! Single-shot cancellable timer used to restore the live video after a capture
//!
//! Arming always cancels the previous arm first. A fired task must `claim`
//! its ticket before acting; a ticket that was superseded or cancelled is
//! rejected even when its sleep already elapsed. The owner keeps the timer
//! behind the same lock as the state the action mutates, so cancellation and
//! claiming are serialized.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Delay between a capture and the return of the live video
pub const REVERSION_DELAY: Duration = Duration::from_millis(900);

/// Identifies one arm of a `ReversionTimer`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTicket(u64);

#[derive(Debug)]
pub struct ReversionTimer {
    runtime: Handle,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl ReversionTimer {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            generation: 0,
            task: None,
        }
    }

    /// Schedule `on_fire` after `delay`, replacing any pending arm
    pub fn arm<F>(&mut self, delay: Duration, on_fire: F) -> TimerTicket
    where
        F: FnOnce(TimerTicket) + Send + 'static,
    {
        self.cancel();

        let ticket = TimerTicket(self.generation);
        self.task = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(ticket);
        }));
        ticket
    }

    /// Cancel the pending arm. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    /// Accept a fired ticket if it is still the current arm
    pub fn claim(&mut self, ticket: TimerTicket) -> bool {
        if self.task.is_none() || ticket.0 != self.generation {
            return false;
        }
        self.task = None;
        self.generation = self.generation.wrapping_add(1);
        true
    }

    pub fn is_armed(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for ReversionTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
