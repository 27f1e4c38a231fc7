//! Ctrl-C handling
//!
//! One listener is installed for the whole process. While a job is in flight
//! Ctrl-C cancels that job; otherwise it ends the process with status 130.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Exit status used when the user interrupts an idle CLI
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Routes Ctrl-C to the job currently in flight
#[derive(Debug, Clone, Default)]
pub struct Interrupts {
    current: Arc<Mutex<Option<(u64, CancellationToken)>>>,
    next_id: Arc<AtomicU64>,
}

impl Interrupts {
    /// Install the process-wide Ctrl-C listener
    pub fn install() -> Self {
        let interrupts = Self::default();
        let listener = interrupts.clone();

        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !listener.interrupt() {
                    eprintln!();
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
                tracing::debug!("Interrupt cancelled the running job");
            }
        });

        interrupts
    }

    /// Start a job; the returned guard owns its cancellation token
    ///
    /// The job stops being interruptible when the guard is dropped.
    pub fn begin_job(&self) -> JobGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        *self.slot() = Some((id, token.clone()));
        JobGuard {
            interrupts: self.clone(),
            id,
            token,
        }
    }

    /// Cancel the running job
    ///
    /// # Returns
    /// Whether a job was running
    pub fn interrupt(&self) -> bool {
        match self.slot().take() {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<(u64, CancellationToken)>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A job that Ctrl-C can cancel
#[derive(Debug)]
pub struct JobGuard {
    interrupts: Interrupts,
    id: u64,
    token: CancellationToken,
}

impl JobGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        let mut slot = self.interrupts.slot();
        if slot.as_ref().is_some_and(|(id, _)| *id == self.id) {
            *slot = None;
        }
    }
}
