//! Cooperative cancellation for long-running image work.
//!
//! The downscale loop polls a [`CancelToken`] between attempts. A token is
//! cancelled either explicitly (another thread calls [`CancelToken::cancel`])
//! or implicitly once its deadline passes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that is only cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Build from an optional timeout in seconds (`None` = never expires).
    pub fn from_timeout_secs(secs: Option<u64>) -> Self {
        secs.map(|s| Self::with_timeout(Duration::from_secs(s)))
            .unwrap_or_default()
    }

    /// Cancel this token and every clone of it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
