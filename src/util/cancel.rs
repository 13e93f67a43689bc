//! Cooperative cancellation and deadlines.
//!
//! A [`CancellationToken`] is shared between the caller of a run and every
//! worker. An [`Interrupt`] bundles a token with an optional per-file deadline
//! and is checked by long-running loops (the tokenizer checks it before every
//! chunk read).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::error::{Result, WordstatError};

/// Shared cancellation flag.
///
/// Cloning yields a handle to the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, untripped token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Cancellation tokens plus an optional deadline.
#[derive(Clone, Debug, Default)]
pub struct Interrupt {
    tokens: Vec<CancellationToken>,
    deadline: Option<Instant>,
}

impl Interrupt {
    /// An interrupt that never trips.
    pub fn none() -> Self {
        Self::default()
    }

    /// Also trip when `token` is cancelled.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.tokens.push(token);
        self
    }

    /// Trip once `timeout` has elapsed from now. A timeout too large to be
    /// represented as an `Instant` sets no deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    /// Trip at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Return an error if the token was cancelled or the deadline passed.
    pub fn check(&self) -> Result<()> {
        if self.tokens.iter().any(CancellationToken::is_cancelled) {
            return Err(WordstatError::cancelled("run was cancelled"));
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(WordstatError::timeout("deadline exceeded"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_shared_between_clones() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(!handle.is_cancelled());

        token.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_unrepresentable_timeout_sets_no_deadline() {
        let interrupt = Interrupt::none().with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(interrupt.deadline(), None);
        assert!(interrupt.check().is_ok());
    }

    #[test]
    fn test_interrupt_none_never_trips() {
        assert!(Interrupt::none().check().is_ok());
    }

    #[test]
    fn test_interrupt_cancelled() {
        let token = CancellationToken::new();
        let interrupt = Interrupt::none().with_token(token.clone());
        assert!(interrupt.check().is_ok());

        token.cancel();
        let err = interrupt.check().unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_interrupt_any_token() {
        let first = CancellationToken::new();
        let second = CancellationToken::new();
        let interrupt = Interrupt::none()
            .with_token(first.clone())
            .with_token(second.clone());
        assert!(interrupt.check().is_ok());

        second.cancel();
        assert!(interrupt.check().unwrap_err().is_cancelled());
        assert!(!first.is_cancelled());
    }

    #[test]
    fn test_interrupt_deadline() {
        let interrupt = Interrupt::none().with_deadline(Instant::now());
        match interrupt.check() {
            Err(WordstatError::Timeout(_)) => {}
            other => panic!("expected timeout, got {other:?}"),
        }

        let interrupt = Interrupt::none().with_timeout(Duration::from_secs(3600));
        assert!(interrupt.check().is_ok());
        assert!(interrupt.deadline().is_some());
    }
}
