//! Per-mailbox exclusive access.
//!
//! Every search, fetch and flag mutation runs while holding the lock for its
//! mailbox. The lock is a guard: it is released when [`MailboxGuard`] drops,
//! which happens exactly once on every exit path, including errors, panics
//! and the enclosing future being cancelled.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

/// Lock acquisition counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockStats {
    /// Number of times a mailbox lock was acquired.
    pub acquired: usize,
    /// Number of times a mailbox lock was released.
    pub released: usize,
}

/// Registry of mailbox locks, keyed by mailbox name.
#[derive(Debug, Default)]
pub struct MailboxLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl MailboxLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, mailbox: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(mailbox.to_string()).or_default())
    }

    /// Waits for exclusive access to `mailbox`.
    pub async fn acquire(&self, mailbox: &str) -> MailboxGuard<'_> {
        let guard = self.lock_for(mailbox).lock_owned().await;
        self.acquired.fetch_add(1, Ordering::SeqCst);
        trace!(mailbox, "Mailbox lock acquired");

        MailboxGuard {
            mailbox: mailbox.to_string(),
            released: &self.released,
            _guard: guard,
        }
    }

    /// Runs `operation` while holding the lock for `mailbox`.
    ///
    /// The lock is released before the result is returned, whatever it is.
    pub async fn with_lock<F, Fut, R>(&self, mailbox: &str, operation: F) -> R
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        let _guard = self.acquire(mailbox).await;
        operation().await
    }

    /// Whether `mailbox` is currently locked.
    #[must_use]
    pub fn is_locked(&self, mailbox: &str) -> bool {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.get(mailbox).is_some_and(|lock| lock.try_lock().is_err())
    }

    /// Acquisition and release counters.
    #[must_use]
    pub fn stats(&self) -> LockStats {
        LockStats {
            acquired: self.acquired.load(Ordering::SeqCst),
            released: self.released.load(Ordering::SeqCst),
        }
    }
}

/// Exclusive access to one mailbox; released on drop.
#[derive(Debug)]
#[must_use = "the mailbox is unlocked as soon as the guard is dropped"]
pub struct MailboxGuard<'a> {
    mailbox: String,
    released: &'a AtomicUsize,
    _guard: OwnedMutexGuard<()>,
}

impl MailboxGuard<'_> {
    /// Name of the locked mailbox.
    #[must_use]
    pub fn mailbox(&self) -> &str {
        &self.mailbox
    }
}

impl Drop for MailboxGuard<'_> {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
        trace!(mailbox = %self.mailbox, "Mailbox lock released");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_with_lock_releases_on_success() {
        let locks = MailboxLocks::new();
        let registry = &locks;

        let value = locks
            .with_lock("INBOX", move || async move {
                assert!(registry.is_locked("INBOX"));
                42
            })
            .await;

        assert_eq!(value, 42);
        assert!(!locks.is_locked("INBOX"));
        assert_eq!(locks.stats(), LockStats { acquired: 1, released: 1 });
    }

    #[tokio::test]
    async fn test_with_lock_releases_on_error() {
        let locks = MailboxLocks::new();

        let result: Result<(), &str> = locks.with_lock("INBOX", || async { Err("boom") }).await;

        assert!(result.is_err());
        assert!(!locks.is_locked("INBOX"));
        assert_eq!(locks.stats(), LockStats { acquired: 1, released: 1 });
    }

    #[tokio::test]
    async fn test_released_once_when_cancelled() {
        let locks = MailboxLocks::new();

        let pending = locks.with_lock("INBOX", || async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        let timed_out = tokio::time::timeout(Duration::from_millis(10), pending).await;

        assert!(timed_out.is_err());
        assert!(!locks.is_locked("INBOX"));
        assert_eq!(locks.stats(), LockStats { acquired: 1, released: 1 });
    }

    #[tokio::test]
    async fn test_same_mailbox_serializes() {
        let locks = Arc::new(MailboxLocks::new());
        let guard = locks.acquire("INBOX").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("INBOX").await;
            })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert_eq!(locks.stats(), LockStats { acquired: 2, released: 2 });
    }

    #[tokio::test]
    async fn test_different_mailboxes_are_independent() {
        let locks = MailboxLocks::new();
        let inbox = locks.acquire("INBOX").await;
        let archive = locks.acquire("Archive").await;

        assert_eq!(inbox.mailbox(), "INBOX");
        assert_eq!(archive.mailbox(), "Archive");
        assert!(locks.is_locked("INBOX"));
        assert!(locks.is_locked("Archive"));
    }
}
