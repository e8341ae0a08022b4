//! Per-meeting serialisation.
//!
//! Webhook tasks and controller calls that touch the same meeting take the
//! meeting's lock before re-reading and saving it, so concurrent events for
//! one meeting cannot overwrite each other's changes. Entries are dropped
//! from the registry once nobody holds or waits on them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MeetingLocks {
  inner: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

/// Held while a meeting is being mutated. Releases on drop.
pub struct MeetingGuard {
  locks: MeetingLocks,
  id:    Uuid,
  guard: Option<OwnedMutexGuard<()>>,
}

impl MeetingLocks {
  pub fn new() -> Self { Self::default() }

  pub async fn lock(&self, id: Uuid) -> MeetingGuard {
    let mutex = self.inner.entry(id).or_default().clone();
    let guard = mutex.lock_owned().await;
    MeetingGuard {
      locks: self.clone(),
      id,
      guard: Some(guard),
    }
  }

  /// Number of meetings with a live lock entry.
  pub fn len(&self) -> usize { self.inner.len() }

  pub fn is_empty(&self) -> bool { self.inner.is_empty() }
}

impl Drop for MeetingGuard {
  fn drop(&mut self) {
    drop(self.guard.take());
    // Only the registry's own reference left: no holder, no waiter.
    self
      .locks
      .inner
      .remove_if(&self.id, |_, m| Arc::strong_count(m) == 1);
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;

  #[tokio::test]
  async fn entry_is_removed_after_release() {
    let locks = MeetingLocks::new();
    let id = Uuid::new_v4();
    {
      let _g = locks.lock(id).await;
      assert_eq!(locks.len(), 1);
    }
    assert!(locks.is_empty());
  }

  #[tokio::test]
  async fn same_meeting_is_serialised() {
    let locks = MeetingLocks::new();
    let id = Uuid::new_v4();
    let counter = Arc::new(Mutex::new(Vec::new()));

    let guard = locks.lock(id).await;
    let task = {
      let locks = locks.clone();
      let counter = counter.clone();
      tokio::spawn(async move {
        let _g = locks.lock(id).await;
        counter.lock().await.push("second");
      })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    counter.lock().await.push("first");
    drop(guard);
    task.await.unwrap();

    assert_eq!(*counter.lock().await, ["first", "second"]);
    assert!(locks.is_empty());
  }

  #[tokio::test]
  async fn different_meetings_do_not_block() {
    let locks = MeetingLocks::new();
    let _a = locks.lock(Uuid::new_v4()).await;
    let b = tokio::time::timeout(Duration::from_millis(100), locks.lock(Uuid::new_v4())).await;
    assert!(b.is_ok());
    assert_eq!(locks.len(), 2);
  }
}
