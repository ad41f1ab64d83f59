use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;

struct Armed {
    id: u64,
    handle: AbortHandle,
}

struct Table<K> {
    next_id: u64,
    armed: HashMap<K, Armed>,
}

fn lock<K>(table: &Mutex<Table<K>>) -> MutexGuard<'_, Table<K>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One pending timer per key.
///
/// Arming a key that already has a timer aborts the old one, so a burst of
/// `arm` calls results in a single action running `delay` after the last
/// call. A timer removes itself from the table before its action starts;
/// from then on the action is no longer cancellable through the table, so an
/// in-flight save is never cut off by the next edit re-arming the key.
///
/// Dropping the table aborts everything still waiting. Must be used from
/// within a tokio runtime.
pub struct TimerTable<K> {
    inner: Arc<Mutex<Table<K>>>,
}

impl<K> Default for TimerTable<K> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Table {
                next_id: 0,
                armed: HashMap::new(),
            })),
        }
    }
}

impl<K> TimerTable<K>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm<F>(&self, key: K, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut table = lock(&self.inner);
        let id = table.next_id;
        table.next_id += 1;

        let shared = Arc::clone(&self.inner);
        let fired = key.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut table = lock(&shared);
                match table.armed.get(&fired) {
                    Some(armed) if armed.id == id => {
                        table.armed.remove(&fired);
                    }
                    _ => return,
                }
            }
            tracing::debug!(key = ?fired, "timer_fired");
            action.await;
        });

        if let Some(previous) = table.armed.insert(
            key,
            Armed {
                id,
                handle: task.abort_handle(),
            },
        ) {
            previous.handle.abort();
        }
    }

    /// Returns whether a waiting timer was cancelled.
    pub fn cancel(&self, key: &K) -> bool {
        match lock(&self.inner).armed.remove(key) {
            Some(armed) => {
                armed.handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) -> usize {
        let mut table = lock(&self.inner);
        let count = table.armed.len();
        for (_, armed) in table.armed.drain() {
            armed.handle.abort();
        }
        count
    }

    pub fn is_armed(&self, key: &K) -> bool {
        lock(&self.inner).armed.contains_key(key)
    }

    pub fn armed_count(&self) -> usize {
        lock(&self.inner).armed.len()
    }
}

impl<K> Drop for TimerTable<K> {
    fn drop(&mut self) {
        for (_, armed) in lock(&self.inner).armed.drain() {
            armed.handle.abort();
        }
    }
}
