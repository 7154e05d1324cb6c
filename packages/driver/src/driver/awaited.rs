use crate::error::{Error, Result};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use zw_core::util::MaybeSleep;

pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Sync + Send>;

/// A registry of awaited values, each of which is associated with a predicate
/// that determines whether a given value matches.
///
/// Adding an entry hands out an `AwaitedRef`, which is used to receive the
/// value when it is available. The `AwaitedRef` is automatically removed from
/// the registry when it is dropped, so no waiter can leak.
pub struct AwaitedRegistry<T> {
    store: Mutex<Store<T>>,
}

struct Store<T> {
    next_id: u64,
    entries: Vec<Awaited<T>>,
}

impl<T> Default for AwaitedRegistry<T> {
    fn default() -> Self {
        Self {
            store: Mutex::new(Store {
                next_id: 1,
                entries: Vec::new(),
            }),
        }
    }
}

impl<T> AwaitedRegistry<T> {
    /// Adds an entry to the registry with a given predicate, returning an
    /// `AwaitedRef` that can be used to receive the value when it is available.
    pub fn add(self: &Arc<Self>, predicate: Predicate<T>, timeout: Option<Duration>) -> AwaitedRef<T> {
        let (tx, rx) = oneshot::channel::<T>();
        let mut store = self.store.lock().expect("lock on AwaitedRegistry poisoned");
        let id = store.next_id;
        store.next_id += 1;
        store.entries.push(Awaited {
            id,
            predicate,
            channel: tx,
        });
        drop(store);

        AwaitedRef::new(id, self.clone(), timeout, rx)
    }

    /// Finds the oldest entry that matches the given value and removes it,
    /// returning the channel used to hand the value over.
    pub fn take_matching(&self, value: &T) -> Option<oneshot::Sender<T>> {
        let mut store = self.store.lock().expect("lock on AwaitedRegistry poisoned");
        let index = store.entries.iter().position(|a| (a.predicate)(value));
        index.map(|i| store.entries.remove(i).channel)
    }

    /// Removes ALL entries matching the given value. Used where every
    /// concurrent waiter must see the same value.
    pub fn take_all_matching(&self, value: &T) -> Vec<oneshot::Sender<T>> {
        let mut store = self.store.lock().expect("lock on AwaitedRegistry poisoned");
        let mut matching = Vec::new();
        let mut i = 0;
        while i < store.entries.len() {
            if (store.entries[i].predicate)(value) {
                matching.push(store.entries.remove(i).channel);
            } else {
                i += 1;
            }
        }
        matching
    }

    fn remove(&self, id: u64) {
        let mut store = self.store.lock().expect("lock on AwaitedRegistry poisoned");
        store.entries.retain(|a| a.id != id);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.store
            .lock()
            .expect("lock on AwaitedRegistry poisoned")
            .entries
            .len()
    }
}

struct Awaited<T> {
    id: u64,
    predicate: Predicate<T>,
    channel: oneshot::Sender<T>,
}

pub struct AwaitedRef<T> {
    id: u64,
    registry: Arc<AwaitedRegistry<T>>,
    timeout: Option<Duration>,
    channel: Option<oneshot::Receiver<T>>,
}

impl<T> AwaitedRef<T> {
    fn new(
        id: u64,
        registry: Arc<AwaitedRegistry<T>>,
        timeout: Option<Duration>,
        channel: oneshot::Receiver<T>,
    ) -> Self {
        Self {
            id,
            registry,
            timeout,
            channel: Some(channel),
        }
    }

    /// Begins awaiting the value
    pub async fn try_await(mut self) -> Result<T> {
        let sleep = MaybeSleep::new(self.timeout);
        let receiver = self
            .channel
            .take()
            .expect("try_await may only be called once");
        tokio::select! {
            result = receiver => result.map_err(|_| Error::Internal),
            _ = sleep => Err(Error::Timeout),
        }
    }
}

impl<T> Debug for AwaitedRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwaitedRef").field("id", &self.id).finish()
    }
}

impl<T> Drop for AwaitedRef<T> {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_take_matching_oldest_first() {
        let registry: Arc<AwaitedRegistry<u8>> = Arc::new(AwaitedRegistry::default());
        let first = registry.add(Box::new(|v| *v == 1), None);
        let second = registry.add(Box::new(|v| *v == 1), None);

        let channel = registry.take_matching(&1).unwrap();
        channel.send(1).unwrap();
        assert_eq!(first.try_await().await.unwrap(), 1);

        // The younger entry is still registered
        assert_eq!(registry.len(), 1);
        drop(second);
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn test_dropping_ref_removes_entry() {
        let registry: Arc<AwaitedRegistry<u8>> = Arc::new(AwaitedRegistry::default());
        {
            let _awaited = registry.add(Box::new(|_| true), None);
            assert_eq!(registry.len(), 1);
        }
        assert_eq!(registry.len(), 0);
        assert!(registry.take_matching(&1).is_none());
    }

    #[tokio::test]
    async fn test_timeout() {
        let registry: Arc<AwaitedRegistry<u8>> = Arc::new(AwaitedRegistry::default());
        let awaited = registry.add(Box::new(|_| true), Some(Duration::from_millis(5)));
        assert!(matches!(awaited.try_await().await, Err(Error::Timeout)));
        // The timed-out waiter removed itself
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test]
    async fn test_take_all_matching() {
        let registry: Arc<AwaitedRegistry<u8>> = Arc::new(AwaitedRegistry::default());
        let first = registry.add(Box::new(|v| *v == 7), None);
        let second = registry.add(Box::new(|v| *v == 7), None);
        let other = registry.add(Box::new(|v| *v == 9), None);

        let channels = registry.take_all_matching(&7);
        assert_eq!(channels.len(), 2);
        for channel in channels {
            channel.send(7).unwrap();
        }
        assert_eq!(first.try_await().await.unwrap(), 7);
        assert_eq!(second.try_await().await.unwrap(), 7);
        drop(other);
    }
}
