use std::sync::Mutex;
use tokio::sync::Notify;
use zw_core::wrapping_counter::WrappingCounter;

/// Hands out the callback IDs (1..=255) that correlate controller callbacks
/// with their requests. An ID stays reserved until its transaction reaches a
/// terminal state. With all 255 IDs in flight, `allocate` suspends until one
/// is released.
pub struct CallbackIdAllocator {
    inner: Mutex<Inner>,
    released: Notify,
}

struct Inner {
    cursor: WrappingCounter<u8>,
    in_use: [bool; 256],
}

impl Default for CallbackIdAllocator {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                cursor: WrappingCounter::new(),
                in_use: [false; 256],
            }),
            released: Notify::new(),
        }
    }
}

impl CallbackIdAllocator {
    pub async fn allocate(&self) -> u8 {
        loop {
            if let Some(id) = self.try_allocate() {
                return id;
            }
            // All 255 IDs are in flight; wait for a release
            self.released.notified().await;
        }
    }

    pub fn try_allocate(&self) -> Option<u8> {
        let mut inner = self.inner.lock().expect("lock on CallbackIdAllocator poisoned");
        for _ in 0..255 {
            let id = inner.cursor.increment();
            if !inner.in_use[id as usize] {
                inner.in_use[id as usize] = true;
                return Some(id);
            }
        }
        None
    }

    pub fn release(&self, id: u8) {
        if id == 0 {
            return;
        }
        let mut inner = self.inner.lock().expect("lock on CallbackIdAllocator poisoned");
        inner.in_use[id as usize] = false;
        drop(inner);
        self.released.notify_one();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_rotating_allocation() {
        let allocator = CallbackIdAllocator::default();
        assert_eq!(allocator.allocate().await, 1);
        assert_eq!(allocator.allocate().await, 2);
        allocator.release(1);
        // The cursor keeps advancing instead of reusing 1 immediately
        assert_eq!(allocator.allocate().await, 3);
    }

    #[tokio::test]
    async fn test_single_free_id() {
        let allocator = CallbackIdAllocator::default();
        for _ in 0..254 {
            allocator.allocate().await;
        }
        // 254 IDs live, exactly one left
        assert_eq!(allocator.allocate().await, 255);
    }

    #[tokio::test]
    async fn test_exhaustion_suspends() {
        let allocator = Arc::new(CallbackIdAllocator::default());
        for _ in 0..255 {
            allocator.allocate().await;
        }

        let blocked = {
            let allocator = allocator.clone();
            tokio::spawn(async move { allocator.allocate().await })
        };
        // The task cannot make progress while all IDs are in use
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!blocked.is_finished());

        allocator.release(42);
        assert_eq!(blocked.await.unwrap(), 42);
    }
}
