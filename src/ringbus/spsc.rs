//! Single-producer / single-consumer queue
//!
//! Simpler variant of `OrderQueue` with no per-slot sequence mailbox,
//! correct only when there is exactly one producer and one consumer.
//! Grounded on `core/disruptor/mpsc_queue.h`'s `SPSCQueue<T, CAPACITY>`;
//! offered for adapter-to-journal or adapter-to-single-strategy hot paths
//! where the MPSC queue's CAS overhead is unnecessary.

use std::cell::UnsafeCell;
use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::Arc;

struct SpscState<T> {
    mask: u64,
    buffer: Box<[UnsafeCell<T>]>,
    head: AtomicU64,
    tail: AtomicU64,
}

unsafe impl<T: Send> Sync for SpscState<T> {}
unsafe impl<T: Send> Send for SpscState<T> {}

#[derive(Clone)]
pub struct SpscQueue<T> {
    state: Arc<SpscState<T>>,
}

impl<T: Copy + Default> SpscQueue<T> {
    pub fn new(capacity: usize) -> crate::error::Result<Self> {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(crate::error::GatewayError::config("queue capacity must be a nonzero power of two"));
        }
        let mut buffer = Vec::with_capacity(capacity);
        buffer.resize_with(capacity, || UnsafeCell::new(T::default()));
        Ok(Self {
            state: Arc::new(SpscState {
                mask: (capacity - 1) as u64,
                buffer: buffer.into_boxed_slice(),
                head: AtomicU64::new(0),
                tail: AtomicU64::new(0),
            }),
        })
    }

    /// Producer-side push. Must only be called from the single producer.
    pub fn try_push(&self, item: T) -> bool {
        let head = self.state.head.load(Ordering::Relaxed);
        let tail = self.state.tail.load(Ordering::Acquire);
        let capacity = self.state.mask + 1;
        if head - tail >= capacity {
            return false;
        }
        let index = (head & self.state.mask) as usize;
        unsafe {
            *self.state.buffer[index].get() = item;
        }
        self.state.head.store(head + 1, Ordering::Release);
        true
    }

    /// Consumer-side pop. Must only be called from the single consumer.
    pub fn try_pop(&self) -> Option<T> {
        let tail = self.state.tail.load(Ordering::Relaxed);
        let head = self.state.head.load(Ordering::Acquire);
        if tail >= head {
            return None;
        }
        let index = (tail & self.state.mask) as usize;
        let item = unsafe { *self.state.buffer[index].get() };
        self.state.tail.store(tail + 1, Ordering::Release);
        Some(item)
    }

    pub fn is_empty(&self) -> bool {
        self.state.head.load(Ordering::Acquire) == self.state.tail.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        let head = self.state.head.load(Ordering::Acquire);
        let tail = self.state.tail.load(Ordering::Acquire);
        (head - tail) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spsc_basic_order() {
        let queue = SpscQueue::<u32>::new(8).unwrap();
        for i in 1..=5u32 {
            assert!(queue.try_push(i));
        }
        for i in 1..=5u32 {
            assert_eq!(queue.try_pop(), Some(i));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_spsc_full_rejects() {
        let queue = SpscQueue::<u32>::new(2).unwrap();
        assert!(queue.try_push(1));
        assert!(queue.try_push(2));
        assert!(!queue.try_push(3));
    }
}
