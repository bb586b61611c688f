use crate::error::{EngineError, Result};

/// Power-of-two ring buffer FIFO, reused across BVH traversals to avoid
/// per-query allocation or recursion.
pub struct Queue<T> {
    buf: Vec<Option<T>>,
    mask: usize,
    head: usize,
    tail: usize,
    count: usize,
}

impl<T> Queue<T> {
    /// `capacity` is rounded up to the next power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        let mut buf = Vec::with_capacity(capacity);
        buf.resize_with(capacity, || None);
        Self {
            buf,
            mask: capacity - 1,
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    pub fn enqueue(&mut self, item: T) -> Result<()> {
        if self.count > self.mask {
            return Err(EngineError::QueueOverflow {
                capacity: self.capacity(),
            });
        }
        self.buf[self.tail] = Some(item);
        self.tail = (self.tail + 1) & self.mask;
        self.count += 1;
        Ok(())
    }

    pub fn dequeue(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.buf[self.head].take();
        self.head = (self.head + 1) & self.mask;
        self.count -= 1;
        item
    }

    pub fn peek(&self) -> Option<&T> {
        if self.count == 0 {
            None
        } else {
            self.buf[self.head].as_ref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_preserved() {
        let mut q = Queue::with_capacity(4);
        q.enqueue(1).unwrap();
        q.enqueue(2).unwrap();
        q.enqueue(3).unwrap();
        assert_eq!(q.dequeue(), Some(1));
        assert_eq!(q.dequeue(), Some(2));
        assert_eq!(q.dequeue(), Some(3));
        assert_eq!(q.dequeue(), None);
    }

    #[test]
    fn overflow_is_reported() {
        let mut q = Queue::with_capacity(2);
        q.enqueue(1).unwrap();
        q.enqueue(2).unwrap();
        assert!(matches!(
            q.enqueue(3),
            Err(EngineError::QueueOverflow { .. })
        ));
    }

    #[test]
    fn wraps_around_after_dequeue() {
        let mut q = Queue::with_capacity(2);
        q.enqueue(1).unwrap();
        q.dequeue();
        q.enqueue(2).unwrap();
        q.enqueue(3).unwrap();
        assert_eq!(q.dequeue(), Some(2));
        assert_eq!(q.dequeue(), Some(3));
    }

    #[test]
    fn rounds_capacity_to_power_of_two() {
        let q: Queue<i32> = Queue::with_capacity(5);
        assert_eq!(q.capacity(), 8);
    }
}
