//! Reference stacks, queues & priority queues, implementing [Container] over Rust's std collections.\
//! They are the well-behaved subjects the harness is demonstrated (and tested) with:
//!
//! | container           | ordering policy     | storage                              |
//! |---------------------|---------------------|--------------------------------------|
//! | [StackArray]        | LIFO                | `Vec`                                |
//! | [StackLinkedList]   | LIFO                | `LinkedList`, at the front           |
//! | [QueueArray]        | FIFO                | `VecDeque` ring buffer               |
//! | [QueueLinkedList]   | FIFO                | `LinkedList`, back to front          |
//! | [QueueStacks]       | FIFO                | two `Vec` stacks                     |
//! | [MinPriorityQueue]  | Sorted, ascending   | `BinaryHeap<Reverse<_>>`             |
//! | [MaxPriorityQueue]  | Sorted, descending  | `BinaryHeap`                         |

use super::{operation_table::Container, types::AdtError};
use crate::lifecycle::TrackedValue;
use std::{
    cmp::Reverse,
    collections::{BinaryHeap, LinkedList, VecDeque},
};


/// Array backed stack
pub struct StackArray {
    elements: Vec<TrackedValue>,
}

impl Container for StackArray {
    fn try_new() -> Result<Self, AdtError> {
        Ok(Self { elements: Vec::new() })
    }
    fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError> {
        self.elements.try_reserve(1).map_err(|_| AdtError::Allocation)?;
        self.elements.push(value);
        Ok(())
    }
    fn remove(&mut self) -> Option<TrackedValue> {
        self.elements.pop()
    }
    fn peek(&self) -> Option<&TrackedValue> {
        self.elements.last()
    }
    fn len(&self) -> usize {
        self.elements.len()
    }
}

/// Linked list stack: pushes & pops at the head
pub struct StackLinkedList {
    nodes: LinkedList<TrackedValue>,
}

impl Container for StackLinkedList {
    fn try_new() -> Result<Self, AdtError> {
        Ok(Self { nodes: LinkedList::new() })
    }
    fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError> {
        self.nodes.push_front(value);
        Ok(())
    }
    fn remove(&mut self) -> Option<TrackedValue> {
        self.nodes.pop_front()
    }
    fn peek(&self) -> Option<&TrackedValue> {
        self.nodes.front()
    }
    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Ring buffer queue, growing as needed
pub struct QueueArray {
    elements: VecDeque<TrackedValue>,
}

impl Container for QueueArray {
    fn try_new() -> Result<Self, AdtError> {
        Ok(Self { elements: VecDeque::new() })
    }
    fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError> {
        self.elements.try_reserve(1).map_err(|_| AdtError::Allocation)?;
        self.elements.push_back(value);
        Ok(())
    }
    fn remove(&mut self) -> Option<TrackedValue> {
        self.elements.pop_front()
    }
    fn peek(&self) -> Option<&TrackedValue> {
        self.elements.front()
    }
    fn len(&self) -> usize {
        self.elements.len()
    }
}

/// Linked list queue: enqueues at the tail, dequeues from the head
pub struct QueueLinkedList {
    nodes: LinkedList<TrackedValue>,
}

impl Container for QueueLinkedList {
    fn try_new() -> Result<Self, AdtError> {
        Ok(Self { nodes: LinkedList::new() })
    }
    fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError> {
        self.nodes.push_back(value);
        Ok(())
    }
    fn remove(&mut self) -> Option<TrackedValue> {
        self.nodes.pop_front()
    }
    fn peek(&self) -> Option<&TrackedValue> {
        self.nodes.front()
    }
    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Queue made of two stacks: elements are enqueued on `inbox` and, whenever `outbox` runs dry, all of them are
/// transferred over -- reversing their order. Amortized O(1) for all operations.
pub struct QueueStacks {
    inbox:  Vec<TrackedValue>,
    outbox: Vec<TrackedValue>,
}

impl Container for QueueStacks {
    fn try_new() -> Result<Self, AdtError> {
        Ok(Self { inbox: Vec::new(), outbox: Vec::new() })
    }
    fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError> {
        self.inbox.try_reserve(1).map_err(|_| AdtError::Allocation)?;
        self.inbox.push(value);
        Ok(())
    }
    fn remove(&mut self) -> Option<TrackedValue> {
        if self.outbox.is_empty() {
            self.outbox.reserve(self.inbox.len());
            while let Some(value) = self.inbox.pop() {
                self.outbox.push(value);
            }
        }
        self.outbox.pop()
    }
    fn peek(&self) -> Option<&TrackedValue> {
        // the front is either on top of `outbox` or at the bottom of `inbox`, if no transfer happened yet
        self.outbox.last().or_else(|| self.inbox.first())
    }
    fn len(&self) -> usize {
        self.inbox.len() + self.outbox.len()
    }
}

/// Priority queue yielding the smallest values first
pub struct MinPriorityQueue {
    heap: BinaryHeap<Reverse<TrackedValue>>,
}

impl Container for MinPriorityQueue {
    fn try_new() -> Result<Self, AdtError> {
        Ok(Self { heap: BinaryHeap::new() })
    }
    fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError> {
        self.heap.try_reserve(1).map_err(|_| AdtError::Allocation)?;
        self.heap.push(Reverse(value));
        Ok(())
    }
    fn remove(&mut self) -> Option<TrackedValue> {
        self.heap.pop().map(|Reverse(value)| value)
    }
    fn peek(&self) -> Option<&TrackedValue> {
        self.heap.peek().map(|Reverse(value)| value)
    }
    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Priority queue yielding the greatest values first
pub struct MaxPriorityQueue {
    heap: BinaryHeap<TrackedValue>,
}

impl Container for MaxPriorityQueue {
    fn try_new() -> Result<Self, AdtError> {
        Ok(Self { heap: BinaryHeap::new() })
    }
    fn insert(&mut self, value: TrackedValue) -> Result<(), AdtError> {
        self.heap.try_reserve(1).map_err(|_| AdtError::Allocation)?;
        self.heap.push(value);
        Ok(())
    }
    fn remove(&mut self) -> Option<TrackedValue> {
        self.heap.pop()
    }
    fn peek(&self) -> Option<&TrackedValue> {
        self.heap.peek()
    }
    fn len(&self) -> usize {
        self.heap.len()
    }
}


#[cfg(test)]
mod tests {

    //! Unit tests for the reference [containers](super)

    use super::*;
    use crate::lifecycle::LifecycleCounters;

    fn drain<C: Container>(values: &[i32]) -> Vec<i32> {
        let counters = LifecycleCounters::new();
        let mut container = C::try_new().expect("create");
        for (order, value) in values.iter().enumerate() {
            container.insert(TrackedValue::new(*value, order as i32, &counters)).expect("insert");
        }
        let mut drained = Vec::with_capacity(values.len());
        while let Some(value) = container.remove() {
            drained.push(value.value());
        }
        drained
    }

    #[test]
    fn removal_orders() {
        let values = [3, 1, 2];
        assert_eq!(drain::<StackArray>(&values),       vec![2, 1, 3]);
        assert_eq!(drain::<StackLinkedList>(&values),  vec![2, 1, 3]);
        assert_eq!(drain::<QueueArray>(&values),       vec![3, 1, 2]);
        assert_eq!(drain::<QueueLinkedList>(&values),  vec![3, 1, 2]);
        assert_eq!(drain::<QueueStacks>(&values),      vec![3, 1, 2]);
        assert_eq!(drain::<MinPriorityQueue>(&values), vec![1, 2, 3]);
        assert_eq!(drain::<MaxPriorityQueue>(&values), vec![3, 2, 1]);
    }

    #[test]
    fn queue_stacks_peek_across_transfers() {
        let counters = LifecycleCounters::new();
        let mut queue = QueueStacks::try_new().expect("create");
        queue.insert(TrackedValue::new(1, 0, &counters)).expect("insert");
        queue.insert(TrackedValue::new(2, 1, &counters)).expect("insert");
        assert_eq!(queue.peek().map(TrackedValue::value), Some(1));
        assert_eq!(queue.remove().map(|value| value.value()), Some(1));
        queue.insert(TrackedValue::new(3, 2, &counters)).expect("insert");
        assert_eq!(queue.peek().map(TrackedValue::value), Some(2));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.remove().map(|value| value.value()), Some(2));
        assert_eq!(queue.remove().map(|value| value.value()), Some(3));
        assert!(queue.peek().is_none());
    }
}
