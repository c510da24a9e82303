//! See [TrackedValue].

use super::counters::{LifecycleCounters, LifecycleEvent};
use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};


/// The payload flowing through containers under test.\
/// Every construction, copy, relocation, destruction & comparison is notified to the [LifecycleCounters] the value was built with,
/// so hidden copies, leaks & comparison costs of a container become observable without its cooperation.
///
/// Comparisons look at [Self::value()] only -- the insertion `order` tag is ignored, so equal values with distinct
/// tags may be used to inspect the stability of ordered containers.
pub struct TrackedValue {
    value:    i32,
    order:    i32,
    counters: Arc<LifecycleCounters>,
}

impl TrackedValue {

    /// value-construction: the way the harness builds its test data
    pub fn new(value: i32, order: i32, counters: &Arc<LifecycleCounters>) -> Self {
        counters.notify(LifecycleEvent::ValueConstruct);
        Self { value, order, counters: Arc::clone(counters) }
    }

    /// default-construction (`value` & `order` = 0) -- for containers that pre-fill their storage
    pub fn default_in(counters: &Arc<LifecycleCounters>) -> Self {
        counters.notify(LifecycleEvent::DefaultConstruct);
        Self { value: 0, order: 0, counters: Arc::clone(counters) }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// the insertion order tag given by whoever built the value
    pub fn order(&self) -> i32 {
        self.order
    }

    /// the counters this value notifies to
    pub fn counters(&self) -> &Arc<LifecycleCounters> {
        &self.counters
    }

    /// Move-construction, for containers that explicitly relocate their storage: builds a new value with our contents.\
    /// Rust moves are plain memory copies that can't be observed, so only relocations done through this method are counted.
    pub fn relocate(&mut self) -> Self {
        self.counters.notify(LifecycleEvent::MoveConstruct);
        Self { value: self.value, order: self.order, counters: Arc::clone(&self.counters) }
    }

    /// Move-assignment: takes over the contents of `source`, which stays alive (and will be destructed on its own)
    pub fn move_assign(&mut self, source: &Self) {
        self.counters.notify(LifecycleEvent::MoveAssign);
        self.value = source.value;
        self.order = source.order;
    }
}

impl Clone for TrackedValue {
    /// copy-construction
    fn clone(&self) -> Self {
        self.counters.notify(LifecycleEvent::CopyConstruct);
        Self { value: self.value, order: self.order, counters: Arc::clone(&self.counters) }
    }

    /// copy-assignment
    fn clone_from(&mut self, source: &Self) {
        self.counters.notify(LifecycleEvent::CopyAssign);
        self.value = source.value;
        self.order = source.order;
    }
}

impl Drop for TrackedValue {
    fn drop(&mut self) {
        self.counters.notify(LifecycleEvent::Destruct);
    }
}

impl PartialEq for TrackedValue {
    fn eq(&self, other: &Self) -> bool {
        self.counters.notify(LifecycleEvent::CompareEq);
        self.value == other.value
    }

    #[allow(clippy::partialeq_ne_impl)]
    fn ne(&self, other: &Self) -> bool {
        self.counters.notify(LifecycleEvent::CompareNeq);
        self.value != other.value
    }
}

impl Eq for TrackedValue {}

impl PartialOrd for TrackedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }

    fn lt(&self, other: &Self) -> bool {
        self.counters.notify(LifecycleEvent::CompareLt);
        self.value < other.value
    }

    fn le(&self, other: &Self) -> bool {
        self.counters.notify(LifecycleEvent::CompareLte);
        self.value <= other.value
    }

    fn gt(&self, other: &Self) -> bool {
        self.counters.notify(LifecycleEvent::CompareGt);
        self.value > other.value
    }

    fn ge(&self, other: &Self) -> bool {
        self.counters.notify(LifecycleEvent::CompareGte);
        self.value >= other.value
    }
}

impl Ord for TrackedValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.counters.notify(LifecycleEvent::ThreeWayCompare);
        self.value.cmp(&other.value)
    }
}

impl Display for TrackedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Debug for TrackedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.value, self.order)
    }
}


#[cfg(test)]
mod tests {

    //! Unit tests for [TrackedValue](super::TrackedValue)

    use super::*;

    #[test]
    fn constructions_and_destructions_balance() {
        let counters = LifecycleCounters::new();
        {
            let mut a = TrackedValue::new(1, 0, &counters);
            let b = a.clone();
            let mut c = TrackedValue::default_in(&counters);
            c.clone_from(&b);
            let _d = a.relocate();
            c.move_assign(&a);
        }
        let snapshot = counters.snapshot();
        assert_eq!(snapshot.count(LifecycleEvent::ValueConstruct),   1);
        assert_eq!(snapshot.count(LifecycleEvent::CopyConstruct),    1);
        assert_eq!(snapshot.count(LifecycleEvent::DefaultConstruct), 1);
        assert_eq!(snapshot.count(LifecycleEvent::CopyAssign),       1);
        assert_eq!(snapshot.count(LifecycleEvent::MoveConstruct),    1);
        assert_eq!(snapshot.count(LifecycleEvent::MoveAssign),       1);
        assert_eq!(snapshot.constructions(), 4);
        assert_eq!(snapshot.destructions(),  4);
        assert_eq!(snapshot.live(), 0);
    }

    #[test]
    fn move_assignment_from_a_shared_source() {
        let counters = LifecycleCounters::new();
        let source = TrackedValue::new(3, 7, &counters);
        let mut target = TrackedValue::default_in(&counters);
        let view = &source;
        target.move_assign(view);
        assert_eq!((target.value(), target.order()), (3, 7));
        assert_eq!((view.value(), view.order()), (3, 7), "the source stays readable");
        assert_eq!(counters.snapshot().count(LifecycleEvent::MoveAssign), 1);
        assert_eq!(counters.snapshot().constructions(), 2);
    }

    #[test]
    fn rust_moves_are_free() {
        let counters = LifecycleCounters::new();
        let value = TrackedValue::new(7, 0, &counters);
        let mut vec = Vec::with_capacity(1);
        vec.push(value);
        let value = vec.pop();
        assert_eq!(value.as_ref().map(TrackedValue::value), Some(7));
        assert_eq!(counters.snapshot().constructions(), 1);
        assert_eq!(counters.snapshot().destructions(), 0);
        drop(value);
        assert_eq!(counters.snapshot().live(), 0);
    }

    #[test]
    fn each_comparison_notifies_once_and_ignores_order_tags() {
        let counters = LifecycleCounters::new();
        let a = TrackedValue::new(5, 1, &counters);
        let b = TrackedValue::new(5, 2, &counters);
        let c = TrackedValue::new(9, 3, &counters);
        assert!(a == b);
        assert!(a != c);
        assert!(a < c);
        assert!(a <= b);
        assert!(c > a);
        assert!(b >= a);
        assert_eq!(a.cmp(&c), Ordering::Less);
        let snapshot = counters.snapshot();
        for event in [LifecycleEvent::CompareEq, LifecycleEvent::CompareNeq, LifecycleEvent::CompareLt, LifecycleEvent::CompareLte,
                      LifecycleEvent::CompareGt, LifecycleEvent::CompareGte, LifecycleEvent::ThreeWayCompare] {
            assert_eq!(snapshot.count(event), 1, "{:?} should have been notified exactly once", event);
        }
        assert_eq!(snapshot.comparisons(), 7);
    }

    #[test]
    fn greater_than_is_a_real_greater_than() {
        let counters = LifecycleCounters::new();
        let small = TrackedValue::new(1, 0, &counters);
        let big   = TrackedValue::new(2, 1, &counters);
        assert!(!(small > big));
        assert!(big > small);
    }
}
