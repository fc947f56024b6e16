//! Collector support
//!
//! In contrast to the mutator, a collector needs facilities for
//! tracing and marking. Tracing is driven by a grey queue rather
//! than recursion so the depth of the object graph is not limited
//! by the host stack.
//!

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use crate::eval::machine::metrics::{Clock, ThreadOccupation};

use super::{
    heap::Heap,
    object::{Object, ObjectRef},
};

/// Anything that can be scanned for references to heap objects
///
/// `scan` marks each referenced object and returns those that were
/// newly marked (the grey objects whose own references still need
/// scanning).
pub trait GcScannable {
    fn scan(&self, marker: &mut CollectorHeapView<'_>) -> Vec<ObjectRef>;
}

impl GcScannable for Vec<ObjectRef> {
    fn scan(&self, marker: &mut CollectorHeapView<'_>) -> Vec<ObjectRef> {
        self.as_slice().scan(marker)
    }
}

impl GcScannable for [ObjectRef] {
    fn scan(&self, marker: &mut CollectorHeapView<'_>) -> Vec<ObjectRef> {
        self.iter().copied().filter(|p| marker.mark(*p)).collect()
    }
}

impl GcScannable for Object {
    fn scan(&self, marker: &mut CollectorHeapView<'_>) -> Vec<ObjectRef> {
        match self.references() {
            Some(refs) => refs.iter().copied().filter(|p| marker.mark(*p)).collect(),
            None => vec![],
        }
    }
}

/// View of the heap available to the collector
pub struct CollectorHeapView<'guard> {
    heap: &'guard mut Heap,
}

impl<'guard> CollectorHeapView<'guard> {
    pub fn new(heap: &'guard mut Heap) -> Self {
        CollectorHeapView { heap }
    }

    /// Mark object if not already marked and return whether marked
    pub fn mark(&mut self, obj: ObjectRef) -> bool {
        self.heap.mark_object(obj)
    }

    pub fn is_marked(&self, obj: ObjectRef) -> bool {
        self.heap.is_marked(obj)
    }

    /// Mark everything reachable from the roots, returning the number
    /// of objects marked
    pub fn mark_all(&mut self, roots: &dyn GcScannable) -> usize {
        let mut queue: VecDeque<ObjectRef> = roots.scan(self).into();
        let mut marked = queue.len();

        while let Some(obj) = queue.pop_front() {
            if let Some(object) = self.heap.get(obj).copied() {
                let grey = object.scan(self);
                marked += grey.len();
                queue.extend(grey);
            }
        }

        marked
    }

    pub fn sweep(&mut self) -> usize {
        self.heap.sweep()
    }
}

/// Outcome of a single collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionReport {
    /// Objects tracked when the collection began
    pub tracked_before: usize,
    /// Objects found reachable
    pub marked: usize,
    /// Objects freed by sweep
    pub freed: usize,
    /// Objects tracked after sweep
    pub survivors: usize,
    /// Wall time of mark and sweep
    pub elapsed: Duration,
}

/// Run a full stop-the-world mark and sweep over `heap`, treating
/// whatever `roots` scans as the complete root set
pub fn collect(
    roots: &dyn GcScannable,
    heap: &mut Heap,
    clock: &mut Clock,
    dump_heap: bool,
) -> CollectionReport {
    if dump_heap {
        eprintln!("GC!");
    }

    let start = Instant::now();
    let tracked_before = heap.tracked_count();

    clock.switch(ThreadOccupation::CollectorMark);

    let mut heap_view = CollectorHeapView::new(&mut *heap);
    let marked = heap_view.mark_all(roots);

    if dump_heap {
        eprintln!("Heap after mark:\n\n{:?}", &heap_view.heap)
    }

    clock.switch(ThreadOccupation::CollectorSweep);

    let freed = heap_view.sweep();

    if dump_heap {
        eprintln!("Heap after sweep:\n\n{:?}", &heap_view.heap)
    }

    CollectionReport {
        tracked_before,
        marked,
        freed,
        survivors: heap.tracked_count(),
        elapsed: start.elapsed(),
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    fn int(heap: &mut Heap, n: i64) -> ObjectRef {
        heap.alloc(Object::Int(n)).unwrap()
    }

    fn pair(heap: &mut Heap, head: ObjectRef, tail: ObjectRef) -> ObjectRef {
        heap.alloc(Object::Pair { head, tail }).unwrap()
    }

    #[test]
    pub fn test_simple_collection() {
        let mut heap = Heap::new();
        let mut clock = Clock::default();

        let a = int(&mut heap, 1);
        let b = int(&mut heap, 2);
        let _garbage = int(&mut heap, 3);
        let p = pair(&mut heap, a, b);

        let report = collect(&vec![p], &mut heap, &mut clock, false);
        assert_eq!(report.tracked_before, 4);
        assert_eq!(report.marked, 3);
        assert_eq!(report.freed, 1);
        assert_eq!(report.survivors, 3);
        assert_eq!(heap.get(p), Some(&Object::Pair { head: a, tail: b }));
        assert_eq!(heap.get(a), Some(&Object::Int(1)));

        let report = collect(&Vec::<ObjectRef>::new(), &mut heap, &mut clock, false);
        assert_eq!(report.freed, 3);
        assert_eq!(heap.tracked_count(), 0);
    }

    #[test]
    pub fn test_marking_is_idempotent_over_shared_structure() {
        let mut heap = Heap::new();
        let mut clock = Clock::default();

        // a diamond, repeated: every level points twice at the one below
        let mut top = int(&mut heap, 0);
        for _ in 0..64 {
            top = pair(&mut heap, top, top);
        }

        let mut view = CollectorHeapView::new(&mut heap);
        assert_eq!(view.mark_all(&vec![top, top]), 65);
        assert!(view.is_marked(top));
        assert!(!view.mark(top));
        assert_eq!(view.sweep(), 0);

        let report = collect(&vec![top], &mut heap, &mut clock, false);
        assert_eq!(report.marked, 65);
        assert_eq!(report.freed, 0);
    }

    #[test]
    pub fn test_deep_chain_marks_iteratively() {
        let mut heap = Heap::new();
        let mut clock = Clock::default();

        let leaf = int(&mut heap, 0);
        let mut list = leaf;
        for i in 1..200_000 {
            let n = int(&mut heap, i);
            list = pair(&mut heap, list, n);
        }

        let before = heap.tracked_count();
        let report = collect(&vec![list], &mut heap, &mut clock, false);
        assert_eq!(report.freed, 0);
        assert_eq!(heap.tracked_count(), before);
    }

    #[test]
    pub fn test_marks_clear_after_collection() {
        let mut heap = Heap::new();
        let mut clock = Clock::default();
        let a = int(&mut heap, 1);
        let p = pair(&mut heap, a, a);
        collect(&vec![p], &mut heap, &mut clock, false);
        assert!(heap.objects().all(|(_, marked, _)| !marked));
    }

    #[test]
    pub fn test_collection_switches_clock() {
        let mut heap = Heap::new();
        let mut clock = Clock::default();
        clock.switch(ThreadOccupation::Mutator);
        collect(&Vec::<ObjectRef>::new(), &mut heap, &mut clock, false);
        assert_eq!(clock.occupation(), Some(ThreadOccupation::CollectorSweep));
    }
}
