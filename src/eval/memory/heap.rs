//! The object heap
//!
//! Objects live in an arena of slots addressed by [`ObjectRef`].
//! Every occupied slot is also threaded onto a singly linked list
//! (through the allocation header) so that sweep can enumerate the
//! tracked objects without touching free slots. Freed slots go onto
//! a free list for reuse, and each reuse bumps the slot's generation
//! so that handles to the previous occupant are detectably stale.

use std::fmt::Debug;

use thiserror::Error;
use tracing::trace;

use super::{
    header::AllocHeader,
    object::{Object, ObjectRef},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    /// Number of objects currently tracked
    pub tracked: usize,
    /// Number of slots in the arena (occupied or free)
    pub slots: usize,
    /// Number of slots awaiting reuse
    pub free_slots: usize,
}

/// Heap-level errors for object allocation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HeapError {
    /// Host allocator could not grow the arena
    #[error("out of memory: could not grow heap beyond {tracked} objects")]
    OutOfMemory { tracked: usize },
    /// Configured object limit reached
    #[error("heap limit of {limit} objects reached")]
    LimitExceeded { limit: usize },
    /// A pair referred to an object that is not tracked
    #[error("reference {0} does not name a live object")]
    DanglingReference(ObjectRef),
}

#[derive(Debug)]
enum Slot {
    Occupied {
        generation: u32,
        header: AllocHeader,
        object: Object,
    },
    /// Generation of the last occupant
    Free { generation: u32 },
}

/// Heap of tracked objects
#[derive(Default)]
pub struct Heap {
    /// Arena of object slots
    slots: Vec<Slot>,
    /// Indexes of free slots
    free: Vec<usize>,
    /// Most recently allocated object (head of the object list)
    first: Option<ObjectRef>,
    /// Number of objects on the object list
    tracked: usize,
    /// Optional cap on the number of tracked objects
    limit: Option<usize>,
}

impl Heap {
    pub fn new() -> Self {
        Heap::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Heap {
            limit: Some(limit),
            ..Heap::default()
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Number of objects currently tracked
    pub fn tracked_count(&self) -> usize {
        self.tracked
    }

    pub fn stats(&self) -> HeapStats {
        HeapStats {
            tracked: self.tracked,
            slots: self.slots.len(),
            free_slots: self.free.len(),
        }
    }

    /// Allocate an object, unmarked, at the head of the object list
    ///
    /// A pair may only refer to objects that are already tracked.
    pub fn alloc(&mut self, object: Object) -> Result<ObjectRef, HeapError> {
        if let Some(refs) = object.references() {
            if let Some(dangling) = refs.into_iter().find(|r| !self.contains(*r)) {
                return Err(HeapError::DanglingReference(dangling));
            }
        }

        if let Some(limit) = self.limit {
            if self.tracked >= limit {
                return Err(HeapError::LimitExceeded { limit });
            }
        }

        let (index, generation) = match self.free.pop() {
            Some(index) => match self.slots[index] {
                Slot::Free { generation } => (index, generation.wrapping_add(1)),
                Slot::Occupied { .. } => panic!("occupied slot {index} on free list"),
            },
            None => {
                if self.slots.len() > u32::MAX as usize {
                    return Err(HeapError::OutOfMemory {
                        tracked: self.tracked,
                    });
                }
                self.slots
                    .try_reserve(1)
                    .map_err(|_| HeapError::OutOfMemory {
                        tracked: self.tracked,
                    })?;
                self.slots.push(Slot::Free { generation: 0 });
                (self.slots.len() - 1, 0)
            }
        };

        let obj = ObjectRef::new(index, generation);
        self.slots[index] = Slot::Occupied {
            generation,
            header: AllocHeader::new(self.first),
            object,
        };
        self.first = Some(obj);
        self.tracked += 1;

        trace!(kind = %object.kind(), slot = index, "allocated");
        Ok(obj)
    }

    /// Whether the reference names a tracked object
    pub fn contains(&self, obj: ObjectRef) -> bool {
        self.get(obj).is_some()
    }

    /// Retrieve a tracked object
    pub fn get(&self, obj: ObjectRef) -> Option<&Object> {
        match self.slots.get(obj.index()) {
            Some(Slot::Occupied {
                generation, object, ..
            }) if *generation == obj.generation() => Some(object),
            _ => None,
        }
    }

    fn header(&self, obj: ObjectRef) -> Option<&AllocHeader> {
        match self.slots.get(obj.index()) {
            Some(Slot::Occupied {
                generation, header, ..
            }) if *generation == obj.generation() => Some(header),
            _ => None,
        }
    }

    fn header_mut(&mut self, obj: ObjectRef) -> Option<&mut AllocHeader> {
        match self.slots.get_mut(obj.index()) {
            Some(Slot::Occupied {
                generation, header, ..
            }) if *generation == obj.generation() => Some(header),
            _ => None,
        }
    }

    pub fn is_marked(&self, obj: ObjectRef) -> bool {
        self.header(obj).map_or(false, AllocHeader::is_marked)
    }

    /// Set the mark bit, returning true if the object was not
    /// already marked
    pub fn mark_object(&mut self, obj: ObjectRef) -> bool {
        match self.header_mut(obj) {
            Some(header) if !header.is_marked() => {
                header.mark();
                true
            }
            Some(_) => false,
            None => {
                debug_assert!(false, "attempt to mark untracked object {obj}");
                false
            }
        }
    }

    /// Iterate over the tracked objects, most recently allocated first
    pub fn objects(&self) -> Objects<'_> {
        Objects {
            heap: self,
            cursor: self.first,
        }
    }

    /// Free every unmarked object and clear the mark on survivors,
    /// returning the number of objects freed
    ///
    /// # Panics
    ///
    /// If the object list and the tracked count disagree. That can
    /// only result from a bug in the heap itself.
    pub fn sweep(&mut self) -> usize {
        let mut previous: Option<ObjectRef> = None;
        let mut cursor = self.first;
        let mut freed = 0;
        let mut survivors = 0;

        while let Some(current) = cursor {
            let (marked, next) = match self.header_mut(current) {
                Some(header) => {
                    let marked = header.is_marked();
                    header.unmark();
                    (marked, header.next())
                }
                None => panic!("free slot {current} linked into object list"),
            };

            if marked {
                survivors += 1;
                previous = Some(current);
            } else {
                match previous {
                    Some(p) => {
                        if let Some(header) = self.header_mut(p) {
                            header.set_next(next)
                        }
                    }
                    None => self.first = next,
                }
                self.slots[current.index()] = Slot::Free {
                    generation: current.generation(),
                };
                self.free.push(current.index());
                freed += 1;
            }

            cursor = next;
        }

        self.tracked -= freed;
        assert_eq!(
            survivors, self.tracked,
            "object list and tracked count disagree after sweep"
        );
        freed
    }
}

/// Iterator over the object list
pub struct Objects<'heap> {
    heap: &'heap Heap,
    cursor: Option<ObjectRef>,
}

impl<'heap> Iterator for Objects<'heap> {
    type Item = (ObjectRef, bool, &'heap Object);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        let heap = self.heap;
        match &heap.slots[current.index()] {
            Slot::Occupied { header, object, .. } => {
                self.cursor = header.next();
                Some((current, header.is_marked(), object))
            }
            Slot::Free { .. } => {
                self.cursor = None;
                None
            }
        }
    }
}

impl Debug for Heap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        writeln!(
            f,
            "Heap: {} tracked, {} slots, {} free",
            stats.tracked, stats.slots, stats.free_slots
        )?;
        for (obj, marked, object) in self.objects() {
            let mark = if marked { "*" } else { " " };
            match object {
                Object::Int(n) => writeln!(f, "  {mark} {obj}  {n}")?,
                Object::Pair { head, tail } => writeln!(f, "  {mark} {obj}  ({head} . {tail})")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    fn ints(heap: &mut Heap, n: i64) -> Vec<ObjectRef> {
        (0..n).map(|i| heap.alloc(Object::Int(i)).unwrap()).collect()
    }

    #[test]
    pub fn test_simple_allocations() {
        let mut heap = Heap::new();
        let ptr = heap.alloc(Object::Int(99)).unwrap();
        assert_eq!(heap.get(ptr), Some(&Object::Int(99)));
        assert!(!heap.is_marked(ptr));
        assert_eq!(heap.tracked_count(), 1);
    }

    #[test]
    pub fn test_object_list_is_newest_first() {
        let mut heap = Heap::new();
        let refs = ints(&mut heap, 3);
        let listed: Vec<ObjectRef> = heap.objects().map(|(r, _, _)| r).collect();
        assert_eq!(listed, refs.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    pub fn test_sweep_frees_unmarked_and_clears_marks() {
        let mut heap = Heap::new();
        let refs = ints(&mut heap, 5);
        assert!(heap.mark_object(refs[1]));
        assert!(heap.mark_object(refs[3]));
        assert!(!heap.mark_object(refs[3]));

        assert_eq!(heap.sweep(), 3);
        assert_eq!(heap.tracked_count(), 2);
        assert_eq!(heap.objects().count(), 2);
        assert!(heap.objects().all(|(_, marked, _)| !marked));
        assert!(heap.contains(refs[1]));
        assert!(heap.contains(refs[3]));
        assert!(!heap.contains(refs[0]));
        assert_eq!(heap.get(refs[4]), None);
    }

    #[test]
    pub fn test_sweep_unlinks_head_and_tail_of_list() {
        let mut heap = Heap::new();
        let refs = ints(&mut heap, 4);
        heap.mark_object(refs[1]);
        heap.mark_object(refs[2]);
        heap.sweep();
        let listed: Vec<ObjectRef> = heap.objects().map(|(r, _, _)| r).collect();
        assert_eq!(listed, vec![refs[2], refs[1]]);
    }

    #[test]
    pub fn test_freed_slots_are_reused() {
        let mut heap = Heap::new();
        ints(&mut heap, 4);
        heap.sweep();
        assert_eq!(heap.stats().free_slots, 4);

        ints(&mut heap, 2);
        let stats = heap.stats();
        assert_eq!(stats.slots, 4);
        assert_eq!(stats.free_slots, 2);
        assert_eq!(stats.tracked, 2);
    }

    #[test]
    pub fn test_reused_slot_rejects_old_handle() {
        let mut heap = Heap::new();
        let old = heap.alloc(Object::Int(9)).unwrap();
        heap.sweep();
        let new = heap.alloc(Object::Int(2)).unwrap();

        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert_eq!(heap.get(old), None);
        assert!(!heap.contains(old));
        assert!(!heap.is_marked(old));
        assert_eq!(heap.get(new), Some(&Object::Int(2)));
    }

    #[test]
    pub fn test_pair_must_refer_to_tracked_objects() {
        let mut heap = Heap::new();
        let a = heap.alloc(Object::Int(1)).unwrap();
        let nowhere = ObjectRef::from_index(42);
        assert_eq!(
            heap.alloc(Object::Pair {
                head: a,
                tail: nowhere
            }),
            Err(HeapError::DanglingReference(nowhere))
        );

        heap.sweep();
        assert_eq!(
            heap.alloc(Object::Pair { head: a, tail: a }),
            Err(HeapError::DanglingReference(a))
        );
        assert_eq!(heap.tracked_count(), 0);
    }

    #[test]
    pub fn test_limit() {
        let mut heap = Heap::with_limit(2);
        ints(&mut heap, 2);
        assert_eq!(
            heap.alloc(Object::Int(3)),
            Err(HeapError::LimitExceeded { limit: 2 })
        );
        assert_eq!(heap.tracked_count(), 2);
        heap.sweep();
        assert!(heap.alloc(Object::Int(3)).is_ok());
    }

    #[test]
    pub fn test_debug_listing() {
        let mut heap = Heap::new();
        let a = heap.alloc(Object::Int(1)).unwrap();
        let b = heap.alloc(Object::Int(2)).unwrap();
        heap.alloc(Object::Pair { head: a, tail: b }).unwrap();
        let listing = format!("{:?}", heap);
        assert!(listing.starts_with("Heap: 3 tracked, 3 slots, 0 free"));
        assert!(listing.contains("(#0 . #1)"));
    }
}
