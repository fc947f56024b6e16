//! The root stack
//!
//! Operand stack of the machine and, at the instant a collection
//! runs, its complete root set.

use crate::eval::{
    error::ExecutionError,
    memory::{
        collect::{CollectorHeapView, GcScannable},
        object::ObjectRef,
    },
};

/// Bounded stack of non-owning object references
#[derive(Debug, Clone)]
pub struct RootStack {
    entries: Vec<ObjectRef>,
    capacity: usize,
}

impl RootStack {
    pub fn new(capacity: usize) -> Self {
        RootStack {
            entries: vec![],
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn push(&mut self, obj: ObjectRef) -> Result<(), ExecutionError> {
        if self.is_full() {
            return Err(ExecutionError::StackOverflow(self.capacity));
        }
        self.entries.push(obj);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<ObjectRef, ExecutionError> {
        self.entries.pop().ok_or(ExecutionError::StackUnderflow)
    }

    /// Entry `depth` places below the top (0 is the top)
    pub fn peek_at(&self, depth: usize) -> Result<ObjectRef, ExecutionError> {
        self.entries
            .len()
            .checked_sub(depth + 1)
            .map(|i| self.entries[i])
            .ok_or(ExecutionError::StackUnderflow)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ObjectRef> {
        self.entries.iter()
    }
}

/// The root stack holds every garbage collection root
impl GcScannable for RootStack {
    fn scan(&self, marker: &mut CollectorHeapView<'_>) -> Vec<ObjectRef> {
        self.entries.scan(marker)
    }
}
