//! The object model
//!
//! The language has exactly two kinds of value: integers and pairs
//! of references to other objects. Pairs are immutable once
//! allocated so they can only refer to objects that already exist.

use std::fmt;

/// Handle to an object in the heap
///
/// An index into the heap's slot arena plus the generation of the
/// slot at allocation time. Handles are non-owning: the heap owns
/// every object and only the sweep phase frees them. Reusing a slot
/// bumps its generation, so a retained handle to a freed object never
/// names the slot's new occupant.
///
/// Only the heap mints handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    index: u32,
    generation: u32,
}

impl ObjectRef {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        ObjectRef {
            index: index as u32,
            generation,
        }
    }

    /// Handle to a first-generation slot
    pub(crate) fn from_index(index: usize) -> Self {
        ObjectRef::new(index, 0)
    }

    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// A heap object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Object {
    /// Boxed integer
    Int(i64),
    /// Pair of references to existing objects
    Pair { head: ObjectRef, tail: ObjectRef },
}

impl Object {
    /// Kind of object for logging and diagnostics
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Int(_) => ObjectKind::Int,
            Object::Pair { .. } => ObjectKind::Pair,
        }
    }

    /// References held by this object, in head, tail order
    pub fn references(&self) -> Option<[ObjectRef; 2]> {
        match self {
            Object::Int(_) => None,
            Object::Pair { head, tail } => Some([*head, *tail]),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Object::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(ObjectRef, ObjectRef)> {
        match self {
            Object::Pair { head, tail } => Some((*head, *tail)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Int,
    Pair,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Int => write!(f, "int"),
            ObjectKind::Pair => write!(f, "pair"),
        }
    }
}
