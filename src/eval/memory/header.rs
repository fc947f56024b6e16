//! Header for all heap objects
//!
//! Carries the mark bit used by the collector and the link that
//! threads every tracked object into the heap's object list. Neither
//! has any meaning to the language.

use bitmaps::Bitmap;

use super::object::ObjectRef;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeaderBits(Bitmap<1>);

const MARK_BIT: usize = 0;

impl HeaderBits {
    fn mark(&mut self) {
        self.0.set(MARK_BIT, true);
    }

    fn unmark(&mut self) {
        self.0.set(MARK_BIT, false);
    }

    fn is_marked(&self) -> bool {
        self.0.get(MARK_BIT)
    }
}

/// Object Header
///
/// Objects are allocated unmarked. The mark bit is only ever set
/// between the start of a mark phase and the end of the following
/// sweep.
#[derive(Default, Debug, Clone, Copy)]
pub struct AllocHeader {
    /// Header bits for object state
    bits: HeaderBits,
    /// Next object in the list of all tracked objects
    next: Option<ObjectRef>,
}

impl AllocHeader {
    pub fn new(next: Option<ObjectRef>) -> Self {
        AllocHeader {
            bits: HeaderBits::default(),
            next,
        }
    }

    pub fn mark(&mut self) {
        self.bits.mark()
    }

    pub fn unmark(&mut self) {
        self.bits.unmark()
    }

    pub fn is_marked(&self) -> bool {
        self.bits.is_marked()
    }

    pub fn next(&self) -> Option<ObjectRef> {
        self.next
    }

    pub fn set_next(&mut self, next: Option<ObjectRef>) {
        self.next = next;
    }
}
