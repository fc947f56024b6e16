//! Render heap objects for display
//!
//! Pairs print as `(head . tail)`. Rendering walks an explicit work
//! stack and stops expanding pairs once a budget is exhausted, since
//! shared structure can describe a tree far larger than the heap.

use std::fmt::{self, Display};

use super::{
    heap::Heap,
    object::{Object, ObjectRef},
};

/// Default number of pairs expanded before eliding with `...`
pub const DEFAULT_PAIR_BUDGET: usize = 64;

pub struct Rendered<'heap> {
    heap: &'heap Heap,
    root: ObjectRef,
    budget: usize,
}

impl<'heap> Rendered<'heap> {
    pub fn new(heap: &'heap Heap, root: ObjectRef) -> Self {
        Rendered {
            heap,
            root,
            budget: DEFAULT_PAIR_BUDGET,
        }
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }
}

enum Token {
    Obj(ObjectRef),
    Dot,
    Close,
}

impl Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut budget = self.budget;
        let mut work = vec![Token::Obj(self.root)];

        while let Some(token) = work.pop() {
            match token {
                Token::Dot => write!(f, " . ")?,
                Token::Close => write!(f, ")")?,
                Token::Obj(obj) => match self.heap.get(obj) {
                    None => write!(f, "<stale {obj}>")?,
                    Some(Object::Int(n)) => write!(f, "{n}")?,
                    Some(Object::Pair { .. }) if budget == 0 => write!(f, "...")?,
                    Some(Object::Pair { head, tail }) => {
                        budget -= 1;
                        write!(f, "(")?;
                        work.push(Token::Close);
                        work.push(Token::Obj(*tail));
                        work.push(Token::Dot);
                        work.push(Token::Obj(*head));
                    }
                },
            }
        }

        Ok(())
    }
}
