//! The machine: heap, root stack and collection policy
//!
//! All allocation goes through [`Machine::alloc`], which collects
//! first if the tracked population has reached the threshold. A
//! collection can only ever start at the entry to an allocation,
//! before the operation has disturbed the root stack.

use itertools::Itertools;
use tracing::{debug, trace, warn};

use crate::eval::{
    error::ExecutionError,
    memory::{
        collect::{self, CollectionReport},
        heap::{Heap, HeapError, HeapStats},
        object::{Object, ObjectRef},
        policy::GcPolicy,
        render::Rendered,
    },
};

use super::{
    metrics::{Clock, Metrics, ThreadOccupation},
    settings::MachineSettings,
    stack::RootStack,
};

/// A pair / integer machine
///
/// GC roots (outside heap, pointing in) are the entries of the root
/// stack, and nothing else.
pub struct Machine {
    /// Owner of every object
    heap: Heap,
    /// Operand stack and root set
    stack: RootStack,
    /// Threshold state
    policy: GcPolicy,
    /// Construction settings
    settings: MachineSettings,
    /// Metrics
    metrics: Metrics,
    /// Clock
    clock: Clock,
}

impl Machine {
    /// Construct a machine from validated settings
    pub fn new(settings: MachineSettings) -> Result<Self, ExecutionError> {
        settings.validate()?;

        let mut clock = Clock::default();
        clock.switch(ThreadOccupation::Initialisation);

        let machine = Machine {
            heap: settings
                .heap_limit
                .map(Heap::with_limit)
                .unwrap_or_default(),
            stack: RootStack::new(settings.stack_capacity),
            policy: GcPolicy::new(settings.initial_threshold),
            settings,
            metrics: Metrics::default(),
            clock,
        };

        debug!(
            threshold = machine.policy.threshold(),
            stack_capacity = machine.stack.capacity(),
            heap_limit = ?machine.heap.limit(),
            "machine created"
        );
        Ok(machine)
    }

    /// Number of objects currently tracked
    pub fn tracked_count(&self) -> usize {
        self.heap.tracked_count()
    }

    /// Tracked count at which the next allocation collects
    pub fn threshold(&self) -> usize {
        self.policy.threshold()
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn stack(&self) -> &RootStack {
        &self.stack
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_stats(&self) -> HeapStats {
        self.heap.stats()
    }

    /// Access the metrics (allocs, collections, etc.)
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Return clock for access to GC timings
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Stop the clock, closing the current timing period
    pub fn stop_clock(&mut self) {
        self.clock.stop();
    }

    /// Dereference a handle
    pub fn get(&self, obj: ObjectRef) -> Result<&Object, ExecutionError> {
        self.heap
            .get(obj)
            .ok_or(ExecutionError::StaleReference(obj))
    }

    /// Render an object as text
    pub fn render(&self, obj: ObjectRef) -> Result<String, ExecutionError> {
        if !self.heap.contains(obj) {
            return Err(ExecutionError::StaleReference(obj));
        }
        Ok(Rendered::new(&self.heap, obj).to_string())
    }

    /// Push an existing object onto the root stack
    pub fn push(&mut self, obj: ObjectRef) -> Result<(), ExecutionError> {
        self.clock.switch(ThreadOccupation::Mutator);
        if !self.heap.contains(obj) {
            return Err(ExecutionError::StaleReference(obj));
        }
        self.stack.push(obj).map_err(|e| {
            trace!(%obj, "push failed: {}", e);
            e
        })?;
        self.metrics.stack(self.stack.len());
        self.trace_step("push");
        Ok(())
    }

    /// Pop the top of the root stack
    pub fn pop(&mut self) -> Result<ObjectRef, ExecutionError> {
        self.clock.switch(ThreadOccupation::Mutator);
        let obj = self.stack.pop()?;
        self.trace_step("pop");
        Ok(obj)
    }

    /// Top of the root stack
    pub fn peek(&self) -> Result<ObjectRef, ExecutionError> {
        self.stack.peek_at(0)
    }

    /// Allocate an integer and push it
    pub fn push_int(&mut self, value: i64) -> Result<(), ExecutionError> {
        self.clock.switch(ThreadOccupation::Mutator);
        if self.stack.is_full() {
            return Err(ExecutionError::StackOverflow(self.stack.capacity()));
        }
        let obj = self.alloc(Object::Int(value))?;
        self.stack.push(obj)?;
        self.metrics.stack(self.stack.len());
        self.trace_step("push_int");
        Ok(())
    }

    /// Replace the top two entries with a pair of them
    ///
    /// The entry below the top becomes the head and the top entry
    /// the tail. Both operands stay on the stack (and so stay rooted)
    /// until the pair has been allocated.
    pub fn push_pair(&mut self) -> Result<(), ExecutionError> {
        self.clock.switch(ThreadOccupation::Mutator);
        let tail = self.stack.peek_at(0)?;
        let head = self.stack.peek_at(1)?;

        let pair = self.alloc(Object::Pair { head, tail })?;

        self.stack.pop()?;
        self.stack.pop()?;
        self.stack.push(pair)?;
        self.trace_step("push_pair");
        Ok(())
    }

    /// Allocate an object, collecting first if the threshold has
    /// been reached
    ///
    /// If a heap limit is configured and reached, one collection is
    /// attempted before giving up unless this allocation has already
    /// collected. The caller must root the result before allocating
    /// again.
    fn alloc(&mut self, object: Object) -> Result<ObjectRef, ExecutionError> {
        let collected = self.policy.requires_collection(self.heap.tracked_count());
        if collected {
            self.collect();
        }

        let obj = match self.heap.alloc(object) {
            Ok(obj) => obj,
            Err(HeapError::LimitExceeded { .. }) if collected => {
                return Err(ExecutionError::AllocationError)
            }
            Err(HeapError::LimitExceeded { limit }) => {
                warn!(limit, "heap limit reached, attempting emergency collection");
                self.collect();
                self.heap.alloc(object)?
            }
            Err(e) => return Err(e.into()),
        };

        self.metrics.alloc(1);
        Ok(obj)
    }

    /// Run a full collection and recompute the threshold
    pub fn collect(&mut self) -> CollectionReport {
        let previous = self.clock.occupation();

        let report = collect::collect(
            &self.stack,
            &mut self.heap,
            &mut self.clock,
            self.settings.dump_heap,
        );
        let threshold = self.policy.recompute(report.survivors);
        self.metrics.collection(report.freed);

        debug!(
            tracked = report.tracked_before,
            marked = report.marked,
            freed = report.freed,
            survivors = report.survivors,
            threshold,
            elapsed_us = report.elapsed.as_micros() as u64,
            "collection complete"
        );

        match previous {
            Some(occupation) => self.clock.switch(occupation),
            None => self.clock.stop(),
        }
        report
    }

    fn trace_step(&self, op: &str) {
        if self.settings.trace_steps {
            let stack = self
                .stack
                .iter()
                .rev()
                .map(|p| Rendered::new(&self.heap, *p).with_budget(4).to_string())
                .format(":");
            eprintln!("M {op:<9} <{}>", stack);
        }
    }
}
