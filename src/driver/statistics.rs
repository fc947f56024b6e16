//! Capture and report statistics for a run

use std::{fmt::Display, time::Duration};

use indexmap::IndexMap;

use crate::eval::{machine::vm::Machine, memory::heap::HeapStats};

#[derive(Default, Debug)]
pub struct Timings {
    timings: IndexMap<String, Duration>,
}

impl Timings {
    pub fn record<T: AsRef<str>>(&mut self, name: T, elapsed: Duration) {
        self.timings.insert(name.as_ref().to_string(), elapsed);
    }

    pub fn get<T: AsRef<str>>(&self, name: T) -> Option<Duration> {
        self.timings.get(name.as_ref()).copied()
    }
}

impl Display for Timings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.timings.keys().map(|k| k.len()).max().unwrap_or(0) + 1;

        for (k, v) in &self.timings {
            writeln!(f, "{:width$}: {:14.9}s", k, v.as_secs_f64(), width = width)?;
        }
        Ok(())
    }
}

/// The statistics captured during a run
#[derive(Default, Debug)]
pub struct Statistics {
    allocs: u64,
    collections: u64,
    freed: u64,
    max_stack: usize,
    tracked: usize,
    threshold: usize,
    heap: HeapStats,
    timings: Timings,
}

impl Statistics {
    /// Capture the metrics, heap population and clock of a machine
    pub fn from_machine(machine: &Machine) -> Self {
        let metrics = machine.metrics();
        let mut timings = Timings::default();
        for (occupation, elapsed) in machine.clock().report() {
            timings.record(occupation.name(), elapsed);
        }

        Statistics {
            allocs: metrics.allocs(),
            collections: metrics.collections(),
            freed: metrics.freed(),
            max_stack: metrics.max_stack(),
            tracked: machine.tracked_count(),
            threshold: machine.threshold(),
            heap: machine.heap_stats(),
            timings,
        }
    }

    pub fn allocs(&self) -> u64 {
        self.allocs
    }

    pub fn collections(&self) -> u64 {
        self.collections
    }

    pub fn freed(&self) -> u64 {
        self.freed
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn heap_stats(&self) -> HeapStats {
        self.heap
    }
}

impl Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Allocations    : {:10}", self.allocs)?;
        writeln!(f, "Collections    : {:10}", self.collections)?;
        writeln!(f, "Objects Freed  : {:10}", self.freed)?;
        writeln!(f, "Max Stack      : {:10}", self.max_stack)?;
        writeln!(f, "Tracked        : {:10}", self.tracked)?;
        writeln!(f, "Threshold      : {:10}", self.threshold)?;
        writeln!(f, "Heap Slots     : {:10}", self.heap.slots)?;
        writeln!(f, "Free Slots     : {:10}", self.heap.free_slots)?;
        writeln!(f)?;
        writeln!(f, "{}", self.timings)
    }
}
