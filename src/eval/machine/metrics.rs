//! Machine metrics

use std::cmp::max;
use std::time::{Duration, Instant};

/// Record some metrics as we execute
#[derive(Default, Debug, Clone)]
pub struct Metrics {
    allocs: u64,
    collections: u64,
    freed: u64,
    max_stack: usize,
}

impl Metrics {
    pub fn alloc(&mut self, count: usize) {
        self.allocs += count as u64;
    }

    pub fn allocs(&self) -> u64 {
        self.allocs
    }

    pub fn collection(&mut self, freed: usize) {
        self.collections += 1;
        self.freed += freed as u64;
    }

    pub fn collections(&self) -> u64 {
        self.collections
    }

    pub fn freed(&self) -> u64 {
        self.freed
    }

    pub fn stack(&mut self, size: usize) {
        self.max_stack = max(self.max_stack, size);
    }

    pub fn max_stack(&self) -> usize {
        self.max_stack
    }
}

/// What the (single) thread is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadOccupation {
    Initialisation,
    Mutator,
    CollectorMark,
    CollectorSweep,
}

impl ThreadOccupation {
    pub const ALL: [ThreadOccupation; 4] = [
        ThreadOccupation::Initialisation,
        ThreadOccupation::Mutator,
        ThreadOccupation::CollectorMark,
        ThreadOccupation::CollectorSweep,
    ];

    fn slot(self) -> usize {
        match self {
            ThreadOccupation::Initialisation => 0,
            ThreadOccupation::Mutator => 1,
            ThreadOccupation::CollectorMark => 2,
            ThreadOccupation::CollectorSweep => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ThreadOccupation::Initialisation => "initialisation",
            ThreadOccupation::Mutator => "mutator",
            ThreadOccupation::CollectorMark => "collector-mark",
            ThreadOccupation::CollectorSweep => "collector-sweep",
        }
    }
}

/// Accumulates time spent in each occupation
#[derive(Default, Debug, Clone)]
pub struct Clock {
    current: Option<(ThreadOccupation, Instant)>,
    totals: [Duration; 4],
}

impl Clock {
    /// Close the current period and start timing `occupation`
    pub fn switch(&mut self, occupation: ThreadOccupation) {
        let now = Instant::now();
        self.close(now);
        self.current = Some((occupation, now));
    }

    /// Close the current period
    pub fn stop(&mut self) {
        self.close(Instant::now());
        self.current = None;
    }

    fn close(&mut self, now: Instant) {
        if let Some((occupation, since)) = self.current {
            self.totals[occupation.slot()] += now.saturating_duration_since(since);
        }
    }

    pub fn occupation(&self) -> Option<ThreadOccupation> {
        self.current.map(|(occupation, _)| occupation)
    }

    /// Total recorded for an occupation (excluding any open period)
    pub fn duration(&self, occupation: ThreadOccupation) -> Duration {
        self.totals[occupation.slot()]
    }

    /// Totals for every occupation, in a stable order
    pub fn report(&self) -> Vec<(ThreadOccupation, Duration)> {
        ThreadOccupation::ALL
            .iter()
            .map(|o| (*o, self.duration(*o)))
            .collect()
    }
}
