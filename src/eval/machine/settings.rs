//! Machine configuration

use thiserror::Error;

/// Collection threshold used by a fresh machine (and the minimum
/// the threshold may fall back to)
pub const INITIAL_GC_THRESHOLD: usize = 5;

/// Default root stack capacity
pub const STACK_MAX: usize = 256;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("initial collection threshold must be at least 1")]
    ZeroThreshold,
    #[error("root stack capacity must be at least 1")]
    ZeroStackCapacity,
    #[error("heap limit must be at least 1")]
    ZeroHeapLimit,
}

/// Settings for constructing a machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSettings {
    /// Tracked object count that triggers the first collection, and
    /// the floor for every recomputed threshold
    pub initial_threshold: usize,
    /// Fixed capacity of the root stack
    pub stack_capacity: usize,
    /// Optional cap on the number of tracked objects
    pub heap_limit: Option<usize>,
    /// Dump the heap to stderr around each collection
    pub dump_heap: bool,
    /// Dump the root stack to stderr after each operation
    pub trace_steps: bool,
}

impl Default for MachineSettings {
    fn default() -> Self {
        MachineSettings {
            initial_threshold: INITIAL_GC_THRESHOLD,
            stack_capacity: STACK_MAX,
            heap_limit: None,
            dump_heap: false,
            trace_steps: false,
        }
    }
}

impl MachineSettings {
    pub fn with_initial_threshold(mut self, threshold: usize) -> Self {
        self.initial_threshold = threshold;
        self
    }

    pub fn with_stack_capacity(mut self, capacity: usize) -> Self {
        self.stack_capacity = capacity;
        self
    }

    pub fn with_heap_limit(mut self, limit: usize) -> Self {
        self.heap_limit = Some(limit);
        self
    }

    pub fn with_dump_heap(mut self, dump: bool) -> Self {
        self.dump_heap = dump;
        self
    }

    pub fn with_trace_steps(mut self, trace: bool) -> Self {
        self.trace_steps = trace;
        self
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.initial_threshold == 0 {
            return Err(SettingsError::ZeroThreshold);
        }
        if self.stack_capacity == 0 {
            return Err(SettingsError::ZeroStackCapacity);
        }
        if self.heap_limit == Some(0) {
            return Err(SettingsError::ZeroHeapLimit);
        }
        Ok(())
    }
}
