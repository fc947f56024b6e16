//! Command line argument handling

use structopt::StructOpt;

use crate::eval::machine::settings::{MachineSettings, INITIAL_GC_THRESHOLD, STACK_MAX};

use super::workload::Workload;

/// pairgc - exercise a mark and sweep collector over ints and pairs
#[derive(StructOpt, Debug, Clone)]
#[structopt(name = "pairgc")]
pub struct PairgcOptions {
    /// Allocation pattern to run (garbage, retain, list, tree)
    #[structopt(short = "w", long = "workload", default_value = "list")]
    pub workload: Workload,

    /// Size of the workload (iterations, or depth for tree)
    #[structopt(short = "n", long = "count", default_value = "100")]
    pub count: usize,

    /// Tracked object count that triggers the first collection
    #[structopt(short = "t", long = "threshold", default_value = "5")]
    pub threshold: usize,

    /// Root stack capacity
    #[structopt(short = "s", long = "stack", default_value = "256")]
    pub stack_capacity: usize,

    /// Maximum number of tracked objects
    #[structopt(long = "heap-limit")]
    pub heap_limit: Option<usize>,

    /// Print metrics to stderr before exiting
    #[structopt(short = "S", long = "statistics")]
    pub statistics: bool,

    /// Dump the heap to stderr around every collection
    #[structopt(long = "dump-heap")]
    pub dump_heap: bool,

    /// Dump the root stack to stderr after every operation
    #[structopt(long = "trace")]
    pub trace_steps: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    pub verbose: u8,
}

impl Default for PairgcOptions {
    fn default() -> Self {
        PairgcOptions {
            workload: Workload::List,
            count: 100,
            threshold: INITIAL_GC_THRESHOLD,
            stack_capacity: STACK_MAX,
            heap_limit: None,
            statistics: false,
            dump_heap: false,
            trace_steps: false,
            verbose: 0,
        }
    }
}

impl PairgcOptions {
    pub fn with_workload(mut self, workload: Workload, count: usize) -> Self {
        self.workload = workload;
        self.count = count;
        self
    }

    /// Settings for the machine the workload runs on
    pub fn machine_settings(&self) -> MachineSettings {
        let settings = MachineSettings::default()
            .with_initial_threshold(self.threshold)
            .with_stack_capacity(self.stack_capacity)
            .with_dump_heap(self.dump_heap)
            .with_trace_steps(self.trace_steps);
        match self.heap_limit {
            Some(limit) => settings.with_heap_limit(limit),
            None => settings,
        }
    }
}
