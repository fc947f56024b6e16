//! Command line driver: options, workloads and reporting
pub mod error;
pub mod eval;
pub mod logging;
pub mod options;
pub mod statistics;
pub mod workload;
