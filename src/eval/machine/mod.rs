//! Pair / integer machine

use super::error::ExecutionError;

use self::{settings::MachineSettings, vm::Machine};

pub mod metrics;
pub mod settings;
pub mod stack;
pub mod vm;

/// Create a standard machine: default settings with the supplied
/// threshold and stack capacity.
pub fn standard_machine(
    initial_threshold: usize,
    stack_capacity: usize,
) -> Result<Machine, ExecutionError> {
    Machine::new(
        MachineSettings::default()
            .with_initial_threshold(initial_threshold)
            .with_stack_capacity(stack_capacity),
    )
}
