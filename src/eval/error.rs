//! Execution errors
use thiserror::Error;

use super::machine::settings::SettingsError;
use super::memory::{heap::HeapError, object::ObjectRef};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("stack overflow: root stack is full ({0} entries)")]
    StackOverflow(usize),
    #[error("stack underflow")]
    StackUnderflow,
    #[error("allocation error")]
    AllocationError,
    #[error("reference {0} does not name a live object")]
    StaleReference(ObjectRef),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl From<HeapError> for ExecutionError {
    fn from(e: HeapError) -> Self {
        match e {
            HeapError::OutOfMemory { .. } => ExecutionError::AllocationError,
            HeapError::LimitExceeded { .. } => ExecutionError::AllocationError,
            HeapError::DanglingReference(obj) => ExecutionError::StaleReference(obj),
        }
    }
}
