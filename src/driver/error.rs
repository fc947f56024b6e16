//! Overall high-level error type for the driver
use crate::eval::error::ExecutionError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairgcError {
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
