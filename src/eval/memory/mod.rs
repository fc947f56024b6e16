//! Object model, heap and garbage collection for the machine
pub mod collect;
pub mod header;
pub mod heap;
pub mod object;
pub mod policy;
pub mod render;
