//! Synthetic workloads
//!
//! There is no language front end, so the driver exercises the
//! allocator and collector with a few fixed allocation patterns.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::eval::{error::ExecutionError, machine::vm::Machine, memory::object::ObjectRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    /// Push and immediately pop integers: everything is garbage
    Garbage,
    /// Push integers and keep them all on the stack
    Retain,
    /// Build one long chain of pairs, with garbage in between
    List,
    /// Build a maximally shared binary tree of the given depth
    Tree,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown workload '{0}' (expected garbage, retain, list or tree)")]
pub struct UnknownWorkload(String);

impl FromStr for Workload {
    type Err = UnknownWorkload;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "garbage" => Ok(Workload::Garbage),
            "retain" => Ok(Workload::Retain),
            "list" => Ok(Workload::List),
            "tree" => Ok(Workload::Tree),
            _ => Err(UnknownWorkload(s.to_string())),
        }
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Workload::Garbage => "garbage",
            Workload::Retain => "retain",
            Workload::List => "list",
            Workload::Tree => "tree",
        };
        write!(f, "{name}")
    }
}

impl Workload {
    /// Run the workload, returning the object left on top of the
    /// stack (if any)
    pub fn run(
        self,
        machine: &mut Machine,
        count: usize,
    ) -> Result<Option<ObjectRef>, ExecutionError> {
        match self {
            Workload::Garbage => {
                for i in 0..count {
                    machine.push_int(i as i64)?;
                    machine.pop()?;
                }
            }
            Workload::Retain => {
                for i in 0..count {
                    machine.push_int(i as i64)?;
                }
            }
            Workload::List => {
                machine.push_int(0)?;
                for i in 1..count {
                    machine.push_int(-(i as i64))?;
                    machine.pop()?;
                    machine.push_int(i as i64)?;
                    machine.push_pair()?;
                }
            }
            Workload::Tree => {
                machine.push_int(0)?;
                for _ in 0..count {
                    let top = machine.peek()?;
                    machine.push(top)?;
                    machine.push_pair()?;
                }
            }
        }

        if machine.stack_len() == 0 {
            Ok(None)
        } else {
            machine.peek().map(Some)
        }
    }
}

#[cfg(test)]
pub mod tests {
    use crate::eval::machine::settings::MachineSettings;

    use super::*;

    fn machine() -> Machine {
        Machine::new(MachineSettings::default()).unwrap()
    }

    #[test]
    pub fn test_parse() {
        assert_eq!("tree".parse::<Workload>(), Ok(Workload::Tree));
        assert_eq!(
            "forest".parse::<Workload>(),
            Err(UnknownWorkload("forest".to_string()))
        );
        assert_eq!(Workload::Garbage.to_string(), "garbage");
    }

    #[test]
    pub fn test_garbage() {
        let mut m = machine();
        assert_eq!(Workload::Garbage.run(&mut m, 100), Ok(None));
        // threshold never grows beyond the floor with no survivors
        assert_eq!(m.threshold(), 5);
        assert!(m.tracked_count() <= 5);
        assert_eq!(m.metrics().allocs(), 100);
    }

    #[test]
    pub fn test_retain_overflows_stack() {
        let mut m = machine();
        assert_eq!(
            Workload::Retain.run(&mut m, 300),
            Err(ExecutionError::StackOverflow(256))
        );
        assert_eq!(m.tracked_count(), 256);
    }

    #[test]
    pub fn test_list() {
        let mut m = machine();
        let top = Workload::List.run(&mut m, 4).unwrap().unwrap();
        assert_eq!(m.render(top).unwrap(), "(((0 . 1) . 2) . 3)");
        m.collect();
        // 4 integers and 3 pairs survive, the negative integers do not
        assert_eq!(m.tracked_count(), 7);
    }

    #[test]
    pub fn test_tree() {
        let mut m = machine();
        let top = Workload::Tree.run(&mut m, 2).unwrap().unwrap();
        assert_eq!(m.render(top).unwrap(), "((0 . 0) . (0 . 0))");
        m.collect();
        assert_eq!(m.tracked_count(), 3);
    }
}
