//! Run a workload on a fresh machine
use std::io::Write;

use tracing::info;

use crate::{
    driver::{error::PairgcError, options::PairgcOptions},
    eval::machine::vm::Machine,
};

use super::statistics::Statistics;

/// Run the selected workload, writing the rendered result to `out`
pub fn run(opt: &PairgcOptions, out: &mut dyn Write) -> Result<Statistics, PairgcError> {
    let mut machine = Machine::new(opt.machine_settings())?;

    info!(workload = %opt.workload, count = opt.count, "running workload");
    let outcome = opt.workload.run(&mut machine, opt.count);
    machine.stop_clock();

    match outcome? {
        Some(top) => writeln!(out, "{}", machine.render(top)?)?,
        None => writeln!(out, "()")?,
    }

    Ok(Statistics::from_machine(&machine))
}
