extern crate pairgc;

use std::{io, process};

use structopt::StructOpt;

use pairgc::driver::{eval, logging, options::PairgcOptions};

pub fn main() {
    let opt = PairgcOptions::from_args();

    logging::init(opt.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match eval::run(&opt, &mut out) {
        Ok(stats) => {
            if opt.statistics {
                eprintln!("{stats}");
            }
            process::exit(0)
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(1)
        }
    }
}
