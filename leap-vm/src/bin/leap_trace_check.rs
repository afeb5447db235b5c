//! Replays a hardware capture from stdin and reports how well the model
//! predicts it on stderr. Exits zero regardless of mismatches; only a
//! malformed stream is fatal.

use leap_vm::{Replay, TraceRecord};

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut input = io::stdin().lock();
    let mut replay = Replay::default();

    loop {
        match TraceRecord::read_from(&mut input) {
            Ok(Some(record)) => replay.check(&record),
            Ok(None) => break,
            Err(err) => {
                eprintln!("leap-trace-check: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    let mut stderr = io::stderr().lock();

    if let Err(err) = replay.report(&mut stderr, &mut rand::thread_rng()) {
        eprintln!("leap-trace-check: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
