//! Weak scaling: problem sizes grow with the worker count.
//!
//! mpirun -n <W> cargo run --release --bin weak
use std::process::ExitCode;

use kernels::error::FAILURE_EXIT_CODE;
use kernels::group::{MpiGroup, ProcessGroup};
use kernels::launch::init_logging;
use scaling_tests::{run, Experiment};

fn main() -> ExitCode {
    let group = match MpiGroup::initialize() {
        Ok(group) => group,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(FAILURE_EXIT_CODE);
        }
    };
    init_logging(group.is_coordinator());

    let experiment = Experiment::from_env().weak(group.size());
    run(&group, experiment)
}
