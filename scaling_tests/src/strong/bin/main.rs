//! Strong scaling: the same problem sizes for every worker count.
//!
//! mpirun -n <W> cargo run --release --bin strong
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

    run(&group, Experiment::from_env())
}
