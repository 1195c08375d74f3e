use std::process::ExitCode;

use clap::Parser;

use kernels::config::TourArgs;
use kernels::launch::launch;

fn main() -> ExitCode {
    launch("TSP v1.0", TourArgs::try_parse())
}
