use std::process::ExitCode;

use clap::Parser;

use kernels::config::SortArgs;
use kernels::launch::launch;

fn main() -> ExitCode {
    launch("RankSort v1.0", SortArgs::try_parse())
}
