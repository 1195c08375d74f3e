//! Process group selection, logging and exit status for the binaries.

use std::fmt;
use std::process::ExitCode;

use log::LevelFilter;

use crate::error::{KernelError, Result, FAILURE_EXIT_CODE};
use crate::group::{MpiGroup, ProcessGroup};
use crate::local::LocalGroup;

/// A kernel run as driven from the command line.
pub trait Job: Sync {
    type Report: fmt::Display;

    /// Worker count for an in-process group, or `None` to join an MPI job.
    fn local_workers(&self) -> Option<usize>;

    /// Name of the selected strategy, shown in the banner.
    fn strategy(&self) -> String;

    /// Run on `group`. Every worker calls this; only the coordinator gets a report.
    fn run<G: ProcessGroup>(&self, group: &G) -> Result<Option<Self::Report>>;
}

/// Start the process group, run `parsed` on it and report on the coordinator.
pub fn launch<J: Job>(banner: &str, parsed: std::result::Result<J, clap::Error>) -> ExitCode {
    if let Ok(job) = &parsed {
        if let Some(workers) = job.local_workers() {
            return launch_local(banner, job, workers);
        }
    }

    match MpiGroup::initialize() {
        Ok(group) => {
            init_logging(group.is_coordinator());
            drive(&group, banner, parsed.as_ref())
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}

fn launch_local<J: Job>(banner: &str, job: &J, workers: usize) -> ExitCode {
    if workers == 0 {
        eprintln!("{}", KernelError::NoWorkers);
        return ExitCode::from(FAILURE_EXIT_CODE);
    }

    init_logging(true);
    let mut codes = LocalGroup::run(workers, |group| drive(group, banner, Ok(job)));
    codes.swap_remove(0)
}

fn drive<G: ProcessGroup, J: Job>(
    group: &G,
    banner: &str,
    parsed: std::result::Result<&J, &clap::Error>,
) -> ExitCode {
    let coordinator = group.is_coordinator();

    let job = match parsed {
        Ok(job) => Ok(job),
        Err(err) if !err.use_stderr() => {
            if coordinator {
                let _ = err.print();
            }
            return ExitCode::SUCCESS;
        }
        Err(err) => Err(KernelError::Usage(err.to_string().trim_end().to_owned())),
    };

    if coordinator {
        println!("{}", headline(banner, job.as_ref().ok().copied()));
    }

    match job.and_then(|job| job.run(group)) {
        Ok(report) => {
            if let Some(report) = report {
                print!("{report}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            if coordinator {
                log::debug!("aborting: {err:?}");
                eprintln!("{err}");
            }
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}

/// Banner line, naming the strategy once the command line has parsed.
pub fn headline<J: Job>(banner: &str, job: Option<&J>) -> String {
    match job {
        Some(job) => format!("{banner} ({})", job.strategy()),
        None => banner.to_owned(),
    }
}

/// Log to stderr from the coordinator only.
pub fn init_logging(coordinator: bool) {
    if coordinator {
        let env = env_logger::Env::default().default_filter_or("warn");
        let _ = env_logger::Builder::from_env(env).try_init();
    } else {
        log::set_max_level(LevelFilter::Off);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SortArgs, TourArgs};
    use clap::Parser;

    #[test]
    fn test_headline_names_strategy() {
        let args = SortArgs::try_parse_from(["ranksort", "--strategy", "per-element", "8"]).unwrap();
        assert_eq!(headline("RankSort v1.0", Some(&args)), "RankSort v1.0 (per-element)");

        let args = TourArgs::try_parse_from(["tsp", "cities.tsp", "10"]).unwrap();
        assert_eq!(headline("TSP v1.0", Some(&args)), "TSP v1.0 (partitioned)");
    }

    #[test]
    fn test_headline_without_job() {
        assert_eq!(headline::<SortArgs>("RankSort v1.0", None), "RankSort v1.0");
    }
}
