//! Strong and weak scaling runs of both kernels.
//!
//! Problem sizes come from the environment:
//!
//! * `NELEMS`: values to rank sort (default 10000)
//! * `SAMPLES`: tour search trials (default 100000)
//! * `NCITIES`: size of the random city set (default 100)
//!
//! Each run prints `kernel,workers,size,runtime_sum,runtime_max` on the
//! coordinator, one line per kernel.

use std::env;
use std::fmt;
use std::process::ExitCode;
use std::str::FromStr;

use kernels::cities::{share_cities, MAX_CITIES};
use kernels::data::{generate, random_cities, Pattern};
use kernels::error::{allocate, KernelError, Result, FAILURE_EXIT_CODE};
use kernels::group::{agree, ProcessGroup};
use kernels::sort::{rank_sort, SortOrder, SortStrategy};
use kernels::time::Runtime;
use kernels::tour::{tour_search, TourStrategy};

pub const CITY_SEED: u64 = 0;
pub const CITY_EXTENT: f32 = 1000.0;

fn from_env<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparsable {key}={value}");
            default
        }),
        Err(_) => default,
    }
}

/// Problem sizes for one scaling run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Experiment {
    pub elements: usize,
    pub samples: u64,
    pub ncities: usize,
}

impl Experiment {
    pub fn from_env() -> Self {
        Experiment {
            elements: from_env("NELEMS", 10_000),
            samples: from_env("SAMPLES", 100_000),
            ncities: from_env("NCITIES", 100),
        }
    }

    /// Grow the sizes so the work per worker matches a single-worker run.
    ///
    /// Rank sort does N^2 comparisons, so N grows with the square root of
    /// the worker count. Trials are independent, so S grows linearly.
    pub fn weak(self, workers: usize) -> Self {
        let factor = (workers as f64).sqrt();
        Experiment {
            elements: (self.elements as f64 * factor).round() as usize,
            samples: self.samples * workers as u64,
            ..self
        }
    }
}

/// One CSV line of results.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Row {
    pub kernel: &'static str,
    pub workers: usize,
    pub size: u64,
    pub runtime: Runtime,
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{:.6},{:.6}",
            self.kernel, self.workers, self.size, self.runtime.summed, self.runtime.slowest
        )
    }
}

pub fn sort_row<G: ProcessGroup>(group: &G, elements: usize) -> Result<Option<Row>> {
    let prepared = if elements == 0 {
        Err(KernelError::NoElements)
    } else {
        generate(Pattern::Alternating, elements)
            .and_then(|values| Ok((values, allocate::<i32>(elements)?)))
    };
    let (values, mut result) = agree(group, prepared)?;

    let runtime = rank_sort(
        group,
        &values,
        &mut result,
        SortStrategy::Bulk,
        SortOrder::Descending,
    );
    Ok(runtime.map(|runtime| Row {
        kernel: "ranksort",
        workers: group.size(),
        size: elements as u64,
        runtime,
    }))
}

pub fn tour_row<G: ProcessGroup>(group: &G, ncities: usize, samples: u64) -> Result<Option<Row>> {
    let prepared = if !(1..MAX_CITIES).contains(&ncities) {
        Err(KernelError::CitiesOutOfRange)
    } else if samples == 0 {
        Err(KernelError::NoSamples)
    } else {
        Ok(group
            .is_coordinator()
            .then(|| random_cities(ncities, CITY_EXTENT, CITY_SEED)))
    };
    let cities = share_cities(group, agree(group, prepared)?);

    let outcome = tour_search(group, &cities, samples, TourStrategy::Partitioned);
    if let Some(best) = outcome.best {
        log::info!("shortest tour over {ncities} cities: {best}");
    }
    Ok(outcome.runtime.map(|runtime| Row {
        kernel: "tsp",
        workers: group.size(),
        size: samples,
        runtime,
    }))
}

/// Run both kernels and print their rows on the coordinator.
pub fn run<G: ProcessGroup>(group: &G, experiment: Experiment) -> ExitCode {
    log::debug!("{experiment:?} on {} workers", group.size());

    let rows = sort_row(group, experiment.elements).and_then(|sorted| {
        let toured = tour_row(group, experiment.ncities, experiment.samples)?;
        Ok(sorted.into_iter().chain(toured))
    });

    match rows {
        Ok(rows) => {
            for row in rows {
                println!("{row}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            if group.is_coordinator() {
                eprintln!("{err}");
            }
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}
