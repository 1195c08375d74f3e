use std::path::PathBuf;

use clap::Parser;

use crate::data::Pattern;
use crate::error::{KernelError, Result};
use crate::sort::{SortOrder, SortStrategy};
use crate::tour::TourStrategy;

/// Command line of the `ranksort` binary.
#[derive(Parser, Debug, Clone)]
#[clap(name = "ranksort", version, about = "Distributed rank sort")]
pub struct SortArgs {
    /// Number of values to generate and sort
    #[clap(value_name = "ELEMENTS", allow_hyphen_values = true)]
    pub elements: i64,

    /// How counting work is spread over the workers
    #[clap(long, value_enum, default_value = "bulk")]
    pub strategy: SortStrategy,

    /// Generated input values
    #[clap(long, value_enum, default_value = "ascending")]
    pub pattern: Pattern,

    /// Direction of the sorted output
    #[clap(long, value_enum, default_value = "descending")]
    pub order: SortOrder,

    /// Run this many in-process workers instead of joining an MPI job
    #[clap(long, value_name = "WORKERS")]
    pub local: Option<usize>,
}

impl SortArgs {
    pub fn len(&self) -> Result<usize> {
        if self.elements < 1 {
            return Err(KernelError::NoElements);
        }
        let max = i32::MAX as usize;
        usize::try_from(self.elements)
            .ok()
            .filter(|&len| len <= max)
            .ok_or(KernelError::TooManyElements { max })
    }
}

/// Command line of the `tsp` binary.
#[derive(Parser, Debug, Clone)]
#[clap(name = "tsp", version, about = "Monte-Carlo travelling salesman search")]
pub struct TourArgs {
    /// City file: a count line, then `<index> <x> <y>` per city
    #[clap(value_name = "INPUT_FILE")]
    pub input: PathBuf,

    /// Number of random tours to evaluate
    #[clap(value_name = "SAMPLES", allow_hyphen_values = true)]
    pub samples: i64,

    /// How trials are spread over the workers
    #[clap(long, value_enum, default_value = "partitioned")]
    pub strategy: TourStrategy,

    /// Run this many in-process workers instead of joining an MPI job
    #[clap(long, value_name = "WORKERS")]
    pub local: Option<usize>,
}

impl TourArgs {
    pub fn samples(&self) -> Result<u64> {
        u64::try_from(self.samples)
            .ok()
            .filter(|&samples| samples >= 1)
            .ok_or(KernelError::NoSamples)
    }
}
