//! End-to-end runs of both kernels: validate, agree, share, compute, report.

use std::fmt;

use crate::cities::{load_cities, share_cities, CitySet};
use crate::config::{SortArgs, TourArgs};
use crate::data::generate;
use crate::error::{allocate, Result};
use crate::group::{agree, ProcessGroup};
use crate::launch::Job;
use crate::sort::{is_sorted, rank_sort, SortStrategy};
use crate::time::Runtime;
use crate::tour::{tour_search, Improvement, Length, TourStrategy};

/// What the coordinator prints after a sort.
#[derive(Clone, Debug, PartialEq)]
pub struct SortReport {
    pub elements: usize,
    pub workers: usize,
    pub strategy: SortStrategy,
    pub runtime: Runtime,
    pub sorted: bool,
    pub result: Vec<i32>,
}

impl fmt::Display for SortReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sorting {} values on {} workers", self.elements, self.workers)?;
        writeln!(f, "{}", self.runtime)?;
        let verdict = if self.sorted { "sorted" } else { "NOT sorted" };
        writeln!(f, "{verdict}\n")
    }
}

impl Job for SortArgs {
    type Report = SortReport;

    fn local_workers(&self) -> Option<usize> {
        self.local
    }

    fn strategy(&self) -> String {
        self.strategy.to_string()
    }

    fn run<G: ProcessGroup>(&self, group: &G) -> Result<Option<SortReport>> {
        let coordinator = group.is_coordinator();
        let prepared = self.len().and_then(|len| {
            match (coordinator, self.strategy) {
                (true, _) => Ok((generate(self.pattern, len)?, allocate::<i32>(len)?)),
                (false, SortStrategy::Naive) => Ok((Vec::new(), Vec::new())),
                (false, _) => Ok((allocate::<i32>(len)?, Vec::new())),
            }
        });
        let (mut values, mut result) = agree(group, prepared)?;

        if self.strategy != SortStrategy::Naive {
            group.broadcast(&mut values[..]);
        }

        let runtime = rank_sort(group, &values, &mut result, self.strategy, self.order);
        Ok(runtime.map(|runtime| SortReport {
            elements: values.len(),
            workers: group.size(),
            strategy: self.strategy,
            runtime,
            sorted: is_sorted(&result, self.order),
            result,
        }))
    }
}

/// What the coordinator prints after a tour search.
#[derive(Clone, Debug, PartialEq)]
pub struct TourReport {
    pub cities: usize,
    pub samples: u64,
    pub input: String,
    pub improvements: Vec<Improvement>,
    pub runtime: Runtime,
    pub best: Length,
}

impl fmt::Display for TourReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} cities and {} samples ({})",
            self.cities, self.samples, self.input
        )?;
        for improvement in &self.improvements {
            writeln!(f, "{improvement}")?;
        }
        writeln!(f, "{}", self.runtime)?;
        writeln!(f, "length of shortest found tour: {}\n", self.best)
    }
}

impl TourArgs {
    /// Only the coordinator reads the city file.
    fn prepare(&self, coordinator: bool) -> Result<(u64, Option<CitySet>)> {
        let cities = if coordinator {
            Some(load_cities(&self.input)?)
        } else {
            None
        };
        Ok((self.samples()?, cities))
    }
}

impl Job for TourArgs {
    type Report = TourReport;

    fn local_workers(&self) -> Option<usize> {
        self.local
    }

    fn strategy(&self) -> String {
        self.strategy.to_string()
    }

    fn run<G: ProcessGroup>(&self, group: &G) -> Result<Option<TourReport>> {
        let prepared = self.prepare(group.is_coordinator());
        let (samples, cities) = agree(group, prepared)?;

        let cities = match self.strategy {
            TourStrategy::Partitioned => share_cities(group, cities),
            TourStrategy::Naive => cities.unwrap_or_default(),
        };

        let outcome = tour_search(group, &cities, samples, self.strategy);
        let improvements = match self.strategy {
            TourStrategy::Naive => outcome.local.improvements,
            TourStrategy::Partitioned => Vec::new(),
        };
        Ok(outcome.best.zip(outcome.runtime).map(|(best, runtime)| TourReport {
            cities: cities.len(),
            samples,
            input: self.input.display().to_string(),
            improvements,
            runtime,
            best,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Pattern;
    use crate::error::{ErrorClass, KernelError};
    use crate::local::LocalGroup;
    use crate::sort::SortOrder;
    use clap::Parser;
    use std::path::PathBuf;

    fn sort_args(elements: i64, strategy: SortStrategy) -> SortArgs {
        SortArgs {
            elements,
            strategy,
            pattern: Pattern::Ascending,
            order: SortOrder::Descending,
            local: None,
        }
    }

    #[test]
    fn test_sort_job_reports_on_coordinator_only() {
        let args = sort_args(5, SortStrategy::Bulk);
        let reports = LocalGroup::run(3, |group| args.run(group).unwrap());

        let report = reports[0].as_ref().unwrap();
        assert_eq!(report.result, vec![4, 3, 2, 1, 0]);
        assert!(report.sorted);
        assert_eq!(report.workers, 3);
        assert!(reports[1..].iter().all(Option::is_none));
    }

    #[test]
    fn test_sort_job_every_strategy() {
        for strategy in [
            SortStrategy::Naive,
            SortStrategy::PerElement,
            SortStrategy::Bulk,
        ] {
            let args = SortArgs {
                pattern: Pattern::Alternating,
                ..sort_args(9, strategy)
            };
            let reports = LocalGroup::run(4, |group| args.run(group).unwrap());
            let report = reports[0].as_ref().unwrap();
            assert_eq!(report.result, vec![8, 6, 4, 2, 0, -1, -3, -5, -7]);
            assert!(report.sorted);
        }
    }

    #[test]
    fn test_sort_job_rejects_zero_everywhere() {
        let args = sort_args(0, SortStrategy::Bulk);
        let verdicts = LocalGroup::run(2, |group| args.run(group));
        for verdict in verdicts {
            assert!(matches!(verdict, Err(KernelError::NoElements)));
        }
    }

    #[test]
    fn test_sort_report_format() {
        let report = SortReport {
            elements: 5,
            workers: 2,
            strategy: SortStrategy::PerElement,
            runtime: Runtime::single(0.5),
            sorted: false,
            result: Vec::new(),
        };
        assert_eq!(
            report.to_string(),
            "sorting 5 values on 2 workers\nruntime: 0.5000 s\nNOT sorted\n\n"
        );
    }

    #[test]
    fn test_tour_job_missing_file_fails_everywhere() {
        let args = TourArgs::try_parse_from(["tsp", "/nonexistent/cities.tsp", "10"]).unwrap();
        let verdicts = LocalGroup::run(3, |group| args.run(group));

        assert!(matches!(verdicts[0], Err(KernelError::Unreadable { .. })));
        for verdict in &verdicts[1..] {
            assert!(matches!(verdict, Err(KernelError::Peer(ErrorClass::Format))));
        }
    }

    #[test]
    fn test_tour_job_bad_samples_fails_everywhere() {
        let args = TourArgs {
            input: PathBuf::from("/nonexistent/cities.tsp"),
            samples: 0,
            strategy: TourStrategy::Partitioned,
            local: None,
        };
        let verdicts = LocalGroup::run(2, |group| args.run(group));
        assert!(matches!(verdicts[0], Err(KernelError::Unreadable { .. })));
        assert!(matches!(verdicts[1], Err(KernelError::NoSamples)));
    }

    #[test]
    fn test_tour_report_format() {
        let report = TourReport {
            cities: 4,
            samples: 2,
            input: "square.tsp".to_owned(),
            improvements: vec![Improvement {
                trial: 1,
                length: 4,
            }],
            runtime: Runtime::single(0.0),
            best: 4,
        };
        assert_eq!(
            report.to_string(),
            "4 cities and 2 samples (square.tsp)\niteration 1: 4\nruntime: 0.0000 s\nlength of shortest found tour: 4\n\n"
        );
    }

    #[test]
    fn test_tour_job_square_file() {
        let path = std::env::temp_dir().join(format!("square-{}.tsp", std::process::id()));
        std::fs::write(&path, "4\n1 0 0\n2 0 1\n3 1 1\n4 1 0\n").unwrap();

        for strategy in [TourStrategy::Naive, TourStrategy::Partitioned] {
            let args = TourArgs {
                input: path.clone(),
                samples: 3,
                strategy,
                local: None,
            };
            let reports = LocalGroup::run(2, |group| args.run(group).unwrap());
            let report = reports[0].as_ref().unwrap();
            assert_eq!(report.cities, 4);
            assert_eq!(report.samples, 3);
            assert!(report.best >= 4);
            assert_eq!(
                report.improvements.is_empty(),
                strategy == TourStrategy::Partitioned
            );
            assert!(reports[1].is_none());
        }

        std::fs::remove_file(&path).unwrap();
    }
}
