use std::fmt;
use std::time::Instant;

use crate::group::{ProcessGroup, Reduction};

/// Wall-clock timer for one worker's timed region.
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Synchronize the group, then start timing, so startup skew is excluded.
    pub fn after_barrier<G: ProcessGroup>(group: &G) -> Self {
        group.barrier();
        Stopwatch {
            start: Instant::now(),
        }
    }

    pub fn seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Aggregate timing over the group, as seen by the coordinator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Runtime {
    /// Sum of every worker's elapsed time; this is the reported runtime.
    pub summed: f64,
    /// Elapsed time of the slowest worker.
    pub slowest: f64,
}

impl Runtime {
    /// Runtime of a region only the coordinator measured.
    pub fn single(seconds: f64) -> Self {
        Runtime {
            summed: seconds,
            slowest: seconds,
        }
    }

    /// Sum-reduce and max-reduce the local elapsed time to the coordinator.
    pub fn aggregate<G: ProcessGroup>(group: &G, seconds: f64) -> Option<Self> {
        let summed = group.reduce_value(seconds, Reduction::Sum);
        let slowest = group.reduce_value(seconds, Reduction::Max);
        let runtime = summed.zip(slowest).map(|(summed, slowest)| Runtime { summed, slowest });
        if let Some(runtime) = runtime {
            log::info!(
                "runtime summed over {} workers: {:.4} s, slowest worker: {:.4} s",
                group.size(),
                runtime.summed,
                runtime.slowest
            );
        }
        runtime
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "runtime: {:.4} s", self.summed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalGroup;

    #[test]
    fn test_display() {
        assert_eq!(Runtime::single(1.23456).to_string(), "runtime: 1.2346 s");
    }

    #[test]
    fn test_aggregate_sums_and_maxes() {
        let runtimes = LocalGroup::run(3, |group| {
            Runtime::aggregate(group, 0.5 * (group.rank() + 1) as f64)
        });
        assert_eq!(
            runtimes[0],
            Some(Runtime {
                summed: 3.0,
                slowest: 1.5
            })
        );
        assert!(runtimes[1..].iter().all(Option::is_none));
    }

    #[test]
    fn test_stopwatch_is_monotonic() {
        let elapsed = LocalGroup::run(2, |group| {
            let watch = Stopwatch::after_barrier(group);
            let first = watch.seconds();
            (first, watch.seconds())
        });
        for (first, second) in elapsed {
            assert!(0.0 <= first && first <= second);
        }
    }
}
