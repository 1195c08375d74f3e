//! Monte-Carlo search for short closed tours.
//!
//! Trial `k` is a pure function of `k`: the generator is reseeded with the
//! 1-based trial index, so the same tour comes out no matter which worker
//! evaluates it or how many workers there are.

use std::fmt;
use std::iter;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::cities::CitySet;
use crate::group::{ProcessGroup, Reduction};
use crate::partition::cyclic_trials;
use crate::time::{Runtime, Stopwatch};

/// Tour length in rounded distance units.
pub type Length = u64;

/// Best length before any tour has been evaluated.
pub const NO_TOUR: Length = Length::MAX;

/// How trials are spread over the group.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TourStrategy {
    /// The coordinator runs every trial; others only synchronize.
    Naive,
    /// Trials are dealt out cyclically and the best lengths min-reduced.
    Partitioned,
}

impl fmt::Display for TourStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TourStrategy::Naive => "naive",
            TourStrategy::Partitioned => "partitioned",
        };
        f.write_str(name)
    }
}

/// Visiting order of cities `1..n`; city 0 is implicitly first and last.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tour {
    order: Vec<usize>,
}

impl Tour {
    pub fn for_trial(ncities: usize, trial: u64) -> Self {
        let mut tour = Tour {
            order: vec![0; ncities.saturating_sub(1)],
        };
        tour.regenerate(trial);
        tour
    }

    /// Overwrite this tour with the one belonging to `trial`.
    pub fn regenerate(&mut self, trial: u64) {
        for (i, city) in self.order.iter_mut().enumerate() {
            *city = i + 1;
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(trial);
        let len = self.order.len();
        for i in 0..len {
            let j = rng.gen_range(0..len);
            self.order.swap(i, j);
        }
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Length of the closed tour 0 -> order[0] -> ... -> order[n-2] -> 0.
    ///
    /// Saturates at `Length::MAX` for coordinates too far apart to sum.
    pub fn length(&self, cities: &CitySet) -> Length {
        let mut from = 0;
        let mut length: Length = 0;
        for &to in self.order.iter().chain(iter::once(&0)) {
            length = length.saturating_add(cities[from].distance(&cities[to]));
            from = to;
        }
        length
    }
}

/// A trial that beat every earlier trial on the same worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Improvement {
    pub trial: u64,
    pub length: Length,
}

impl fmt::Display for Improvement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "iteration {}: {}", self.trial, self.length)
    }
}

/// One worker's view of the search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalSearch {
    pub best: Length,
    pub trials: u64,
    pub improvements: Vec<Improvement>,
}

impl Default for LocalSearch {
    fn default() -> Self {
        LocalSearch {
            best: NO_TOUR,
            trials: 0,
            improvements: Vec::new(),
        }
    }
}

/// Evaluate the given trials in order, keeping the shortest tour.
pub fn search<I: IntoIterator<Item = u64>>(cities: &CitySet, trials: I) -> LocalSearch {
    let mut local = LocalSearch::default();
    if cities.is_empty() {
        return local;
    }

    let mut tour = Tour::for_trial(cities.len(), 0);
    for trial in trials {
        tour.regenerate(trial);
        let length = tour.length(cities);
        local.trials += 1;
        if length < local.best {
            local.best = length;
            local.improvements.push(Improvement { trial, length });
        }
    }
    local
}

/// Outcome of a search; `best` and `runtime` are only set on the coordinator.
#[derive(Clone, Debug, PartialEq)]
pub struct TourOutcome {
    pub local: LocalSearch,
    pub best: Option<Length>,
    pub runtime: Option<Runtime>,
}

/// Run trials `1..=samples` over the group.
///
/// `cities` need only be valid on the coordinator for the naive strategy;
/// the partitioned strategy expects every worker to hold the same set.
pub fn tour_search<G: ProcessGroup>(
    group: &G,
    cities: &CitySet,
    samples: u64,
    strategy: TourStrategy,
) -> TourOutcome {
    match strategy {
        TourStrategy::Naive => naive_search(group, cities, samples),
        TourStrategy::Partitioned => partitioned_search(group, cities, samples),
    }
}

fn naive_search<G: ProcessGroup>(group: &G, cities: &CitySet, samples: u64) -> TourOutcome {
    let watch = Stopwatch::after_barrier(group);
    if !group.is_coordinator() {
        log::debug!("worker {} idle", group.rank());
        return TourOutcome {
            local: LocalSearch::default(),
            best: None,
            runtime: None,
        };
    }

    let local = search(cities, 1..=samples);
    let runtime = Runtime::single(watch.seconds());
    TourOutcome {
        best: Some(local.best),
        local,
        runtime: Some(runtime),
    }
}

fn partitioned_search<G: ProcessGroup>(group: &G, cities: &CitySet, samples: u64) -> TourOutcome {
    let watch = Stopwatch::after_barrier(group);
    let local = search(cities, cyclic_trials(group.rank(), group.size(), samples));
    for improvement in &local.improvements {
        log::debug!("worker {} {}", group.rank(), improvement);
    }
    log::debug!(
        "worker {} ran {} trials, best {}",
        group.rank(),
        local.trials,
        local.best
    );

    let best = group.reduce_value(local.best, Reduction::Min);
    let runtime = Runtime::aggregate(group, watch.seconds());
    TourOutcome {
        local,
        best,
        runtime,
    }
}
