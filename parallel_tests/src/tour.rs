use kernels::cities::{parse_cities, share_cities, CitySet};
use kernels::data::random_cities;
use kernels::group::{MpiGroup, ProcessGroup, Reduction};
use kernels::partition::cyclic_trials;
use kernels::tour::{search, tour_search, Tour, TourStrategy};

fn shared_instance(group: &MpiGroup) -> CitySet {
    let local = group
        .is_coordinator()
        .then(|| random_cities(60, 1000.0, 42));
    share_cities(group, local)
}

// Every trial evaluates to the same length whichever worker runs it
pub fn test_trials_independent_of_worker(group: &MpiGroup) {
    let cities = shared_instance(group);
    let samples = 150u64;

    let mut lengths = vec![0u64; samples as usize];
    for trial in cyclic_trials(group.rank(), group.size(), samples) {
        lengths[trial as usize - 1] = Tour::for_trial(cities.len(), trial).length(&cities);
    }

    if let Some(lengths) = group.reduce(&lengths, Reduction::Sum) {
        for (i, &length) in lengths.iter().enumerate() {
            let trial = i as u64 + 1;
            assert_eq!(length, Tour::for_trial(cities.len(), trial).length(&cities));
        }
        println!("...test_trials_independent_of_worker passed");
    }
}

pub fn test_min_reduction(group: &MpiGroup) {
    let cities = shared_instance(group);
    let samples = 500;

    let outcome = tour_search(group, &cities, samples, TourStrategy::Partitioned);
    let mut best = outcome.best.unwrap_or(0);
    group.broadcast_value(&mut best);
    assert!(best <= outcome.local.best);

    if group.is_coordinator() {
        assert_eq!(best, search(&cities, 1..=samples).best);
        println!("...test_min_reduction passed");
    }
}

pub fn test_square(group: &MpiGroup) {
    let local = group
        .is_coordinator()
        .then(|| parse_cities("4\n1 0 0\n2 0 1\n3 1 1\n4 1 0\n").unwrap());
    let cities = share_cities(group, local);

    for strategy in [TourStrategy::Naive, TourStrategy::Partitioned] {
        let outcome = tour_search(group, &cities, 1, strategy);
        if let Some(best) = outcome.best {
            assert!(best >= 4);
        }
    }
    if group.is_coordinator() {
        println!("...test_square passed");
    }
}
