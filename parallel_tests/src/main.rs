use kernels::group::{MpiGroup, ProcessGroup};
use parallel_tests::sorting::*;
use parallel_tests::tour::*;

fn main() {
    // Run with: mpirun -n <W> cargo run -p parallel_tests
    let group = MpiGroup::initialize().unwrap();

    if group.is_coordinator() {
        println!("Test distributed kernels on {} workers: ", group.size());
    }

    // 1. Rank sort
    test_partition_sum_invariance(&group);
    test_strategies_match_sequential(&group);
    test_more_workers_than_elements(&group);
    test_repeat_runs_identical(&group);

    // 2. Tour search
    test_trials_independent_of_worker(&group);
    test_min_reduction(&group);
    test_square(&group);
}
