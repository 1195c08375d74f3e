use kernels::data::{generate, Pattern};
use kernels::group::{MpiGroup, ProcessGroup, Reduction};
use kernels::partition::block_range;
use kernels::sort::{is_sorted, local_counts, rank_sort, SortOrder, SortStrategy};

const STRATEGIES: [SortStrategy; 3] = [
    SortStrategy::Naive,
    SortStrategy::PerElement,
    SortStrategy::Bulk,
];

/// Sort `values` (already identical on every worker) and return the
/// coordinator's result, empty elsewhere.
fn sort(group: &MpiGroup, values: &[i32], strategy: SortStrategy) -> Vec<i32> {
    let mut result = vec![0; values.len()];
    let runtime = rank_sort(group, values, &mut result, strategy, SortOrder::Descending);
    assert_eq!(runtime.is_some(), group.is_coordinator());
    if group.is_coordinator() {
        result
    } else {
        Vec::new()
    }
}

/// Sequential reference, computed against the whole array in one pass.
fn sequential(values: &[i32]) -> Vec<i32> {
    let mut expected = values.to_vec();
    expected.sort_unstable_by(|a, b| b.cmp(a));
    expected
}

// Summing every worker's blocked counts reproduces the full count
pub fn test_partition_sum_invariance(group: &MpiGroup) {
    let n = 257;
    let values = generate(Pattern::Alternating, n).unwrap();

    let part = block_range(group.rank(), group.size(), n);
    let partial = local_counts(&values, part, SortOrder::Descending);
    let summed = group.reduce(&partial, Reduction::Sum);

    if let Some(summed) = summed {
        let full = local_counts(&values, 0..n, SortOrder::Descending);
        assert_eq!(summed, full);
        println!("...test_partition_sum_invariance passed");
    }
}

pub fn test_strategies_match_sequential(group: &MpiGroup) {
    for n in [1, 5, 8, 100] {
        let values = generate(Pattern::Alternating, n).unwrap();
        for strategy in STRATEGIES {
            let result = sort(group, &values, strategy);
            if group.is_coordinator() {
                assert_eq!(result, sequential(&values), "{strategy} with {n} values");
                assert!(is_sorted(&result, SortOrder::Descending));
            }
        }
    }
    if group.is_coordinator() {
        println!("...test_strategies_match_sequential passed");
    }
}

// Some workers get an empty block
pub fn test_more_workers_than_elements(group: &MpiGroup) {
    let n = group.size().saturating_sub(1).max(1);
    let values = generate(Pattern::Ascending, n).unwrap();
    for strategy in STRATEGIES {
        let result = sort(group, &values, strategy);
        if group.is_coordinator() {
            assert_eq!(result, (0..n as i32).rev().collect::<Vec<_>>());
        }
    }
    if group.is_coordinator() {
        println!("...test_more_workers_than_elements passed");
    }
}

pub fn test_repeat_runs_identical(group: &MpiGroup) {
    let values = generate(Pattern::Alternating, 64).unwrap();
    let first = sort(group, &values, SortStrategy::PerElement);
    let second = sort(group, &values, SortStrategy::PerElement);
    if group.is_coordinator() {
        assert_eq!(first, second);
        println!("...test_repeat_runs_identical passed");
    }
}
