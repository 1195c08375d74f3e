use std::iter::StepBy;
use std::ops::{Range, RangeInclusive};

/// Contiguous block `[rank*total/size, (rank+1)*total/size)` owned by `rank`.
///
/// Blocks of consecutive ranks tile `0..total` exactly; some are empty when
/// `size > total`.
pub fn block_range(rank: usize, size: usize, total: usize) -> Range<usize> {
    debug_assert!(size > 0 && rank < size);
    let bound = |r: usize| ((r as u128 * total as u128) / size as u128) as usize;
    bound(rank)..bound(rank + 1)
}

/// 1-based trial indices `rank+1, rank+1+size, ...` up to and including `total`.
pub fn cyclic_trials(rank: usize, size: usize, total: u64) -> StepBy<RangeInclusive<u64>> {
    debug_assert!(size > 0 && rank < size);
    (rank as u64 + 1..=total).step_by(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_block_range() {
        let blocks: Vec<_> = (0..3).map(|r| block_range(r, 3, 8)).collect();
        assert_eq!(blocks, vec![0..2, 2..5, 5..8]);
    }

    #[test]
    fn test_more_workers_than_elements() {
        let lens: Vec<_> = (0..4).map(|r| block_range(r, 4, 2).len()).collect();
        assert_eq!(lens.iter().sum::<usize>(), 2);
        assert_eq!(lens.iter().filter(|&&len| len == 0).count(), 2);
    }

    #[test]
    fn test_large_totals_do_not_overflow() {
        let last = block_range(7, 8, usize::MAX);
        assert_eq!(last.end, usize::MAX);
    }

    #[test]
    fn test_cyclic_trials() {
        let trials: Vec<Vec<u64>> = (0..3).map(|r| cyclic_trials(r, 3, 7).collect()).collect();
        assert_eq!(trials, vec![vec![1, 4, 7], vec![2, 5], vec![3, 6]]);
        assert_eq!(cyclic_trials(4, 5, 3).count(), 0);
    }

    proptest! {
        #[test]
        fn blocks_cover_exactly_once(total in 0usize..2000, size in 1usize..64) {
            let mut next = 0;
            for rank in 0..size {
                let block = block_range(rank, size, total);
                prop_assert_eq!(block.start, next);
                prop_assert!(block.start <= block.end);
                next = block.end;
            }
            prop_assert_eq!(next, total);
        }

        #[test]
        fn trials_cover_exactly_once(total in 0u64..2000, size in 1usize..64) {
            let mut seen = vec![0u8; total as usize + 1];
            for rank in 0..size {
                for trial in cyclic_trials(rank, size, total) {
                    seen[trial as usize] += 1;
                }
            }
            prop_assert_eq!(seen[0], 0);
            prop_assert!(seen[1..].iter().all(|&hits| hits == 1));
        }
    }
}
