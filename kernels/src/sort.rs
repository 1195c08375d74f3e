//! Distributed rank sort.
//!
//! The destination of `a[i]` is the number of elements that strictly precede
//! it in the requested order. Each worker counts only against its own block of
//! the array; the counts of all blocks add up to the full count, so a
//! sum-reduction reconstructs every destination exactly.
//!
//! Distinct values map to distinct destinations. Equal values share a
//! destination and overwrite each other, leaving some slots at 0.

use std::fmt;
use std::ops::Range;

use itertools::Itertools;
use rayon::prelude::*;

use crate::group::{ProcessGroup, Reduction};
use crate::partition::block_range;
use crate::time::{Runtime, Stopwatch};

/// Direction of the sorted output.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// Largest value first: counts elements strictly greater than a[i].
    Descending,
    /// Smallest value first: counts elements strictly less than a[i].
    Ascending,
}

impl SortOrder {
    /// Whether `other` belongs strictly before `value`.
    #[inline]
    pub fn ahead(self, other: i32, value: i32) -> bool {
        match self {
            SortOrder::Descending => other > value,
            SortOrder::Ascending => value > other,
        }
    }
}

/// How the counting work is spread over the group.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortStrategy {
    /// The coordinator counts everything; others only synchronize.
    Naive,
    /// Blocked counting, one scalar reduction per element.
    PerElement,
    /// Blocked counting, one vector reduction for all elements.
    Bulk,
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortStrategy::Naive => "naive",
            SortStrategy::PerElement => "per-element",
            SortStrategy::Bulk => "bulk",
        };
        f.write_str(name)
    }
}

/// Number of elements of `owned` that precede `value`.
#[inline]
pub fn count_ahead(owned: &[i32], value: i32, order: SortOrder) -> u64 {
    owned
        .iter()
        .filter(|&&other| order.ahead(other, value))
        .count() as u64
}

/// Partial counts for every element of `values`, counted only against `part`.
pub fn local_counts(values: &[i32], part: Range<usize>, order: SortOrder) -> Vec<u64> {
    let owned = &values[part];
    values
        .par_iter()
        .map(|&value| count_ahead(owned, value, order))
        .collect()
}

/// Write each value to its destination. Returns how many destinations were
/// claimed by more than one value.
pub fn place(values: &[i32], counts: &[u64], result: &mut [i32]) -> usize {
    for (&value, &count) in values.iter().zip(counts) {
        result[count as usize] = value;
    }

    let collisions = counts.len() - counts.iter().unique().count();
    if collisions > 0 {
        log::warn!("{collisions} destinations claimed by duplicate values");
    }
    collisions
}

/// Whether `result` is strictly monotone in `order`.
pub fn is_sorted(result: &[i32], order: SortOrder) -> bool {
    result
        .iter()
        .tuple_windows()
        .all(|(&a, &b)| order.ahead(a, b))
}

/// Sort `values` (identical on every worker) into `result` on the coordinator.
///
/// `result` is left untouched on other workers. Returns the aggregate runtime
/// on the coordinator.
pub fn rank_sort<G: ProcessGroup>(
    group: &G,
    values: &[i32],
    result: &mut [i32],
    strategy: SortStrategy,
    order: SortOrder,
) -> Option<Runtime> {
    match strategy {
        SortStrategy::Naive => naive_sort(group, values, result, order),
        SortStrategy::PerElement => per_element_sort(group, values, result, order),
        SortStrategy::Bulk => bulk_sort(group, values, result, order),
    }
}

fn naive_sort<G: ProcessGroup>(
    group: &G,
    values: &[i32],
    result: &mut [i32],
    order: SortOrder,
) -> Option<Runtime> {
    let watch = Stopwatch::after_barrier(group);
    if !group.is_coordinator() {
        log::debug!("worker {} idle", group.rank());
        return None;
    }

    let counts = local_counts(values, 0..values.len(), order);
    place(values, &counts, result);
    Some(Runtime::single(watch.seconds()))
}

fn per_element_sort<G: ProcessGroup>(
    group: &G,
    values: &[i32],
    result: &mut [i32],
    order: SortOrder,
) -> Option<Runtime> {
    let part = block_range(group.rank(), group.size(), values.len());
    log::debug!("worker {} counts against {:?}", group.rank(), part);
    let owned = &values[part];

    let watch = Stopwatch::after_barrier(group);
    let mut totals = Vec::new();
    for &value in values {
        let partial = count_ahead(owned, value, order);
        if let Some(count) = group.reduce_value(partial, Reduction::Sum) {
            totals.push(count);
        }
    }
    if group.is_coordinator() {
        place(values, &totals, result);
    }
    Runtime::aggregate(group, watch.seconds())
}

fn bulk_sort<G: ProcessGroup>(
    group: &G,
    values: &[i32],
    result: &mut [i32],
    order: SortOrder,
) -> Option<Runtime> {
    let part = block_range(group.rank(), group.size(), values.len());
    log::debug!("worker {} counts against {:?}", group.rank(), part);

    let watch = Stopwatch::after_barrier(group);
    let counts = local_counts(values, part, order);
    if let Some(totals) = group.reduce(&counts, Reduction::Sum) {
        place(values, &totals, result);
    }
    Runtime::aggregate(group, watch.seconds())
}
