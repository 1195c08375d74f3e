//! In-process process group: one OS thread per worker.
//!
//! Collectives exchange contributions through a slot table with one entry per
//! rank. Every collective is bracketed by barriers, so a slot is only written
//! while nobody reads it.

use std::any::Any;
use std::sync::{Arc, Barrier};
use std::thread;

use parking_lot::Mutex;

use crate::group::{ProcessGroup, Reducible, Reduction, Shared, COORDINATOR};

type Slot = Option<Box<dyn Any + Send>>;

struct Exchange {
    barrier: Barrier,
    slots: Mutex<Vec<Slot>>,
}

#[derive(Clone)]
pub struct LocalGroup {
    rank: usize,
    size: usize,
    exchange: Arc<Exchange>,
}

impl LocalGroup {
    /// Run `job` on `size` workers and collect each worker's return value by rank.
    ///
    /// A worker that panics leaves its peers blocked in the next collective,
    /// so jobs should return results and let the caller assert on them.
    pub fn run<F, R>(size: usize, job: F) -> Vec<R>
    where
        F: Fn(&LocalGroup) -> R + Sync,
        R: Send,
    {
        assert!(size > 0, "a process group needs at least one worker");

        let exchange = Arc::new(Exchange {
            barrier: Barrier::new(size),
            slots: Mutex::new((0..size).map(|_| None).collect()),
        });

        thread::scope(|scope| {
            let handles: Vec<_> = (0..size)
                .map(|rank| {
                    let group = LocalGroup {
                        rank,
                        size,
                        exchange: Arc::clone(&exchange),
                    };
                    let job = &job;
                    thread::Builder::new()
                        .name(format!("worker-{rank}"))
                        .spawn_scoped(scope, move || job(&group))
                        .expect("failed to spawn worker thread")
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().expect("worker panicked"))
                .collect()
        })
    }

    fn publish<T: Send + 'static>(&self, value: Vec<T>) {
        self.exchange.slots.lock()[self.rank] = Some(Box::new(value));
    }
}

impl ProcessGroup for LocalGroup {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) {
        self.exchange.barrier.wait();
    }

    fn broadcast<T: Shared>(&self, buf: &mut [T]) {
        if self.is_coordinator() {
            self.publish(buf.to_vec());
        }
        self.barrier();

        if !self.is_coordinator() {
            let slots = self.exchange.slots.lock();
            let root = slots[COORDINATOR]
                .as_ref()
                .and_then(|slot| slot.downcast_ref::<Vec<T>>())
                .expect("coordinator published a different type");
            assert_eq!(root.len(), buf.len(), "broadcast length mismatch");
            buf.clone_from_slice(root);
        }
        self.barrier();
    }

    fn reduce<T: Reducible>(&self, send: &[T], op: Reduction) -> Option<Vec<T>> {
        self.publish(send.to_vec());
        self.barrier();

        let folded = if self.is_coordinator() {
            let mut slots = self.exchange.slots.lock();
            let mut acc = send.to_vec();
            for (rank, slot) in slots.iter_mut().enumerate() {
                let contribution = slot
                    .take()
                    .and_then(|slot| slot.downcast::<Vec<T>>().ok())
                    .expect("worker published a different type");
                if rank == COORDINATOR {
                    continue;
                }
                assert_eq!(contribution.len(), acc.len(), "reduce length mismatch");
                for (a, &b) in acc.iter_mut().zip(contribution.iter()) {
                    *a = op.fold(*a, b);
                }
            }
            Some(acc)
        } else {
            None
        };
        self.barrier();

        folded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_are_distinct() {
        let ranks = LocalGroup::run(5, |group| (group.rank(), group.size()));
        assert_eq!(ranks, (0..5).map(|r| (r, 5)).collect::<Vec<_>>());
    }

    #[test]
    fn test_broadcast() {
        let received = LocalGroup::run(4, |group| {
            let mut buf = if group.is_coordinator() {
                vec![7i32, -1, 3]
            } else {
                vec![0i32; 3]
            };
            group.broadcast(&mut buf);
            buf
        });
        for buf in received {
            assert_eq!(buf, vec![7, -1, 3]);
        }
    }

    #[test]
    fn test_reduce_sum_min_max() {
        let results = LocalGroup::run(3, |group| {
            let r = group.rank() as u64;
            let sum = group.reduce(&[r, 10 * r], Reduction::Sum);
            let min = group.reduce_value(r + 4, Reduction::Min);
            let max = group.reduce_value(r as f64, Reduction::Max);
            (sum, min, max)
        });

        assert_eq!(results[0], (Some(vec![3, 30]), Some(4), Some(2.0)));
        for result in &results[1..] {
            assert_eq!(*result, (None, None, None));
        }
    }

    #[test]
    fn test_back_to_back_collectives() {
        let results = LocalGroup::run(3, |group| {
            let mut total = 0u64;
            for round in 0..50u64 {
                let mut seed = if group.is_coordinator() { round } else { 0 };
                group.broadcast_value(&mut seed);
                if let Some(sum) = group.reduce_value(seed, Reduction::Sum) {
                    total += sum;
                }
            }
            total
        });
        assert_eq!(results[0], 3 * (0..50).sum::<u64>());
    }

    #[test]
    fn test_single_worker() {
        let results = LocalGroup::run(1, |group| {
            group.barrier();
            group.reduce_value(9u64, Reduction::Sum)
        });
        assert_eq!(results, vec![Some(9)]);
    }
}
