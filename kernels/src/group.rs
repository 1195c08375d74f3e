use std::ops::Add;

use mpi::collective::SystemOperation;
use mpi::datatype::Equivalence;
use mpi::environment::Universe;
use mpi::topology::{Rank, SimpleCommunicator};
use mpi::traits::*;

use crate::error::{ErrorClass, KernelError, Result};

/// Rank of the worker that owns canonical input and produces output.
pub const COORDINATOR: usize = 0;

/// Values that can travel through a broadcast.
pub trait Shared: Equivalence + Clone + Send + 'static {}

impl<T: Equivalence + Clone + Send + 'static> Shared for T {}

/// Values that can be folded by a reduction.
pub trait Reducible: Shared + Copy + PartialOrd + Add<Output = Self> {}

impl<T: Shared + Copy + PartialOrd + Add<Output = T>> Reducible for T {}

/// Associative, commutative fold applied element-wise by `reduce`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Min,
    Max,
}

impl Reduction {
    pub fn fold<T: Reducible>(self, a: T, b: T) -> T {
        match self {
            Reduction::Sum => a + b,
            Reduction::Min => {
                if b < a {
                    b
                } else {
                    a
                }
            }
            Reduction::Max => {
                if b > a {
                    b
                } else {
                    a
                }
            }
        }
    }

    fn system_operation(self) -> SystemOperation {
        match self {
            Reduction::Sum => SystemOperation::sum(),
            Reduction::Min => SystemOperation::min(),
            Reduction::Max => SystemOperation::max(),
        }
    }
}

/// A fixed set of workers that only interact through collectives.
///
/// Every collective must be entered by all workers in the same order, with
/// buffers of equal length.
pub trait ProcessGroup {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn is_coordinator(&self) -> bool {
        self.rank() == COORDINATOR
    }

    /// Block until every worker has arrived.
    fn barrier(&self);

    /// Overwrite `buf` on every worker with the coordinator's contents.
    fn broadcast<T: Shared>(&self, buf: &mut [T]);

    /// Element-wise fold of every worker's `send`, delivered to the coordinator only.
    fn reduce<T: Reducible>(&self, send: &[T], op: Reduction) -> Option<Vec<T>>;

    fn broadcast_value<T: Shared>(&self, value: &mut T) {
        self.broadcast(std::slice::from_mut(value))
    }

    fn reduce_value<T: Reducible>(&self, value: T, op: Reduction) -> Option<T> {
        self.reduce(&[value], op).map(|folded| folded[0])
    }
}

/// One MPI process per worker, over `MPI_COMM_WORLD`. Dropping it finalizes MPI.
pub struct MpiGroup {
    world: SimpleCommunicator,
    rank: usize,
    size: usize,
    _universe: Universe,
}

impl MpiGroup {
    pub fn initialize() -> Result<Self> {
        let universe = mpi::initialize().ok_or(KernelError::GroupInit)?;
        let world = universe.world();
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        Ok(MpiGroup {
            world,
            rank,
            size,
            _universe: universe,
        })
    }

    pub fn world(&self) -> &SimpleCommunicator {
        &self.world
    }
}

impl ProcessGroup for MpiGroup {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) {
        self.world.barrier();
    }

    fn broadcast<T: Shared>(&self, buf: &mut [T]) {
        let root = self.world.process_at_rank(COORDINATOR as Rank);
        root.broadcast_into(buf);
    }

    fn reduce<T: Reducible>(&self, send: &[T], op: Reduction) -> Option<Vec<T>> {
        let root = self.world.process_at_rank(COORDINATOR as Rank);
        if self.is_coordinator() {
            let mut recv = send.to_vec();
            root.reduce_into_root(send, &mut recv[..], op.system_operation());
            Some(recv)
        } else {
            root.reduce_into(send, op.system_operation());
            None
        }
    }
}

/// Bring every worker to the same verdict before the first data collective.
///
/// The worst local error class wins; workers that were fine locally get
/// `KernelError::Peer` so that nobody is left waiting in a collective.
pub fn agree<G: ProcessGroup, T>(group: &G, local: Result<T>) -> Result<T> {
    let code = match &local {
        Ok(_) => 0,
        Err(err) => err.class().code(),
    };

    let mut verdict = group.reduce_value(code, Reduction::Max).unwrap_or(0);
    group.broadcast_value(&mut verdict);

    match (local, ErrorClass::from_code(verdict)) {
        (Ok(value), None) => Ok(value),
        (Err(err), _) => Err(err),
        (Ok(_), Some(class)) => Err(KernelError::Peer(class)),
    }
}
