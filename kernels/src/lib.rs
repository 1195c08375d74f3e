//! Distributed Rank Sort and Monte-Carlo Tours in Rust
//!
//! Two numeric kernels spread over a fixed group of workers with MPI: a
//! comparison-counting (rank) sort, and a random-sampling search for short
//! travelling salesman tours. Each kernel comes in a naive form, where the
//! coordinator computes everything, and a partitioned form, where every
//! worker computes over its own slice and the slices are combined by
//! reductions.
//!
//! # References
//! [1] Burtscher, M. "RankSort v1.0" and "TSP v1.0", Texas State University-San Marcos (2013).

/// Error types and fallible allocation.
pub mod error;

/// Process groups and their collectives.
pub mod group;

/// In-process process group, one thread per worker.
pub mod local;

/// Split work over workers.
pub mod partition;

/// Input generation.
pub mod data;

/// City sets: loading, parsing and sharing.
pub mod cities;

/// Rank sort kernels.
pub mod sort;

/// Monte-Carlo tour search kernels.
pub mod tour;

/// Timing of kernel regions.
pub mod time;

/// Command line arguments.
pub mod config;

/// End-to-end kernel runs and their reports.
pub mod driver;

/// Entry point shared by the binaries.
pub mod launch;
