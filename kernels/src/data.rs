use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::cities::{City, CitySet};
use crate::error::{allocate, KernelError, Result};

/// Generated input for the sort kernels.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pattern {
    /// a[i] = i
    Ascending,
    /// a[i] = i for even i, -i for odd i
    Alternating,
}

/// Generate the global array of `len` distinct values.
pub fn generate(pattern: Pattern, len: usize) -> Result<Vec<i32>> {
    if len > i32::MAX as usize {
        return Err(KernelError::TooManyElements {
            max: i32::MAX as usize,
        });
    }

    let mut values: Vec<i32> = allocate(len)?;
    for (i, value) in values.iter_mut().enumerate() {
        let i = i as i32;
        *value = match pattern {
            Pattern::Ascending => i,
            Pattern::Alternating if i % 2 == 0 => i,
            Pattern::Alternating => -i,
        };
    }
    Ok(values)
}

/// Uniformly random cities in `[0, extent)²`, reproducible from `seed`.
pub fn random_cities(ncities: usize, extent: f32, seed: u64) -> CitySet {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let cities = (0..ncities)
        .map(|_| City {
            x: rng.gen::<f32>() * extent,
            y: rng.gen::<f32>() * extent,
        })
        .collect();
    CitySet::new(cities)
}
