use std::fs;
use std::path::Path;

use itertools::Itertools;
use memoffset::offset_of;
use mpi::{
    datatype::{Equivalence, UncommittedUserDatatype, UserDatatype},
    Address,
};

use crate::error::{KernelError, Result};
use crate::group::ProcessGroup;

/// Exclusive upper bound on the number of cities in an instance.
pub const MAX_CITIES: usize = 1296;

/// A 2-D point of the instance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct City {
    pub x: f32,
    pub y: f32,
}

impl City {
    /// Euclidean distance rounded to the nearest integer.
    pub fn distance(&self, other: &City) -> u64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt().round() as u64
    }
}

unsafe impl Equivalence for City {
    type Out = UserDatatype;
    fn equivalent_datatype() -> Self::Out {
        UserDatatype::structured(
            &[1, 1],
            &[
                offset_of!(City, x) as Address,
                offset_of!(City, y) as Address,
            ],
            &[
                UncommittedUserDatatype::contiguous(1, &f32::equivalent_datatype()).as_ref(),
                UncommittedUserDatatype::contiguous(1, &f32::equivalent_datatype()).as_ref(),
            ],
        )
    }
}

/// Ordered cities; index 0 anchors every tour.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CitySet {
    cities: Vec<City>,
}

impl CitySet {
    pub fn new(cities: Vec<City>) -> Self {
        CitySet { cities }
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &City> {
        self.cities.iter()
    }

    pub fn as_slice(&self) -> &[City] {
        &self.cities
    }
}

impl std::ops::Index<usize> for CitySet {
    type Output = City;

    fn index(&self, idx: usize) -> &City {
        &self.cities[idx]
    }
}

/// Parse an instance: a city count line, then one `<index> <x> <y>` line per
/// city with indices 1, 2, ... in order. Blank lines are skipped.
pub fn parse_cities(text: &str) -> Result<CitySet> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let ncities: usize = lines
        .next()
        .and_then(|(_, line)| line.parse().ok())
        .ok_or(KernelError::CitiesOutOfRange)?;
    if ncities < 1 || ncities >= MAX_CITIES {
        return Err(KernelError::CitiesOutOfRange);
    }

    let mut cities = Vec::with_capacity(ncities);
    for (lineno, line) in lines {
        let (idx, x, y) = line
            .split_whitespace()
            .collect_tuple()
            .ok_or(KernelError::MalformedLine { line: lineno })?;
        let malformed = || KernelError::MalformedLine { line: lineno };
        let idx: usize = idx.parse().map_err(|_| malformed())?;
        let x: f32 = x.parse().map_err(|_| malformed())?;
        let y: f32 = y.parse().map_err(|_| malformed())?;
        if !x.is_finite() || !y.is_finite() {
            return Err(malformed());
        }

        cities.push(City { x, y });
        if cities.len() > ncities {
            return Err(KernelError::InputTooLong);
        }
        if cities.len() != idx {
            return Err(KernelError::LineMismatch);
        }
    }

    if cities.len() != ncities {
        return Err(KernelError::WrongCityCount);
    }
    Ok(CitySet::new(cities))
}

/// Read and parse an instance file.
pub fn load_cities<P: AsRef<Path>>(path: P) -> Result<CitySet> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| KernelError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let cities = parse_cities(&text)?;
    log::debug!("loaded {} cities from {}", cities.len(), path.display());
    Ok(cities)
}

/// Replicate the coordinator's city set on every worker.
///
/// `local` is only read on the coordinator; the verdict on loading it must
/// already be agreed upon.
pub fn share_cities<G: ProcessGroup>(group: &G, local: Option<CitySet>) -> CitySet {
    let mut ncities = local.as_ref().map_or(0, |set| set.len() as u64);
    group.broadcast_value(&mut ncities);

    let mut cities = match local {
        Some(set) if group.is_coordinator() => set.cities,
        _ => vec![City::default(); ncities as usize],
    };
    group.broadcast(&mut cities[..]);
    CitySet::new(cities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalGroup;

    const SQUARE: &str = "4\n1 0 0\n2 0 1\n3 1 1\n4 1 0\n";

    #[test]
    fn test_parse_square() {
        let set = parse_cities(SQUARE).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set[2], City { x: 1.0, y: 1.0 });
    }

    #[test]
    fn test_parse_tolerates_blank_lines_and_floats() {
        let set = parse_cities("2\n\n1 0.5 -1.25\n2 3e2 4\n\n").unwrap();
        assert_eq!(set[0], City { x: 0.5, y: -1.25 });
        assert_eq!(set[1], City { x: 300.0, y: 4.0 });
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("0\n", "cities out of range"),
            ("1296\n", "cities out of range"),
            ("x\n1 0 0\n", "cities out of range"),
            ("", "cities out of range"),
            ("2\n1 0 0\n2 1 1\n3 2 2\n", "input too long"),
            ("3\n1 0 0\n3 1 1\n", "input line mismatch"),
            ("3\n1 0 0\n2 1 1\n", "wrong number of cities read"),
            ("2\n1 0 0\n2 1\n", "malformed input line 3"),
            ("2\n1 0 0\n2 a 1\n", "malformed input line 3"),
            ("2\n1 0 0\n2 inf 0\n", "malformed input line 3"),
            ("2\n1 0 0\n2 0 -infinity\n", "malformed input line 3"),
            ("2\n1 NaN 0\n2 0 0\n", "malformed input line 2"),
            ("2\n1 0 0\n2 1e39 0\n", "malformed input line 3"),
        ];
        for (text, message) in cases {
            let err = parse_cities(text).unwrap_err();
            assert_eq!(err.to_string(), message, "input {text:?}");
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_cities("/nonexistent/cities.tsp").unwrap_err();
        assert!(matches!(err, KernelError::Unreadable { .. }));
        assert_eq!(err.to_string(), "could not open file /nonexistent/cities.tsp");
    }

    #[test]
    fn test_distance_rounds() {
        let a = City { x: 0.0, y: 0.0 };
        assert_eq!(a.distance(&City { x: 1.0, y: 1.0 }), 1);
        assert_eq!(a.distance(&City { x: 3.0, y: 4.0 }), 5);
        assert_eq!(a.distance(&City { x: 1.5, y: 0.0 }), 2);
    }

    #[test]
    fn test_share_cities() {
        let shared = LocalGroup::run(3, |group| {
            let local = group
                .is_coordinator()
                .then(|| parse_cities(SQUARE).unwrap());
            share_cities(group, local)
        });
        let expected = parse_cities(SQUARE).unwrap();
        for set in shared {
            assert_eq!(set, expected);
        }
    }
}
