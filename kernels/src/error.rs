use std::path::PathBuf;

use thiserror::Error;

/// Process exit status for every failed run, matching `exit(-1)`.
pub const FAILURE_EXIT_CODE: u8 = 255;

/// Coarse failure class, shared between workers when agreeing on a verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorClass {
    Usage,
    Resource,
    Format,
}

impl ErrorClass {
    /// Stable code exchanged by the verdict reduction. 0 means success.
    pub fn code(self) -> u32 {
        match self {
            ErrorClass::Usage => 1,
            ErrorClass::Resource => 2,
            ErrorClass::Format => 3,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(ErrorClass::Usage),
            2 => Some(ErrorClass::Resource),
            3 => Some(ErrorClass::Format),
            _ => None,
        }
    }
}

/// Every way a kernel run can fail. All of them are fatal for the whole group.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("{0}")]
    Usage(String),
    #[error("number of elements must be at least 1")]
    NoElements,
    #[error("number of elements must not exceed {max}")]
    TooManyElements { max: usize },
    #[error("number of samples must be at least 1")]
    NoSamples,
    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("could not allocate arrays")]
    Allocation,
    #[error("could not start the process group")]
    GroupInit,

    #[error("could not open file {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cities out of range")]
    CitiesOutOfRange,
    #[error("input too long")]
    InputTooLong,
    #[error("input line mismatch")]
    LineMismatch,
    #[error("malformed input line {line}")]
    MalformedLine { line: usize },
    #[error("wrong number of cities read")]
    WrongCityCount,

    /// Another worker failed; this worker only learned the class of failure.
    #[error("{}", peer_message(.0))]
    Peer(ErrorClass),
}

fn peer_message(class: &ErrorClass) -> &'static str {
    match class {
        ErrorClass::Usage => "invalid command line on another worker",
        ErrorClass::Resource => "could not allocate arrays on another worker",
        ErrorClass::Format => "malformed input file",
    }
}

impl KernelError {
    pub fn class(&self) -> ErrorClass {
        match self {
            KernelError::Usage(_)
            | KernelError::NoElements
            | KernelError::TooManyElements { .. }
            | KernelError::NoSamples
            | KernelError::NoWorkers => ErrorClass::Usage,
            KernelError::Allocation | KernelError::GroupInit => ErrorClass::Resource,
            KernelError::Unreadable { .. }
            | KernelError::CitiesOutOfRange
            | KernelError::InputTooLong
            | KernelError::LineMismatch
            | KernelError::MalformedLine { .. }
            | KernelError::WrongCityCount => ErrorClass::Format,
            KernelError::Peer(class) => *class,
        }
    }
}

pub type Result<T> = std::result::Result<T, KernelError>;

/// Allocate a zeroed work array, reporting exhaustion instead of aborting.
pub fn allocate<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| KernelError::Allocation)?;
    buf.resize(len, T::default());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_codes_round_trip() {
        for class in [ErrorClass::Usage, ErrorClass::Resource, ErrorClass::Format] {
            assert_eq!(ErrorClass::from_code(class.code()), Some(class));
        }
        assert_eq!(ErrorClass::from_code(0), None);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            KernelError::NoElements.to_string(),
            "number of elements must be at least 1"
        );
        assert_eq!(KernelError::LineMismatch.class(), ErrorClass::Format);
        assert_eq!(
            KernelError::Peer(ErrorClass::Resource).class(),
            ErrorClass::Resource
        );
    }

    #[test]
    fn test_allocate_zeroed() {
        let buf: Vec<i32> = allocate(4).unwrap();
        assert_eq!(buf, vec![0; 4]);
        assert!(allocate::<u64>(usize::MAX).is_err());
    }
}
