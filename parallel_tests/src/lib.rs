pub mod sorting;
pub mod tour;
