//! Core traits for studivon collaborators.

mod advisor;
mod repository;

pub use advisor::*;
pub use repository::*;
