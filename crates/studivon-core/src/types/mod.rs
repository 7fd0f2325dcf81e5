//! Core types for studivon.

mod filter;
mod task;

pub use filter::*;
pub use task::*;
