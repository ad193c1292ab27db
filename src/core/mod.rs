//! Core I/O: row loading and artifact writing.

pub mod loaders;
pub mod writers;

pub use loaders::{PointRow, TrackArray};
