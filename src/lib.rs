pub mod cli;
pub mod error;
pub mod geometry;
pub mod io;

pub use error::{Result, RotationError};
