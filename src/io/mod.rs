pub mod config;

pub use config::{ConverterConfig, DegeneratePolicy};
