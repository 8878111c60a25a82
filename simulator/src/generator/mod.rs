//! Synthetic measurement generation.

pub mod profile;

pub use profile::{build_samples, GeneratorConfig};
