//! World Setup
//!
//! Population spawning from the personality catalog.

pub mod population;

pub use population::*;
