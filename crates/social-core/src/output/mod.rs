//! Output
//!
//! Run reporting.

pub mod report;

pub use report::*;
