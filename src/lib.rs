// src/lib.rs

//! Compares the output of two git diff algorithms over the history of one or more repositories.
//!
//! Every modified file yields one comparison: both algorithm variants are run, their unified
//! diffs are normalized to content lines and checked for equality, the file is classified,
//! and the verdicts are folded into per-category disagreement statistics.

pub mod aggregate;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod runner;

pub use error::{Error, Result};
