//! Top-level test module for xircd
//!
//! This file organizes the tests into categories for parallel execution.

mod cli;
mod helpers;
mod scopes;
