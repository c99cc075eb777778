//! The `nearpoint` command line tool
//!
//! Loads a mesh (or generates the demo sphere), finds the vertex closest to
//! a query point with the selected strategy and reports the result. The
//! benchmark mode times every strategy on the same file.

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Mode, RunConfig};

use nearpoint_core::Error;

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: u8 = 0;
    /// Bad input or a failed search
    pub const FAILURE: u8 = 1;
    /// Argument parsing failed (reported by clap)
    pub const USAGE: u8 = 2;
    /// The result could not be displayed or exported
    pub const VISUALIZATION: u8 = 3;
}

/// Exit code for an error returned by [`commands::execute`]
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    let visualization = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<Error>())
        .any(Error::is_visualization);
    if visualization {
        exit_code::VISUALIZATION
    } else {
        exit_code::FAILURE
    }
}
