//! Interactive front end for app creation
//!
//! Prompts for whatever the command line left open (project name, language),
//! then hands a complete request to the pipeline. Only compiled with the
//! `tui` feature.

#[cfg(feature = "tui")]
mod prompts;

#[cfg(feature = "tui")]
pub use prompts::{run, CreateArgs};
