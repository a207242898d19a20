//! Library half of the `bzlfix` binary: config file handling and fixer explanations.

pub mod config;
pub mod explain;
