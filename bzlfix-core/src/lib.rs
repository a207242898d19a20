//! Embeddable core library for bzlfix.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into another host process.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`TreeSource`](ports::TreeSource) loads parsed build file trees
//! - [`WritePort`](ports::WritePort) writes files and creates directories
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_fix`](pipeline::run_fix) fixes every tree and builds a report
//! - [`write_fix_artifacts`](pipeline::write_fix_artifacts) persists fixed trees and the report

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod report;
pub mod settings;

// Re-export the domain config so callers don't need bzlfix-domain directly.
pub use bzlfix_domain::{FixConfig, KnownLoad, KnownLoads};
