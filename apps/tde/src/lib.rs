//! tde core library.
//!
//! Runs `dotnet format` against a directory, normalizes its JSON report into
//! [`models::Diagnostic`] records, filters them, and encodes them into a
//! compact grouped notation meant for low-volume consumers.
//!
//! High-level modules:
//! - `runner`: External tool invocation and temp report lifecycle.
//! - `parser`: Report normalization (list or keyed-object roots).
//! - `filter`: Rule id / severity / glob allow-lists.
//! - `encode`: Grouping and the compact notation.
//! - `pipeline`: End-to-end entry point for in-process callers.
//! - `config`: Discovery and effective configuration resolution.
//! - `output`: Notation/JSON printers.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `logging`: stderr and `{tempdir}/tde.log` sinks.
pub mod cli;
pub mod config;
pub mod encode;
pub mod error;
pub mod filter;
pub mod logging;
pub mod models;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod runner;
pub mod utils;

pub use error::{Result, TdeError};
pub use pipeline::{extract, Extraction, Outcome, Request};
