// CVR Sanitizer - Ballot ID pseudonymization for cast vote records
// Copyright (c) 2025 CVR Sanitizer Contributors
// Licensed under the MIT License

//! # CVR Sanitizer - Ballot ID pseudonymization for cast vote records
//!
//! CVR Sanitizer removes the link between a published cast vote record and the
//! order in which ballots were scanned. Every ballot's record identifier is
//! replaced by a keyed deterministic pseudonym, and records are reordered by
//! that pseudonym.
//!
//! ## Overview
//!
//! Three input shapes are supported:
//! - **CSV** CVR exports, in both the `="..."` quoted dialect and plain CSV
//! - **Zipped JSON** CVR exports with session files and pass-through manifests
//! - **TIF directories** of ballot images with their `.sha` hash files
//!
//! The same seed maps the same identifiers to the same pseudonym in every shape,
//! so a sanitized CVR still lines up with its sanitized ballot images.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pseudonyms, format codecs, and the per-shape orchestrators
//! - [`domain`] - Identifier types and the error taxonomy
//! - [`config`] - Optional configuration and seed handling
//! - [`logging`] - Structured logging
//! - [`report`] - Fatal error reports and run diagnostics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cvr_sanitizer::cli::commands::sanitize::run_sanitize;
//! use cvr_sanitizer::config::{seed_secret, SanitizeConfig};
//! use cvr_sanitizer::core::sanitize::InputShape;
//! use std::path::Path;
//!
//! let seed = seed_secret("a-long-secret-seed-value".to_string());
//! let summary = run_sanitize(
//!     InputShape::Csv,
//!     Path::new("/data/cvr.csv"),
//!     Path::new("/data/clean"),
//!     &seed,
//!     &SanitizeConfig::default(),
//! )
//! .map_err(|report| report.render())?;
//!
//! println!("Sanitized {} records", summary.records_sanitized);
//! # Ok::<(), String>(())
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::SanitizerError`]. The orchestrators wrap
//! failures in a [`report::FatalReport`], which carries the reason, the error
//! kind, and the diagnostics gathered so far. The seed never appears in either.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod report;
