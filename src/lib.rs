//! locaudit - localization catalog auditor
//!
//! locaudit is a CLI tool and library that compares the translation keys
//! referenced in application source code against a translation catalog. It
//! reports keys missing from the catalog, keys missing a translation for a
//! target locale, and stale catalog keys no longer referenced by code.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (arguments, commands, reporting)
//! - `config`: Configuration file loading and parsing
//! - `core`: Audit engine (extraction, catalog formats, reconciliation)
//! - `issues`: Finding categories, warnings and advisories
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod utils;
