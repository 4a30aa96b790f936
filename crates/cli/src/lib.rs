//! Switchyard CLI Library
//!
//! This crate provides the command-line interface for switchyard, a
//! schema-driven parameter engine. It handles argument parsing, batch
//! application of `-p name=value` assignments, and interactive prompting
//! over stdin.
//!
//! # Key Features
//!
//! - **Batch Assignment**: command-line tokens are applied under a batch
//!   guard, so switch groups reject conflicting tokens
//! - **Interactive Prompting**: line-based input with numbered choice lists
//!   and no-echo reads for sensitive parameters
//! - **Inspection Verbs**: list, get, set, join, unset and reset operate on
//!   the resolved registry
//!
//! # Examples
//!
//! The CLI binary (`sy`) can be used in several ways:
//!
//! ```bash
//! # Resolve everything (prompting where policies ask) and list values
//! sy
//!
//! # Assign from the command line, then print one value
//! sy -p environment=prod get environment
//!
//! # Accumulate onto a sequence parameter
//! sy join tags urgent review
//!
//! # Flip a toggle's default
//! sy -p verbose list
//!
//! # Restore a declared default
//! sy reset environment
//! ```

pub mod cli_args;
pub mod prompting;
pub mod tokens;
