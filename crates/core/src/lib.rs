//! Switchyard Core Library
//!
//! This crate provides the core functionality for switchyard, a
//! schema-driven parameter engine for command-line applications: declare
//! named parameters once, then resolve their values from command-line
//! tokens, interactive prompts, persisted settings and defaults under a
//! single validated, typed model.
//!
//! # Key Features
//!
//! - **Parameter Registry**: register typed definitions once, then get, set,
//!   join, unset and reset values through one orchestrator
//! - **Typed Validation**: per-kind validators with case-insensitive
//!   allowed-value canonicalisation
//! - **Switch Groups**: mutual exclusion with reject, unset or reset
//!   policies, and a batch mode that forces reject during CLI parsing
//! - **Accumulation**: text, sequence and mapping values merge instead of
//!   replace when joined
//! - **Prompting**: policy-driven interactive solicitation with a bounded
//!   validation retry loop
//! - **Persistence**: parameters can round-trip automatically through a
//!   YAML settings store
//!
//! # Examples
//!
//! Registering a parameter and resolving a value:
//!
//! ```
//! use switchyard_core::definitions::{ParameterDefinition, ParameterKind};
//! use switchyard_core::registry::Registry;
//! use switchyard_core::value::Value;
//!
//! let mut registry = Registry::new();
//! registry.register(ParameterDefinition::new("region", ParameterKind::Text))?;
//! registry.set("region", Value::from("eu-west-1"))?;
//! assert_eq!(registry.get("region")?, Some(Value::from("eu-west-1")));
//! # Ok::<(), switchyard_core::error::Error>(())
//! ```

pub mod config;
pub mod definitions;
pub mod error;
pub mod file_handling;
pub mod merge;
pub mod prompt;
pub mod registry;
pub mod switch;
pub mod validate;
pub mod value;
