// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # CivicCoin Types
//!
//! This crate is the foundational library for the CivicCoin protocol,
//! containing all core data structures, error types, and configuration
//! objects.
//!
//! ## Architectural Role
//!
//! As the base crate, `civic-types` has minimal dependencies and is itself a
//! dependency for every other crate in the workspace. This structure
//! prevents circular dependencies and provides a stable, canonical
//! definition for shared types like `Principal`, `Job`,
//! `CoreContractRecord`, and the protocol error enums.

/// Core application-level data structures like `Principal`, `Job`, and the
/// mining/stacking records.
pub mod app;
/// The stable, read-only context supplied to every transaction handler.
pub mod context;
/// A unified set of all error types used across the workspace.
pub mod error;
/// Configuration structures for the governance and economic engines.
pub mod service_configs;
