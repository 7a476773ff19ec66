//! core
//!
//! Core domain types, schemas, and algorithms for gitfleet.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, Oid, RefName
//! - [`tips`] - Tip classification over a commit graph
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Classification is deterministic and read-only

pub mod config;
pub mod tips;
pub mod types;
