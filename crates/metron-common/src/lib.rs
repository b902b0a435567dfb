//! # metron-common
//!
//! Shared types, configuration, error handling, and catalog rules used across all Metron crates.
//! Nothing in here performs I/O: the database and HTTP layers feed plain data in and act on
//! the plans that come back out.

pub mod config;
pub mod credits;
pub mod error;
pub mod models;
pub mod pagination;
pub mod reprints;
pub mod slug;
pub mod statistics;
pub mod validation;
