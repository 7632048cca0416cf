//! relalg CLI library.
//!
//! Exposes internal modules for testing; the main entry point is the
//! `relalg` binary.

pub mod catalog_file;
pub mod cli;
pub mod input;
pub mod render;

pub use cli::Args;
