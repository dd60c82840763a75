//! statmatch - item stat line matching
//!
//! Core library that normalizes pasted item stat lines, loads the trade
//! stat catalog and resolves each line to its catalog identifier.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
