//! # c2r-scan
//!
//! Read-only access to the input tree of a translation run:
//! - [`scanner`]: single-level listings and the recursive file walk
//! - [`discover`]: `test-<project>.c` unit discovery
//! - [`includes`]: quoted include extraction and dependency lookup

pub mod discover;
pub mod includes;
pub mod scanner;

mod error;

pub use discover::{Discovery, UnreadableUnit, discover, discover_all};
pub use error::ScanError;
pub use includes::{SourceIndex, extract_includes, find_matches};
pub use scanner::{scan, walk_files};
