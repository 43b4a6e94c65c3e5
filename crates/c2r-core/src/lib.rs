//! # c2r-core
//!
//! Core types and validation shared by every c2r crate:
//! - The translation data model (units, bundles, service responses)
//! - Enums for directory entries and include matching
//! - Project-name validation for output directory safety
//! - Cross-cutting error types

pub mod enums;
pub mod errors;
pub mod model;
pub mod project;

pub use enums::{EntryKind, IncludeMatch};
pub use errors::CoreError;
pub use model::{
    DirectoryEntry, OutputFile, SourceFile, TranslationRequest, TranslationResponse,
    TranslationUnit,
};
